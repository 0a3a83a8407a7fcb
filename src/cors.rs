use anyhow::Context;
use axum::http::{header, HeaderName, HeaderValue, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::blogs::dto::ADMIN_TOKEN_HEADER;

const ALLOWED_METHODS: [Method; 7] = [
    Method::POST,
    Method::GET,
    Method::PUT,
    Method::DELETE,
    Method::HEAD,
    Method::PATCH,
    Method::OPTIONS,
];

/// Credentialed CORS for the configured origins only.
pub fn cors_layer(origins: &[String]) -> anyhow::Result<CorsLayer> {
    if origins.iter().any(|o| o == "*") {
        anyhow::bail!("CORS_ORIGINS cannot be '*' with credentials");
    }
    let origins = origins
        .iter()
        .map(|o| {
            HeaderValue::from_str(o).with_context(|| format!("invalid CORS origin {:?}", o))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(ALLOWED_METHODS.to_vec())
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static(ADMIN_TOKEN_HEADER)])
        .allow_credentials(true))
}
