use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::extract::{
    cookie::{Cookie, SameSite},
    CookieJar,
};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use time::OffsetDateTime;
use tracing::{debug, warn};
use uuid::Uuid;

use super::claims::Claims;
use crate::{config::JwtConfig, error::ApiError, state::AppState};

pub const TOKEN_COOKIE_NAME: &str = "token";

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("missing token")]
    MissingToken,
    #[error("invalid token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::MissingToken => ApiError::Unauthorized("Missing token".into()),
            AuthError::InvalidToken(_) => ApiError::Unauthorized("Invalid or expired token".into()),
        }
    }
}

#[derive(Clone)]
pub struct JwtKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub ttl: Option<Duration>,
}

impl JwtKeys {
    pub fn new(cfg: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            ttl: cfg
                .ttl_minutes
                .map(|m| Duration::from_secs(u64::try_from(m).unwrap_or(0).saturating_mul(60))),
        }
    }

    pub fn sign(&self, user_id: Uuid, username: &str) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc().unix_timestamp() as usize;
        let claims = Claims {
            id: user_id,
            username: username.to_string(),
            iat: now,
            exp: match self.ttl {
                Some(ttl) => Some(
                    usize::try_from(ttl.as_secs())
                        .ok()
                        .and_then(|secs| now.checked_add(secs))
                        .context("token expiry out of range")?,
                ),
                None => None,
            },
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;
        debug!(user_id = %user_id, "jwt signed");
        Ok(token)
    }

    /// `exp` is optional; when present it is enforced.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.required_spec_claims.clear();
        validation.validate_aud = false;
        validation.leeway = 0;
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        debug!(user_id = %data.claims.id, "jwt verified");
        Ok(data.claims)
    }
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        JwtKeys::new(&state.config.jwt)
    }
}

pub fn build_token_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((TOKEN_COOKIE_NAME, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

pub fn build_clear_cookie() -> Cookie<'static> {
    Cookie::build((TOKEN_COOKIE_NAME, ""))
        .path("/")
        .max_age(time::Duration::seconds(0))
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

/// Claims of the caller, read from the `token` cookie.
pub struct AuthUser(pub Claims);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);
        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar
            .get(TOKEN_COOKIE_NAME)
            .map(|c| c.value().to_string())
            .filter(|v| !v.is_empty())
            .ok_or(AuthError::MissingToken)?;

        let claims = keys.verify(&token).map_err(|e| {
            warn!(error = %e, "invalid or expired token");
            e
        })?;
        Ok(AuthUser(claims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_keys(secret: &str, ttl_minutes: Option<i64>) -> JwtKeys {
        JwtKeys::new(&JwtConfig {
            secret: secret.into(),
            ttl_minutes,
        })
    }

    #[test]
    fn sign_and_verify_token() {
        let keys = make_keys("dev-secret", None);
        let user_id = Uuid::new_v4();
        let token = keys.sign(user_id, "writer01").expect("sign");
        let claims = keys.verify(&token).expect("verify");
        assert_eq!(claims.id, user_id);
        assert_eq!(claims.username, "writer01");
        assert_eq!(claims.exp, None);
    }

    #[test]
    fn ttl_adds_expiry() {
        let keys = make_keys("dev-secret", Some(5));
        let token = keys.sign(Uuid::new_v4(), "writer01").unwrap();
        let claims = keys.verify(&token).unwrap();
        assert_eq!(claims.exp, Some(claims.iat + 300));
    }

    #[test]
    fn oversized_ttl_fails_to_sign_instead_of_overflowing() {
        let keys = make_keys("dev-secret", Some(i64::MAX));
        assert!(keys.sign(Uuid::new_v4(), "writer01").is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let keys = make_keys("dev-secret", None);
        let claims = Claims {
            id: Uuid::new_v4(),
            username: "writer01".into(),
            iat: 1_000,
            exp: Some(2_000),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &keys.encoding).unwrap();
        assert!(matches!(keys.verify(&token), Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn verify_rejects_other_secret() {
        let token = make_keys("secret-a", None).sign(Uuid::new_v4(), "writer01").unwrap();
        let err = make_keys("secret-b", None).verify(&token).unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken(_)));
    }

    #[test]
    fn verify_rejects_tampered_token() {
        let keys = make_keys("dev-secret", None);
        let mut token = keys.sign(Uuid::new_v4(), "writer01").unwrap();
        token.push('x');
        assert!(keys.verify(&token).is_err());
        assert!(keys.verify("not.a.jwt").is_err());
    }

    #[test]
    fn clear_cookie_expires_immediately() {
        let cookie = build_clear_cookie();
        assert_eq!(cookie.name(), TOKEN_COOKIE_NAME);
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(time::Duration::seconds(0)));
    }
}
