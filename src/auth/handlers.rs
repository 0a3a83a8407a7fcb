use axum::{
    extract::{FromRef, State},
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::{CookieJar, WithRejection};
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        claims::Claims,
        dto::{LoginRequest, PublicUser, RegisterRequest},
        jwt::{build_clear_cookie, build_token_cookie, AuthUser, JwtKeys},
        password::{hash_password, verify_password},
        repo_types::{User, MIN_USERNAME_LEN},
    },
    error::ApiError,
    state::AppState,
};

const WRONG_CREDENTIALS: &str = "Wrong credentials";

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
}

pub fn profile_routes() -> Router<AppState> {
    Router::new().route("/profile", get(profile))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<RegisterRequest>, ApiError>,
) -> Result<Json<User>, ApiError> {
    let username = payload.username.trim();

    if username.chars().count() < MIN_USERNAME_LEN {
        warn!(username = %username, "username too short");
        return Err(ApiError::BadRequest(format!(
            "Username must be at least {} characters",
            MIN_USERNAME_LEN
        )));
    }

    if payload.password.is_empty() {
        warn!(username = %username, "empty password");
        return Err(ApiError::BadRequest("Password is required".into()));
    }

    let hash = hash_password(&payload.password, state.config.hash_salt.as_deref()).map_err(|e| {
        error!(error = %e, "hash_password failed");
        ApiError::internal()
    })?;

    let user = state.users.create(username, &hash).await.map_err(|e| {
        error!(error = %e, username = %username, "create user failed");
        ApiError::internal()
    })?;

    info!(user_id = %user.id, username = %user.username, "user registered");
    Ok(Json(user))
}

#[instrument(skip(state, jar, payload))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    WithRejection(Json(payload), _): WithRejection<Json<LoginRequest>, ApiError>,
) -> Result<(CookieJar, Json<PublicUser>), ApiError> {
    let user = match state.users.find_by_username(payload.username.trim()).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            warn!(username = %payload.username, "login unknown username");
            return Err(ApiError::BadRequest(WRONG_CREDENTIALS.into()));
        }
        Err(e) => {
            error!(error = %e, "find_by_username failed");
            return Err(ApiError::internal());
        }
    };

    let ok = verify_password(
        &payload.password,
        &user.password_hash,
        state.config.hash_salt.as_deref(),
    )
    .map_err(|e| {
        error!(error = %e, "verify_password failed");
        ApiError::internal()
    })?;

    if !ok {
        warn!(user_id = %user.id, "login invalid password");
        return Err(ApiError::BadRequest(WRONG_CREDENTIALS.into()));
    }

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id, &user.username).map_err(|e| {
        error!(error = %e, "jwt sign failed");
        ApiError::internal()
    })?;

    info!(user_id = %user.id, username = %user.username, "user logged in");
    Ok((
        jar.add(build_token_cookie(token, state.config.secure_cookies)),
        Json(PublicUser {
            id: user.id,
            username: user.username,
        }),
    ))
}

#[instrument(skip_all)]
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<&'static str>) {
    (jar.add(build_clear_cookie()), Json("ok"))
}

#[instrument(skip_all)]
pub async fn profile(AuthUser(claims): AuthUser) -> Json<Claims> {
    Json(claims)
}
