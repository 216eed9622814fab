use axum::{
    extract::State,
    http::{header, HeaderMap},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tracing::info;

use crate::{
    auth::{AuthError, AuthenticatedUser, LoginCredentials},
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(me))
}

/// POST /auth/login
async fn login(
    State(state): State<AppState>,
    Json(credentials): Json<LoginCredentials>,
) -> Result<Json<serde_json::Value>, AuthError> {
    let token = state.auth.issue(&credentials).await?;
    info!(username = %credentials.username, "admin logged in");

    Ok(Json(json!({
        "success": true,
        "data": token,
    })))
}

/// POST /auth/logout revokes the presented session token.
async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, AuthError> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(AuthError::MissingToken)?;

    state.auth.revoke(token).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Logged out",
    })))
}

/// GET /auth/me returns the identity behind the session token.
async fn me(user: AuthenticatedUser) -> Json<serde_json::Value> {
    Json(json!({
        "success": true,
        "data": {
            "user_id": user.user_id,
            "username": user.username,
            "role": user.role,
        },
    }))
}
