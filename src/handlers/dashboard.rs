use axum::{extract::State, routing::get, Json, Router};
use serde_json::json;

use crate::{auth::AuthenticatedUser, errors::ServiceError, AppState};

pub fn admin_routes() -> Router<AppState> {
    Router::new().route("/stats", get(stats))
}

/// GET /admin/dashboard/stats
async fn stats(
    _user: AuthenticatedUser,
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let stats = state.services.dashboard.stats().await?;
    Ok(Json(json!({ "success": true, "data": stats })))
}
