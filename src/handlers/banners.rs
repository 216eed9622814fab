use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::json;
use uuid::Uuid;

use crate::{
    auth::AuthenticatedUser,
    errors::ServiceError,
    services::banners::{CreateBannerRequest, UpdateBannerRequest},
    AppState,
};

pub fn public_routes() -> Router<AppState> {
    Router::new().route("/", get(list_active_banners))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_all_banners).post(create_banner))
        .route(
            "/:id",
            get(get_banner).put(update_banner).delete(delete_banner),
        )
}

async fn list_active_banners(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let banners = state.services.banners.list_banners(true).await?;
    Ok(Json(json!({ "success": true, "data": banners })))
}

async fn list_all_banners(
    _user: AuthenticatedUser,
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let banners = state.services.banners.list_banners(false).await?;
    Ok(Json(json!({ "success": true, "data": banners })))
}

async fn get_banner(
    _user: AuthenticatedUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let banner = state.services.banners.get_banner(id).await?;
    Ok(Json(json!({ "success": true, "data": banner })))
}

async fn create_banner(
    _user: AuthenticatedUser,
    State(state): State<AppState>,
    Json(request): Json<CreateBannerRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ServiceError> {
    let banner = state.services.banners.create_banner(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "data": banner })),
    ))
}

async fn update_banner(
    _user: AuthenticatedUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateBannerRequest>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let banner = state.services.banners.update_banner(id, request).await?;
    Ok(Json(json!({ "success": true, "data": banner })))
}

async fn delete_banner(
    _user: AuthenticatedUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    state.services.banners.delete_banner(id).await?;
    Ok(Json(json!({ "success": true, "message": "Banner deleted" })))
}
