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
    services::flash_sales::{CreateFlashSaleRequest, UpdateFlashSaleRequest},
    AppState,
};

/// The storefront only sees sales running right now.
pub fn public_routes() -> Router<AppState> {
    Router::new().route("/", get(list_current_flash_sales))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_flash_sales).post(create_flash_sale))
        .route(
            "/:id",
            get(get_flash_sale)
                .put(update_flash_sale)
                .delete(delete_flash_sale),
        )
}

async fn list_current_flash_sales(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let sales = state.services.flash_sales.list_current_flash_sales().await?;
    Ok(Json(json!({ "success": true, "data": sales })))
}

async fn list_flash_sales(
    _user: AuthenticatedUser,
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let sales = state.services.flash_sales.list_flash_sales().await?;
    Ok(Json(json!({ "success": true, "data": sales })))
}

async fn get_flash_sale(
    _user: AuthenticatedUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let sale = state.services.flash_sales.get_flash_sale(id).await?;
    Ok(Json(json!({ "success": true, "data": sale })))
}

async fn create_flash_sale(
    _user: AuthenticatedUser,
    State(state): State<AppState>,
    Json(request): Json<CreateFlashSaleRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ServiceError> {
    let sale = state.services.flash_sales.create_flash_sale(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "data": sale })),
    ))
}

async fn update_flash_sale(
    _user: AuthenticatedUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateFlashSaleRequest>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let sale = state
        .services
        .flash_sales
        .update_flash_sale(id, request)
        .await?;
    Ok(Json(json!({ "success": true, "data": sale })))
}

async fn delete_flash_sale(
    _user: AuthenticatedUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    state.services.flash_sales.delete_flash_sale(id).await?;
    Ok(Json(
        json!({ "success": true, "message": "Flash sale deleted" }),
    ))
}
