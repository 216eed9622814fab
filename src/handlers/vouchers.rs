use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{
    auth::AuthenticatedUser,
    errors::ServiceError,
    handlers::common::PaginationParams,
    services::promotions::{CreatePromotionRequest, UpdatePromotionRequest},
    AppState,
};

/// Storefront-facing voucher routes.
pub fn public_routes() -> Router<AppState> {
    Router::new().route("/validate", post(validate_voucher))
}

/// Back-office promotion management.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_promotions).post(create_promotion))
        .route(
            "/:id",
            get(get_promotion).put(update_promotion).delete(delete_promotion),
        )
}

#[derive(Debug, Deserialize)]
struct ValidateVoucherRequest {
    code: String,
    subtotal: Decimal,
}

/// POST /vouchers/validate quotes the discount for a code at checkout.
/// Read-only; nothing is reserved.
async fn validate_voucher(
    State(state): State<AppState>,
    Json(request): Json<ValidateVoucherRequest>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let quote = state
        .services
        .promotions
        .validate_voucher(&request.code, request.subtotal)
        .await?;

    Ok(Json(json!({ "success": true, "voucher": quote })))
}

async fn create_promotion(
    _user: AuthenticatedUser,
    State(state): State<AppState>,
    Json(request): Json<CreatePromotionRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ServiceError> {
    let promotion = state.services.promotions.create_promotion(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "data": promotion })),
    ))
}

async fn list_promotions(
    _user: AuthenticatedUser,
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let response = state
        .services
        .promotions
        .list_promotions(params.page(), params.per_page())
        .await?;
    Ok(Json(json!({ "success": true, "data": response })))
}

async fn get_promotion(
    _user: AuthenticatedUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let promotion = state.services.promotions.get_promotion(id).await?;
    Ok(Json(json!({ "success": true, "data": promotion })))
}

async fn update_promotion(
    _user: AuthenticatedUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdatePromotionRequest>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let promotion = state
        .services
        .promotions
        .update_promotion(id, request)
        .await?;
    Ok(Json(json!({ "success": true, "data": promotion })))
}

async fn delete_promotion(
    _user: AuthenticatedUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    state.services.promotions.delete_promotion(id).await?;
    Ok(Json(
        json!({ "success": true, "message": "Promotion deleted" }),
    ))
}
