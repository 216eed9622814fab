use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{
    auth::AuthenticatedUser,
    entities::order::OrderStatus,
    errors::ServiceError,
    services::orders::{CreateOrderRequest, UpdateOrderRequest, UpdateOrderStatusRequest},
    AppState,
};

/// Storefront-facing order routes.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_order))
        .route("/code/:order_code", get(lookup_order))
}

/// Back-office order routes.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_orders))
        .route("/:id", get(get_order).put(update_order).delete(delete_order))
        .route("/:id/status", put(update_order_status))
}

/// POST /orders places a new order.
async fn create_order(
    State(state): State<AppState>,
    Json(request): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ServiceError> {
    let order = state.services.orders.create_order(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "data": order })),
    ))
}

/// GET /orders/code/:order_code lets a customer track an order.
async fn lookup_order(
    State(state): State<AppState>,
    Path(order_code): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let order = state.services.orders.get_order_by_code(&order_code).await?;
    Ok(Json(json!({ "success": true, "data": order })))
}

#[derive(Debug, Deserialize)]
struct ListOrdersQuery {
    page: Option<u64>,
    per_page: Option<u64>,
    status: Option<OrderStatus>,
}

async fn list_orders(
    _user: AuthenticatedUser,
    State(state): State<AppState>,
    Query(query): Query<ListOrdersQuery>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let params = super::common::PaginationParams {
        page: query.page,
        per_page: query.per_page,
    };
    let response = state
        .services
        .orders
        .list_orders(params.page(), params.per_page(), query.status)
        .await?;
    Ok(Json(json!({ "success": true, "data": response })))
}

async fn get_order(
    _user: AuthenticatedUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let order = state.services.orders.get_order(id).await?;
    Ok(Json(json!({ "success": true, "data": order })))
}

async fn update_order(
    _user: AuthenticatedUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateOrderRequest>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let order = state.services.orders.update_order(id, request).await?;
    Ok(Json(json!({ "success": true, "data": order })))
}

async fn update_order_status(
    _user: AuthenticatedUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateOrderStatusRequest>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let order = state
        .services
        .orders
        .update_order_status(id, request)
        .await?;
    Ok(Json(json!({ "success": true, "data": order })))
}

async fn delete_order(
    _user: AuthenticatedUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    state.services.orders.delete_order(id).await?;
    Ok(Json(json!({ "success": true, "message": "Order deleted" })))
}
