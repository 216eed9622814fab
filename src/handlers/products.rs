use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{
    auth::AuthenticatedUser,
    errors::ServiceError,
    services::products::{CreateProductRequest, UpdateProductRequest},
    AppState,
};

/// Storefront catalog browsing. Only available products are shown.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_available_products))
        .route("/:id", get(get_product))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_all_products).post(create_product))
        .route(
            "/:id",
            get(get_product_admin)
                .put(update_product)
                .delete(delete_product),
        )
}

#[derive(Debug, Deserialize)]
struct ListProductsQuery {
    page: Option<u64>,
    per_page: Option<u64>,
    category_id: Option<Uuid>,
    /// Name substring filter
    q: Option<String>,
}

async fn list_available_products(
    State(state): State<AppState>,
    Query(query): Query<ListProductsQuery>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let params = super::common::PaginationParams {
        page: query.page,
        per_page: query.per_page,
    };
    let response = state
        .services
        .products
        .list_products(
            params.page(),
            params.per_page(),
            query.category_id,
            query.q.as_deref(),
            true,
        )
        .await?;
    Ok(Json(json!({ "success": true, "data": response })))
}

async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let product = state.services.products.get_product(id).await?;
    Ok(Json(json!({ "success": true, "data": product })))
}

async fn list_all_products(
    _user: AuthenticatedUser,
    State(state): State<AppState>,
    Query(query): Query<ListProductsQuery>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let params = super::common::PaginationParams {
        page: query.page,
        per_page: query.per_page,
    };
    let response = state
        .services
        .products
        .list_products(
            params.page(),
            params.per_page(),
            query.category_id,
            query.q.as_deref(),
            false,
        )
        .await?;
    Ok(Json(json!({ "success": true, "data": response })))
}

async fn get_product_admin(
    _user: AuthenticatedUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let product = state.services.products.get_product(id).await?;
    Ok(Json(json!({ "success": true, "data": product })))
}

async fn create_product(
    _user: AuthenticatedUser,
    State(state): State<AppState>,
    Json(request): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ServiceError> {
    let product = state.services.products.create_product(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "data": product })),
    ))
}

async fn update_product(
    _user: AuthenticatedUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateProductRequest>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let product = state.services.products.update_product(id, request).await?;
    Ok(Json(json!({ "success": true, "data": product })))
}

async fn delete_product(
    _user: AuthenticatedUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    state.services.products.delete_product(id).await?;
    Ok(Json(json!({ "success": true, "message": "Product deleted" })))
}
