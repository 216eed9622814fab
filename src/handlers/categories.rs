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
    services::categories::{CreateCategoryRequest, UpdateCategoryRequest},
    AppState,
};

pub fn public_routes() -> Router<AppState> {
    Router::new().route("/", get(list_categories))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_categories_admin).post(create_category))
        .route(
            "/:id",
            get(get_category).put(update_category).delete(delete_category),
        )
}

async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let categories = state.services.categories.list_categories().await?;
    Ok(Json(json!({ "success": true, "data": categories })))
}

async fn list_categories_admin(
    _user: AuthenticatedUser,
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let categories = state.services.categories.list_categories().await?;
    Ok(Json(json!({ "success": true, "data": categories })))
}

async fn get_category(
    _user: AuthenticatedUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let category = state.services.categories.get_category(id).await?;
    Ok(Json(json!({ "success": true, "data": category })))
}

async fn create_category(
    _user: AuthenticatedUser,
    State(state): State<AppState>,
    Json(request): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ServiceError> {
    let category = state.services.categories.create_category(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "data": category })),
    ))
}

async fn update_category(
    _user: AuthenticatedUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateCategoryRequest>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let category = state
        .services
        .categories
        .update_category(id, request)
        .await?;
    Ok(Json(json!({ "success": true, "data": category })))
}

async fn delete_category(
    _user: AuthenticatedUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    state.services.categories.delete_category(id).await?;
    Ok(Json(
        json!({ "success": true, "message": "Category deleted" }),
    ))
}
