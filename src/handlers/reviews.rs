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
    auth::AuthenticatedUser, errors::ServiceError, services::reviews::CreateReviewRequest,
    AppState,
};

/// Reviews can be read and posted without a session.
pub fn public_routes() -> Router<AppState> {
    Router::new().route("/", get(list_reviews).post(create_review))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new().route("/:id", axum::routing::delete(delete_review))
}

#[derive(Debug, Deserialize)]
struct ListReviewsQuery {
    page: Option<u64>,
    per_page: Option<u64>,
    product_id: Option<Uuid>,
}

async fn list_reviews(
    State(state): State<AppState>,
    Query(query): Query<ListReviewsQuery>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let params = super::common::PaginationParams {
        page: query.page,
        per_page: query.per_page,
    };
    let response = state
        .services
        .reviews
        .list_reviews(params.page(), params.per_page(), query.product_id)
        .await?;
    Ok(Json(json!({ "success": true, "data": response })))
}

async fn create_review(
    State(state): State<AppState>,
    Json(request): Json<CreateReviewRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ServiceError> {
    let review = state.services.reviews.create_review(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "data": review })),
    ))
}

async fn delete_review(
    _user: AuthenticatedUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    state.services.reviews.delete_review(id).await?;
    Ok(Json(json!({ "success": true, "message": "Review deleted" })))
}
