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
    handlers::common::PaginationParams,
    services::customers::{CreateCustomerRequest, CustomerListResponse, UpdateCustomerRequest},
    AppState,
};

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_customers).post(create_customer))
        .route(
            "/:id",
            get(get_customer).put(update_customer).delete(delete_customer),
        )
}

#[derive(Debug, Deserialize)]
struct ListCustomersQuery {
    page: Option<u64>,
    per_page: Option<u64>,
    /// Exact email lookup, case-insensitive
    email: Option<String>,
}

async fn list_customers(
    _user: AuthenticatedUser,
    State(state): State<AppState>,
    Query(query): Query<ListCustomersQuery>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    // An email filter is a point lookup, not a page through the list
    if let Some(email) = query.email.as_deref().map(str::trim).filter(|e| !e.is_empty()) {
        let customers: Vec<_> = state
            .services
            .customers
            .find_by_email(email)
            .await?
            .into_iter()
            .collect();
        let total = customers.len() as u64;
        let response = CustomerListResponse {
            customers,
            total,
            page: 1,
            per_page: 1,
        };
        return Ok(Json(json!({ "success": true, "data": response })));
    }

    let params = PaginationParams {
        page: query.page,
        per_page: query.per_page,
    };
    let response = state
        .services
        .customers
        .list_customers(params.page(), params.per_page())
        .await?;
    Ok(Json(json!({ "success": true, "data": response })))
}

async fn get_customer(
    _user: AuthenticatedUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let customer = state.services.customers.get_customer(id).await?;
    Ok(Json(json!({ "success": true, "data": customer })))
}

async fn create_customer(
    _user: AuthenticatedUser,
    State(state): State<AppState>,
    Json(request): Json<CreateCustomerRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ServiceError> {
    let customer = state.services.customers.create_customer(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "data": customer })),
    ))
}

async fn update_customer(
    _user: AuthenticatedUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateCustomerRequest>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let customer = state
        .services
        .customers
        .update_customer(id, request)
        .await?;
    Ok(Json(json!({ "success": true, "data": customer })))
}

async fn delete_customer(
    _user: AuthenticatedUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    state.services.customers.delete_customer(id).await?;
    Ok(Json(
        json!({ "success": true, "message": "Customer deleted" }),
    ))
}
