pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod migrator;
pub mod services;

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Extension, Json, Router};
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::{
    auth::AuthService,
    config::AppConfig,
    db::DbPool,
    events::EventSender,
    handlers::AppServices,
};

/// Shared application state threaded through every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DbPool>,
    pub config: Arc<AppConfig>,
    pub event_sender: Arc<EventSender>,
    pub services: Arc<AppServices>,
    pub auth: Arc<AuthService>,
}

/// Storefront and back-office routes under /api/v1.
pub fn api_v1_routes() -> Router<AppState> {
    let admin = Router::new()
        .nest("/dashboard", handlers::dashboard::admin_routes())
        .nest("/orders", handlers::orders::admin_routes())
        .nest("/products", handlers::products::admin_routes())
        .nest("/categories", handlers::categories::admin_routes())
        .nest("/customers", handlers::customers::admin_routes())
        .nest("/reviews", handlers::reviews::admin_routes())
        .nest("/banners", handlers::banners::admin_routes())
        .nest("/flash-sales", handlers::flash_sales::admin_routes())
        .nest("/promotions", handlers::vouchers::admin_routes());

    Router::new()
        .nest("/auth", handlers::auth::routes())
        .nest("/orders", handlers::orders::public_routes())
        .nest("/vouchers", handlers::vouchers::public_routes())
        .nest("/products", handlers::products::public_routes())
        .nest("/categories", handlers::categories::public_routes())
        .nest("/reviews", handlers::reviews::public_routes())
        .nest("/banners", handlers::banners::public_routes())
        .nest("/flash-sales", handlers::flash_sales::public_routes())
        .nest("/admin", admin)
}

/// Builds the complete application router. Shared by the server binary and
/// the integration tests.
pub fn app_router(state: AppState) -> Router {
    let auth = state.auth.clone();

    Router::new()
        .route("/health", get(health_check))
        .route("/status", get(api_status))
        .nest("/api/v1", api_v1_routes())
        .layer(Extension(auth))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health for liveness probes. Degraded when the database does not
/// answer a ping.
async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    match db::check_connection(&state.db).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "status": "ok", "database": "up" })),
        ),
        Err(e) => {
            error!(error = %e, "health check database ping failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "degraded", "database": "down" })),
            )
        }
    }
}

/// GET /status reports build metadata.
async fn api_status() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "git_hash": env!("GIT_HASH"),
        "build_time": env!("BUILD_TIME"),
    }))
}
