// Not every test binary exercises every helper.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{Method, Request},
    Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, Set};
use serde_json::Value;
use tokio::sync::mpsc;
use tower::ServiceExt;
use uuid::Uuid;

use foodstore_api::{
    app_router,
    auth::{hash_password, AuthConfig, AuthService},
    config::AppConfig,
    db,
    entities::{admin_user, category, product, promotion},
    events::{self, EventSender},
    handlers::AppServices,
    AppState,
};

const TEST_JWT_SECRET: &str =
    "integration_test_secret_key_that_is_definitely_long_enough_q7x9v2m4p8r6";

/// Test harness running the full router against a private SQLite database.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    token: String,
    db_file: String,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    pub async fn new() -> Self {
        let db_file = format!("foodstore_test_{}.db", Uuid::new_v4().simple());

        let mut cfg = AppConfig::new(
            format!("sqlite://{db_file}?mode=rwc"),
            TEST_JWT_SECRET.to_string(),
            3600,
            "127.0.0.1".to_string(),
            0,
            "test".to_string(),
        );
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let db_arc = Arc::new(pool);
        let (event_tx, event_rx) = mpsc::channel(256);
        let event_sender = Arc::new(EventSender::new(event_tx));
        let event_task = tokio::spawn(events::process_events(event_rx));

        let auth = Arc::new(AuthService::new(
            AuthConfig::new(
                cfg.jwt_secret.clone(),
                cfg.auth_issuer.clone(),
                cfg.auth_audience.clone(),
                Duration::from_secs(cfg.jwt_expiration as u64),
            ),
            db_arc.clone(),
        ));

        let admin = seed_admin(&db_arc, "admin", "test-password").await;
        let token = auth
            .issue_for_user(&admin)
            .expect("issue admin token")
            .access_token;

        let services = Arc::new(AppServices::build(
            db_arc.clone(),
            Some(event_sender.clone()),
            &cfg,
        ));

        let state = AppState {
            db: db_arc,
            config: Arc::new(cfg),
            event_sender,
            services,
            auth,
        };

        let router = app_router(state.clone());

        Self {
            router,
            state,
            token,
            db_file,
            _event_task: event_task,
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(tok) = token {
            builder = builder.header("authorization", format!("Bearer {}", tok));
        }

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    pub async fn request_authenticated(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> axum::response::Response {
        self.request(method, uri, body, Some(self.token())).await
    }

    pub async fn seed_category(&self, name: &str) -> category::Model {
        category::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            description: Set(None),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        }
        .insert(&*self.state.db)
        .await
        .expect("seed category")
    }

    pub async fn seed_product(
        &self,
        name: &str,
        price: Decimal,
        category_id: Option<Uuid>,
    ) -> product::Model {
        product::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            description: Set(None),
            price: Set(price),
            image_url: Set(None),
            category_id: Set(category_id),
            is_available: Set(true),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        }
        .insert(&*self.state.db)
        .await
        .expect("seed product")
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn seed_promotion(
        &self,
        code: &str,
        discount_type: promotion::DiscountType,
        discount_value: Decimal,
        min_order_value: Decimal,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
        status: promotion::PromotionStatus,
    ) -> promotion::Model {
        promotion::ActiveModel {
            id: Set(Uuid::new_v4()),
            promo_code: Set(code.to_string()),
            title: Set(format!("Promotion {}", code)),
            description: Set(None),
            discount_type: Set(discount_type),
            discount_value: Set(discount_value),
            min_order_value: Set(min_order_value),
            start_date: Set(start_date),
            end_date: Set(end_date),
            status: Set(status),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        }
        .insert(&*self.state.db)
        .await
        .expect("seed promotion")
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self._event_task.abort();
        let _ = std::fs::remove_file(&self.db_file);
    }
}

async fn seed_admin(
    db: &Arc<sea_orm::DatabaseConnection>,
    username: &str,
    password: &str,
) -> admin_user::Model {
    admin_user::ActiveModel {
        id: Set(Uuid::new_v4()),
        username: Set(username.to_string()),
        password_hash: Set(hash_password(password).expect("hash test password")),
        display_name: Set("Test Admin".to_string()),
        role: Set("admin".to_string()),
        is_active: Set(true),
        created_at: Set(Utc::now()),
        updated_at: Set(None),
    }
    .insert(&**db)
    .await
    .expect("seed admin user")
}

/// Deserialize a response body into JSON.
pub async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read response body");
    serde_json::from_slice(&bytes).expect("response body is not valid json")
}
