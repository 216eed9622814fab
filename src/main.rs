use std::sync::Arc;
use std::time::Duration;

use axum::http::{HeaderValue, Method};
use tokio::sync::mpsc;
use tower_http::cors::{AllowHeaders, Any, CorsLayer};
use tracing::{error, info, warn};

use foodstore_api::{
    app_router,
    auth::{AuthConfig, AuthService},
    config::{init_tracing, load_config},
    db,
    errors::set_development_mode,
    events::{process_events, EventSender},
    handlers::AppServices,
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_tracing(config.log_level(), config.log_json);
    set_development_mode(config.is_development());

    info!(
        environment = %config.environment,
        version = env!("CARGO_PKG_VERSION"),
        git_hash = env!("GIT_HASH"),
        "starting foodstore-api"
    );

    let db_pool = Arc::new(db::establish_connection_from_app_config(&config).await?);

    if config.auto_migrate {
        db::run_migrations(&db_pool).await?;
    } else {
        info!("auto_migrate disabled; skipping migrations");
    }

    let (event_tx, event_rx) = mpsc::channel(config.event_channel_capacity);
    let event_sender = Arc::new(EventSender::new(event_tx));
    tokio::spawn(process_events(event_rx));

    let auth = Arc::new(AuthService::new(
        AuthConfig::new(
            config.jwt_secret.clone(),
            config.auth_issuer.clone(),
            config.auth_audience.clone(),
            Duration::from_secs(config.jwt_expiration as u64),
        ),
        db_pool.clone(),
    ));

    let services = Arc::new(AppServices::build(
        db_pool.clone(),
        Some(event_sender.clone()),
        &config,
    ));

    let cors = build_cors_layer(&config);

    let addr = format!("{}:{}", config.host, config.port);
    let state = AppState {
        db: db_pool.clone(),
        config: Arc::new(config),
        event_sender,
        services,
        auth,
    };

    let app = app_router(state).layer(cors);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(addr = %addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped, closing database pool");
    if let Err(e) = db::close_pool(Arc::try_unwrap(db_pool).unwrap_or_else(|arc| (*arc).clone())).await {
        error!(error = %e, "failed to close database pool");
    }

    Ok(())
}

fn build_cors_layer(config: &foodstore_api::config::AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_allowed_origins
        .as_deref()
        .unwrap_or("")
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse::<HeaderValue>().ok())
        .collect();

    if !origins.is_empty() {
        let mut layer = CorsLayer::new().allow_origin(origins).allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ]);
        // A wildcard header list cannot be combined with credentials
        if config.cors_allow_credentials {
            layer = layer
                .allow_headers(AllowHeaders::mirror_request())
                .allow_credentials(true);
        } else {
            layer = layer.allow_headers(Any);
        }
        layer
    } else if config.should_allow_permissive_cors() {
        warn!("CORS: allowing any origin");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        // load_config rejects this combination; keep a locked-down fallback
        CorsLayer::new()
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => error!(error = %e, "failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received");
}
