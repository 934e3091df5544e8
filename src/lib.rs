//! Blog Backend - library for app logic and testing

pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod routes;
pub mod state;
pub mod validation;

use axum::{
    handler::Handler,
    http::{HeaderValue, Method},
    middleware,
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer,
};

use crate::config::{AppConfig, ConfigError};
use crate::db::PgPostStore;
use crate::state::AppState;

/// Reasons the server can fail to come up.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("invalid database configuration: {0}")]
    Database(#[from] sqlx::Error),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Build the CORS policy for the given origins. Unparseable origins are
/// skipped with a warning.
pub fn configure_cors(origins: &[String]) -> CorsLayer {
    let allowed_origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
        ])
        .allow_credentials(true)
}

/// Create and configure the application router.
pub fn create_app(state: AppState, cors: CorsLayer) -> Router {
    let require_post_fields = middleware::from_fn(validation::require_post_fields);

    Router::new()
        .route("/health", get(routes::health::health_ping))
        .route("/profiles", get(routes::profiles::get_profile))
        .route(
            "/posts",
            get(routes::posts::list_posts)
                .post(routes::posts::create_post.layer(require_post_fields.clone())),
        )
        .route(
            "/posts/{post_id}",
            get(routes::posts::get_post)
                .put(routes::posts::update_post.layer(require_post_fields))
                .delete(routes::posts::delete_post),
        )
        .with_state(state)
        .layer(logging::middleware::propagate_request_id_layer())
        .layer(middleware::from_fn(logging::middleware::log_request))
        .layer(logging::middleware::request_id_layer())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        // Global 2 MB request body cap
        .layer(RequestBodyLimitLayer::new(2 * 1024 * 1024))
        .layer(cors)
}

/// Run the server (used by main).
pub async fn run() -> Result<(), StartupError> {
    dotenvy::dotenv().ok();

    // Guards must live until shutdown or buffered log lines are lost.
    let _log_guards = logging::init();

    launch(|key| std::env::var(key).ok()).await
}

/// Configure and serve from the given variable source. A startup failure is
/// logged here, once, before being returned.
pub async fn launch<F>(lookup: F) -> Result<(), StartupError>
where
    F: Fn(&str) -> Option<String>,
{
    let result = serve(AppConfig::from_lookup(lookup)).await;
    if let Err(e) = &result {
        tracing::error!("{}", e);
    }
    result
}

async fn serve(config: Result<AppConfig, ConfigError>) -> Result<(), StartupError> {
    let config = config?;
    let store = PgPostStore::new(db::init_pool(&config.database)?);

    // Reachability is reported but not required; /health and /profiles serve
    // without a database.
    let pool = store.pool().clone();
    tokio::spawn(async move {
        match db::ping(&pool).await {
            Ok(()) => tracing::info!("Database connection verified"),
            Err(e) => tracing::warn!(error = %e, "Database is not reachable yet"),
        }
    });

    let state = AppState::new(Arc::new(store));
    let cors = configure_cors(&config.allowed_origins);
    tracing::info!(origins = ?config.allowed_origins, "CORS configured");

    let app = create_app(state, cors);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| StartupError::Bind { addr, source })?;
    tracing::info!("Server is running at {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(StartupError::Serve)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
