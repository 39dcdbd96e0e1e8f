//! Server initialization and routing
//!
//! This module handles the Axum server setup including:
//! - Router configuration with all API endpoints
//! - Middleware stack (logging, compression, CORS, limits)
//! - Graceful shutdown handling

use crate::config::ServerConfig;
use crate::middleware::{log_requests, request_id};
use crate::routes::{api_index, api_info, not_found};
use crate::routes::{
    beautifier, encoding, health, ip, json, markdown, minifier, regex, time, uuid,
};
use crate::state::ServerState;
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::middleware::from_fn;
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

/// Build the Axum router with all routes and middleware
///
/// Middleware stack, outermost first:
/// 1. Tracing
/// 2. Request ID tracking
/// 3. Request logging
/// 4. CORS
/// 5. Compression
/// 6. Timeout handling
/// 7. Body size limit
pub fn build_router(state: Arc<ServerState>) -> Router {
    let cors = if state.config.enable_cors {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        CorsLayer::new()
    };

    let service_routes = Router::new()
        .route("/", get(api_info))
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check));

    let api_routes = Router::new()
        .route("/api/v1", get(api_index))
        // JSON
        .route("/api/v1/json", get(json::docs))
        .route("/api/v1/json/format", post(json::format))
        .route("/api/v1/json/validate", post(json::validate))
        // Encoding
        .route("/api/v1/encoding", get(encoding::docs))
        .route("/api/v1/encoding/base64", post(encoding::base64))
        .route("/api/v1/encoding/url", post(encoding::url))
        // UUID
        .route("/api/v1/uuid", get(uuid::docs))
        .route("/api/v1/uuid/v4", get(uuid::v4))
        .route("/api/v1/uuid/v1", get(uuid::v1))
        .route("/api/v1/uuid/validate", post(uuid::validate))
        // Time
        .route("/api/v1/time", get(time::docs))
        .route("/api/v1/time/convert", post(time::convert))
        .route("/api/v1/time/now", get(time::now))
        .route("/api/v1/time/timezones", get(time::timezones))
        // Regex
        .route("/api/v1/regex", get(regex::docs))
        .route("/api/v1/regex/test", post(regex::test))
        .route("/api/v1/regex/flags", get(regex::flags))
        // IP
        .route("/api/v1/ip", get(ip::docs))
        .route("/api/v1/ip/lookup", post(ip::lookup))
        .route("/api/v1/ip/myip", get(ip::my_ip))
        // Markdown
        .route("/api/v1/markdown", get(markdown::docs))
        .route("/api/v1/markdown/convert", post(markdown::convert))
        // Minifier
        .route("/api/v1/minifier", get(minifier::docs))
        .route("/api/v1/minifier/minify", post(minifier::minify))
        // Beautifier
        .route("/api/v1/beautifier", get(beautifier::docs))
        .route("/api/v1/beautifier/format", post(beautifier::format));

    Router::new()
        .merge(service_routes)
        .merge(api_routes)
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(state.config.max_body_size()))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            state.config.timeout(),
        ))
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(from_fn(log_requests))
        .layer(from_fn(request_id))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the devtools HTTP server
///
/// Initializes logging, builds the shared state and router, binds the
/// configured address and serves until SIGTERM or Ctrl+C.
///
/// # Example
///
/// ```rust,no_run
/// use server::ServerConfig;
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let config = ServerConfig::load()?;
///     server::start_server(config).await?;
///     Ok(())
/// }
/// ```
pub async fn start_server(config: ServerConfig) -> anyhow::Result<()> {
    init_tracing(&config);

    let state = Arc::new(ServerState::new(config.clone())?);
    let app = build_router(state);

    let addr: SocketAddr = config.socket_addr()?;

    tracing::info!("Starting devtools server on {}", addr);
    tracing::info!(
        "Timeout: {}s, Max body: {}MB",
        config.timeout_secs,
        config.max_body_size_mb
    );
    tracing::info!(
        "CORS: {}, IP lookup timeout: {}s",
        config.enable_cors,
        config.lookup_timeout_secs
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

fn init_tracing(config: &ServerConfig) {
    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(true)
        .with_thread_names(true);

    // a second initialisation (tests, embedding) keeps the first subscriber
    let result = if config.log_json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if result.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

/// Shutdown signal handler
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down..."),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down..."),
    }
}
