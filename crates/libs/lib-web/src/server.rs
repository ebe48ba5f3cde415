//! # Server Setup
//!
//! Server initialization, route registration, and HTTP server startup.
//!
//! This module provides the main server setup function that creates the Axum router,
//! registers all routes, applies middleware, and starts the HTTP server.

// region: --- Imports
use axum::{
    extract::FromRef,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use lib_core::{create_pool, run_migrations, Config, DbPool};
use crate::chat::handlers::{
    agent_dashboard, agent_dashboard_websocket, create_session, customer_chat_websocket, get_chat_history,
    mark_history_read,
};
use crate::chat::ChatAppState;
use crate::handlers;
use crate::middleware::{log_requests, require_auth, stamp_req, RequestStamp};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;
// endregion: --- Imports

// region: --- AppState
/// Application state shared across all routes
#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub config: Config,
    pub chat: Arc<ChatAppState>,
}

impl AppState {
    pub fn new(db: DbPool, config: Config) -> Self {
        let chat = Arc::new(ChatAppState::new(db.clone(), config.clone()));
        Self { db, config, chat }
    }
}

impl FromRef<AppState> for DbPool {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for Arc<ChatAppState> {
    fn from_ref(state: &AppState) -> Self {
        state.chat.clone()
    }
}
// endregion: --- AppState

// region: --- Server Configuration
/// Server configuration
pub struct ServerConfig {
    /// Bind address override; `BIND_ADDRESS` is used when `None`
    pub bind_address: Option<String>,
    /// Allowed CORS origins
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: None,
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
                "http://localhost:8000".to_string(),
                "http://127.0.0.1:8000".to_string(),
            ],
        }
    }
}
// endregion: --- Server Configuration

// region: --- Server Setup
/// Install the global tracing subscriber, filtered by `LOG_LEVEL` (default `info`).
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_tracing() {
    let log_level = std::env::var("LOG_LEVEL")
        .unwrap_or_else(|_| "info".to_string())
        .to_lowercase();

    let filter = tracing_subscriber::EnvFilter::try_new(&log_level)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .with_file(true)
        .try_init();
}

/// Initialize and start the HTTP server
///
/// # Errors
///
/// This function will return an error if:
/// - Configuration loading fails
/// - Database connection fails
/// - Database migrations fail
/// - Server binding fails
pub async fn start_server(config: ServerConfig) -> anyhow::Result<()> {
    init_tracing();

    info!(" PARCEL SUPPORT CHAT STARTING");

    info!("Loading configuration...");
    let app_config = Config::load().map_err(|e| anyhow::anyhow!(e))?;

    info!("Database URL: {}", app_config.database_url);
    ensure_sqlite_dir(&app_config.database_url)?;

    info!("Connecting to database...");
    let pool = create_pool(&app_config.database_url).await?;

    info!(" Running database migrations");
    run_migrations(&pool).await?;
    info!(" Migrations complete");

    let bind_address = config
        .bind_address
        .clone()
        .unwrap_or_else(|| app_config.bind_address.clone());

    let state = AppState::new(pool, app_config);
    let app = create_router(state, &config.allowed_origins);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;

    info!(" SERVER READY: http://{}", bind_address);
    log_server_info();

    axum::serve(listener, app).await?;
    Ok(())
}

/// Create the parent directory of a file-backed SQLite database.
fn ensure_sqlite_dir(database_url: &str) -> anyhow::Result<()> {
    let Some(db_path) = database_url.strip_prefix("sqlite:") else {
        return Ok(());
    };
    let db_path = db_path.trim_start_matches("//");
    if db_path.starts_with(":memory:") {
        return Ok(());
    }

    if let Some(parent) = std::path::Path::new(db_path).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
            info!("Created database directory: {:?}", parent);
        }
    }
    info!("Database file will be at: {}", db_path);
    Ok(())
}

/// Create the application router with all routes
pub fn create_router(state: AppState, allowed_origins: &[String]) -> Router {
    use axum::http::{HeaderValue, Method};

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
        ]);

    info!("[ROUTE SETUP] Registering HTTP routes...");

    let protected = Router::new()
        .route("/api/chat/history/{session_id}/read", post(mark_history_read))
        .route("/api/agent/dashboard", get(agent_dashboard))
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/ws/chat/{session_id}", get(customer_chat_websocket))
        .route("/ws/agent-dashboard", get(agent_dashboard_websocket))
        .route("/api/chat/sessions", post(create_session))
        .route("/api/chat/history/{session_id}", get(get_chat_history))
        .route("/api/faqs", get(handlers::faqs::list_faqs))
        .route("/health", get(handlers::faqs::health))
        .merge(protected)
        .fallback(|| async {
            info!("[404 HANDLER] Unmatched route - returning 404");
            (axum::http::StatusCode::NOT_FOUND, "Route not found")
        })
        .with_state(state)
        // Comprehensive request/response logging
        .layer(from_fn(log_requests))
        // Tower HTTP trace layer for spans
        .layer(
            tower_http::trace::TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        request_id = %RequestStamp::id_of(request),
                        method = %request.method(),
                        uri = %request.uri().path(),
                        version = ?request.version(),
                    )
                })
                .on_failure(|error: tower_http::classify::ServerErrorsFailureClass, latency: std::time::Duration, span: &tracing::Span| {
                    let _enter = span.enter();
                    tracing::error!(
                        error = ?error,
                        latency_ms = latency.as_millis(),
                        "[HTTP FAILURE] Error: {:?}, Latency: {}ms",
                        error,
                        latency.as_millis()
                    );
                })
        )
        // Request stamping (adds request ID) - wraps logging and tracing
        .layer(from_fn(stamp_req))
        .layer(cors)
}

/// Log server information
fn log_server_info() {
    info!(" CHAT SOCKETS:");
    info!("   • WS   /ws/chat/{{session_id}}?token={{jwt}}&name={{display_name}}");
    info!("   • WS   /ws/agent-dashboard?token={{jwt}}");
    info!(" CHAT:");
    info!("   • POST /api/chat/sessions");
    info!("   • GET  /api/chat/history/{{session_id}}");
    info!("   • POST /api/chat/history/{{session_id}}/read (agent)");
    info!("   • GET  /api/agent/dashboard (agent)");
    info!(" KNOWLEDGE BASE:");
    info!("   • GET  /api/faqs?category={{category}}&search={{text}}");
    info!(" HEALTH:");
    info!("   • GET  /health");
}
// endregion: --- Server Setup
