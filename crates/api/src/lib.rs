//! HTTP API for the Concierge agent gateway.
//!
//! # Endpoints
//!
//! - `GET /` - API status, available agents, completion mode
//! - `GET /agents` - Agent descriptions and tools
//! - `POST /ask` - Ask an agent a question: `{"agent": "...", "query": "..."}`
//!
//! # Architecture
//!
//! ```text
//! Client (curl/Postman/etc.)
//!    │
//!    ▼
//! ┌─────────────────┐
//! │   API Gateway   │ ◄── This crate
//! │     (Axum)      │
//! └────────┬────────┘
//!          │ registry lookup
//!          ▼
//! ┌─────────────────┐     ┌─────────────────┐
//! │     Agent       │ ──► │ Completion API  │ (when OPENAI_API_KEY is set)
//! │  (respond)      │     └─────────────────┘
//! └────────┬────────┘
//!          │ otherwise
//!          ▼
//! ┌─────────────────┐
//! │ Keyword policy  │
//! └─────────────────┘
//! ```

pub mod chat;
pub mod cli;
pub mod config;
pub mod routes;
pub mod state;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

pub use config::{ConciergeConfig, ServerConfig};
pub use state::AppState;

/// Create the API router with all routes configured.
pub fn create_router(state: Arc<AppState>) -> Router {
    let body_limit = state.body_limit;

    let routes = Router::new()
        .route("/", get(routes::status))
        .route("/agents", get(routes::list_agents))
        .route("/ask", post(routes::ask))
        .with_state(state);

    with_middleware(routes, body_limit)
}

/// Wrap routes in the server's middleware: body limit, panic recovery,
/// request tracing and permissive CORS.
pub fn with_middleware(router: Router, body_limit: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    router
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CatchPanicLayer::custom(routes::handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Start the API server on the given address and run until Ctrl-C.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> anyhow::Result<()> {
    let agents = state.registry.names();
    let openai_enabled = state.openai_enabled();
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let local_addr = listener.local_addr()?;

    info!(
        addr = %local_addr,
        agents = %agents.join(", "),
        openai_enabled,
        "Starting Concierge API server"
    );
    info!("Endpoints: GET / (status), GET /agents (list agents), POST /ask (ask an agent)");
    info!(
        r#"Example: curl -X POST http://{local_addr}/ask -H 'content-type: application/json' -d '{{"agent": "coordinator", "query": "Hello!"}}'"#
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            error!(error = %e, "Failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
    }
}
