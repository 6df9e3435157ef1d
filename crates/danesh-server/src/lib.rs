//! danesh-server - HTTP front end for danesh.
//!
//! Exposes the retrieval orchestrator over a small JSON API:
//!
//! - `GET /health` - liveness and index information
//! - `POST /ask` - answer a question, optionally with a diagnostic trace
//! - `POST /retrieve` - raw vector search results for a question
//!
//! # Example
//!
//! ```ignore
//! use danesh_core::DaneshConfig;
//! use danesh_server::{create_orchestrator, create_server, AppState};
//!
//! let orchestrator = create_orchestrator(&DaneshConfig::from_env()).await?;
//! let app = create_server(AppState::new(orchestrator));
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, app).await?;
//! ```

pub mod error;
pub mod factory;
pub mod logging;
pub mod middleware;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use factory::{create_orchestrator, load_config};
pub use state::AppState;

use axum::{middleware as axum_middleware, Router};
use tower_http::trace::TraceLayer;

/// Create the server with all routes and middleware.
pub fn create_server(state: AppState) -> Router {
    routes::create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::cors_layer())
        .layer(axum_middleware::from_fn(middleware::logging_middleware))
}
