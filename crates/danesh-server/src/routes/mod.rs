//! Route definitions for the HTTP API.

mod ask;
mod health;
mod retrieve;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

/// Create the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/ask", post(ask::ask))
        .route("/retrieve", post(retrieve::retrieve))
        .with_state(state)
}

pub use ask::*;
pub use health::*;
pub use retrieve::*;
