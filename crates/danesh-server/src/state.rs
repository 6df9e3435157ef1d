//! Server state management.

use std::sync::Arc;

use danesh_core::RetrievalOrchestrator;

/// Shared application state.
///
/// The orchestrator holds no per-query state, so handlers share it
/// without locking.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<RetrievalOrchestrator>,
}

impl AppState {
    pub fn new(orchestrator: RetrievalOrchestrator) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
        }
    }
}
