//! Raw retrieval endpoint.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use danesh_core::RetrievedDocument;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Request body for retrieval.
#[derive(Debug, Deserialize)]
pub struct RetrieveRequest {
    pub question: String,
    /// Maximum number of results; defaults to the configured top-k.
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct RetrieveResponse {
    pub results: Vec<RetrieveResultItem>,
}

#[derive(Debug, Serialize)]
pub struct RetrieveResultItem {
    pub id: String,
    pub source: String,
    pub score: f32,
    pub text: String,
}

impl From<RetrievedDocument> for RetrieveResultItem {
    fn from(doc: RetrievedDocument) -> Self {
        Self {
            id: doc.id,
            source: doc.source,
            score: doc.score,
            text: doc.text,
        }
    }
}

/// Search the index with the question itself, without expansion.
/// POST /retrieve
pub async fn retrieve(
    State(state): State<AppState>,
    Json(request): Json<RetrieveRequest>,
) -> ApiResult<Json<RetrieveResponse>> {
    let question = request.question.trim();
    if question.is_empty() {
        return Err(ApiError::validation("question must not be empty"));
    }
    let limit = request
        .limit
        .unwrap_or(state.orchestrator.config().top_k);

    let documents = state.orchestrator.search(question, limit).await?;

    Ok(Json(RetrieveResponse {
        results: documents.into_iter().map(Into::into).collect(),
    }))
}
