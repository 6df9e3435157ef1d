//! Question answering endpoint.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use danesh_core::AnswerTrace;

use crate::state::AppState;

/// Request body for asking a question.
#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub question: String,
    /// Include the per-query trace in the response.
    #[serde(default)]
    pub trace: bool,
}

#[derive(Debug, Serialize)]
pub struct AskResponse {
    pub answer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<AnswerTrace>,
}

/// Answer a question. Always 200: failures surface as fallback answers.
/// POST /ask
pub async fn ask(State(state): State<AppState>, Json(request): Json<AskRequest>) -> Json<AskResponse> {
    let trace = state
        .orchestrator
        .answer_question_traced(&request.question)
        .await;

    Json(AskResponse {
        answer: trace.answer.clone(),
        trace: request.trace.then_some(trace),
    })
}
