//! Error handling for the HTTP API.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::fmt;

use danesh_core::error::DaneshError;

/// API error type.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl ApiError {
    pub fn new(status: StatusCode, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            code: code.into(),
            message: message.into(),
            suggestion: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.status, self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.code,
                message: self.message,
                suggestion: self.suggestion,
            },
        };

        (self.status, Json(body)).into_response()
    }
}

impl From<DaneshError> for ApiError {
    fn from(err: DaneshError) -> Self {
        let status = match &err {
            DaneshError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            DaneshError::Authentication { .. } => StatusCode::UNAUTHORIZED,
            DaneshError::NotFound { .. } => StatusCode::NOT_FOUND,
            DaneshError::RateLimit { .. } => StatusCode::TOO_MANY_REQUESTS,
            DaneshError::Configuration(_) | DaneshError::UnsupportedProvider { .. } => {
                StatusCode::BAD_REQUEST
            }
            DaneshError::VectorStore { .. }
            | DaneshError::Embedding { .. }
            | DaneshError::Llm { .. }
            | DaneshError::Network { .. } => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!("Request failed: {}", err);
        }

        Self {
            status,
            code: err.code().as_str().to_string(),
            suggestion: err.suggestion().map(str::to_string),
            message: err.to_string(),
        }
    }
}

/// Result type alias for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let err: ApiError = DaneshError::dimension_mismatch(768, 3).into();
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.code, "VAL_003");

        let err: ApiError = DaneshError::embedding("down").into();
        assert_eq!(err.status, StatusCode::BAD_GATEWAY);

        let err: ApiError = DaneshError::rate_limit("slow").into();
        assert_eq!(err.status, StatusCode::TOO_MANY_REQUESTS);
    }
}
