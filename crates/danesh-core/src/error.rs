//! Error types for danesh operations.
//!
//! Per-query failures are absorbed by the orchestrator and never reach the
//! caller of `answer_question`. The variants here surface from collaborator
//! calls and from construction, where missing stores or templates must stop
//! startup.

use std::collections::HashMap;
use thiserror::Error;

/// Result type alias for danesh operations.
pub type DaneshResult<T> = Result<T, DaneshError>;

/// Main error type for all danesh operations.
#[derive(Error, Debug)]
pub enum DaneshError {
    /// Authentication failed.
    #[error("Authentication error: {message}")]
    Authentication {
        message: String,
        code: ErrorCode,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Input validation failed.
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        code: ErrorCode,
        details: HashMap<String, String>,
        suggestion: Option<String>,
    },

    /// A requested resource does not exist.
    #[error("Not found: {message}")]
    NotFound { message: String, code: ErrorCode },

    /// Rate limit exceeded.
    #[error("Rate limit exceeded: {message}")]
    RateLimit {
        message: String,
        code: ErrorCode,
        retry_after: Option<u64>,
    },

    /// Vector index operation failed.
    #[error("Vector index error: {message}")]
    VectorStore {
        message: String,
        code: ErrorCode,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// LLM operation failed.
    #[error("LLM error: {message}")]
    Llm {
        message: String,
        code: ErrorCode,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Embedding generation failed.
    #[error("Embedding error: {message}")]
    Embedding {
        message: String,
        code: ErrorCode,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Knowledge graph operation failed.
    #[error("Knowledge graph error: {message}")]
    GraphStore {
        message: String,
        code: ErrorCode,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Re-ranking failed.
    #[error("Reranker error: {message}")]
    Reranker { message: String, code: ErrorCode },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Network error.
    #[error("Network error: {message}")]
    Network {
        message: String,
        code: ErrorCode,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Provider not supported.
    #[error("Provider not supported: {provider}")]
    UnsupportedProvider { provider: String },

    /// Parse error.
    #[error("Parse error: {message}")]
    Parse { message: String, code: ErrorCode },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error codes for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Authentication (AUTH_xxx)
    AuthInvalidKey,
    AuthMissingCredentials,

    // Validation (VAL_xxx)
    ValInvalidInput,
    ValEmptyQuestion,
    ValDimensionMismatch,

    // Lookup (NF_xxx)
    NotFound,

    // Rate Limit (RATE_xxx)
    RateLimitExceeded,

    // Vector index (VEC_xxx)
    VecConnectionFailed,
    VecOperationFailed,
    VecIndexUnavailable,

    // LLM (LLM_xxx)
    LlmConnectionFailed,
    LlmGenerationFailed,
    LlmEmptyResponse,

    // Embedding (EMB_xxx)
    EmbConnectionFailed,
    EmbGenerationFailed,

    // Graph (GRP_xxx)
    GrpOperationFailed,
    GrpGraphUnavailable,
    GrpInvalidFormat,

    // Rerank (RRK_xxx)
    RrkJudgementFailed,
    RrkParseFailed,

    // Network (NET_xxx)
    NetTimeout,
    NetConnectionFailed,

    // Parse (PARSE_xxx)
    ParseInvalidJson,
    ParseMissingField,

    // Internal
    Internal,
}

impl ErrorCode {
    /// Get the string representation of the error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::AuthInvalidKey => "AUTH_001",
            ErrorCode::AuthMissingCredentials => "AUTH_002",
            ErrorCode::ValInvalidInput => "VAL_001",
            ErrorCode::ValEmptyQuestion => "VAL_002",
            ErrorCode::ValDimensionMismatch => "VAL_003",
            ErrorCode::NotFound => "NF_001",
            ErrorCode::RateLimitExceeded => "RATE_001",
            ErrorCode::VecConnectionFailed => "VEC_001",
            ErrorCode::VecOperationFailed => "VEC_002",
            ErrorCode::VecIndexUnavailable => "VEC_003",
            ErrorCode::LlmConnectionFailed => "LLM_001",
            ErrorCode::LlmGenerationFailed => "LLM_002",
            ErrorCode::LlmEmptyResponse => "LLM_003",
            ErrorCode::EmbConnectionFailed => "EMB_001",
            ErrorCode::EmbGenerationFailed => "EMB_002",
            ErrorCode::GrpOperationFailed => "GRP_001",
            ErrorCode::GrpGraphUnavailable => "GRP_002",
            ErrorCode::GrpInvalidFormat => "GRP_003",
            ErrorCode::RrkJudgementFailed => "RRK_001",
            ErrorCode::RrkParseFailed => "RRK_002",
            ErrorCode::NetTimeout => "NET_001",
            ErrorCode::NetConnectionFailed => "NET_002",
            ErrorCode::ParseInvalidJson => "PARSE_001",
            ErrorCode::ParseMissingField => "PARSE_002",
            ErrorCode::Internal => "INT_001",
        }
    }
}

impl DaneshError {
    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            code: ErrorCode::ValInvalidInput,
            details: HashMap::new(),
            suggestion: None,
        }
    }

    /// Create a validation error with suggestion.
    pub fn validation_with_suggestion(
        message: impl Into<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self::Validation {
            message: message.into(),
            code: ErrorCode::ValInvalidInput,
            details: HashMap::new(),
            suggestion: Some(suggestion.into()),
        }
    }

    /// Embedding and index dimensionality disagree.
    pub fn dimension_mismatch(expected: usize, actual: usize) -> Self {
        let mut details = HashMap::new();
        details.insert("expected".to_string(), expected.to_string());
        details.insert("actual".to_string(), actual.to_string());
        Self::Validation {
            message: format!(
                "embedding dimension {} does not match index dimension {}",
                actual, expected
            ),
            code: ErrorCode::ValDimensionMismatch,
            details,
            suggestion: Some(
                "Use the same embedding model that was used to build the index".to_string(),
            ),
        }
    }

    /// Create a not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
            code: ErrorCode::NotFound,
        }
    }

    /// Create an LLM error.
    pub fn llm(message: impl Into<String>) -> Self {
        Self::Llm {
            message: message.into(),
            code: ErrorCode::LlmGenerationFailed,
            source: None,
        }
    }

    /// The model answered with no usable text.
    pub fn llm_empty_response(model: &str) -> Self {
        Self::Llm {
            message: format!("model '{}' returned an empty response", model),
            code: ErrorCode::LlmEmptyResponse,
            source: None,
        }
    }

    /// Create a vector store error.
    pub fn vector_store(message: impl Into<String>) -> Self {
        Self::VectorStore {
            message: message.into(),
            code: ErrorCode::VecOperationFailed,
            source: None,
        }
    }

    /// The backing vector index could not be opened.
    pub fn index_unavailable(message: impl Into<String>) -> Self {
        Self::VectorStore {
            message: message.into(),
            code: ErrorCode::VecIndexUnavailable,
            source: None,
        }
    }

    /// Create an embedding error.
    pub fn embedding(message: impl Into<String>) -> Self {
        Self::Embedding {
            message: message.into(),
            code: ErrorCode::EmbGenerationFailed,
            source: None,
        }
    }

    /// Create a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            code: ErrorCode::ParseInvalidJson,
        }
    }

    /// Create a graph store error.
    pub fn graph_store(message: impl Into<String>) -> Self {
        Self::GraphStore {
            message: message.into(),
            code: ErrorCode::GrpOperationFailed,
            source: None,
        }
    }

    /// The knowledge graph file is missing or unreadable.
    pub fn graph_unavailable(message: impl Into<String>) -> Self {
        Self::GraphStore {
            message: message.into(),
            code: ErrorCode::GrpGraphUnavailable,
            source: None,
        }
    }

    /// The knowledge graph file exists but is malformed.
    pub fn graph_format(message: impl Into<String>) -> Self {
        Self::GraphStore {
            message: message.into(),
            code: ErrorCode::GrpInvalidFormat,
            source: None,
        }
    }

    /// Create a reranker error.
    pub fn reranker(message: impl Into<String>) -> Self {
        Self::Reranker {
            message: message.into(),
            code: ErrorCode::RrkJudgementFailed,
        }
    }

    /// The rerank judgement contained no usable indices.
    pub fn rerank_parse(message: impl Into<String>) -> Self {
        Self::Reranker {
            message: message.into(),
            code: ErrorCode::RrkParseFailed,
        }
    }

    /// Create an API error.
    pub fn api(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
            code: ErrorCode::NetConnectionFailed,
            source: None,
        }
    }

    /// Create an authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
            code: ErrorCode::AuthInvalidKey,
            source: None,
        }
    }

    /// Missing API key or credentials for a provider.
    pub fn missing_credentials(provider: &str, env_var: &str) -> Self {
        Self::Authentication {
            message: format!("{} API key not provided (set {})", provider, env_var),
            code: ErrorCode::AuthMissingCredentials,
            source: None,
        }
    }

    /// Create a rate limit error.
    pub fn rate_limit(message: impl Into<String>) -> Self {
        Self::RateLimit {
            message: message.into(),
            code: ErrorCode::RateLimitExceeded,
            retry_after: None,
        }
    }

    /// Get the error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Authentication { code, .. } => *code,
            Self::Validation { code, .. } => *code,
            Self::NotFound { code, .. } => *code,
            Self::RateLimit { code, .. } => *code,
            Self::VectorStore { code, .. } => *code,
            Self::Llm { code, .. } => *code,
            Self::Embedding { code, .. } => *code,
            Self::GraphStore { code, .. } => *code,
            Self::Reranker { code, .. } => *code,
            Self::Network { code, .. } => *code,
            Self::Parse { code, .. } => *code,
            _ => ErrorCode::Internal,
        }
    }

    /// Whether retrying the same call might succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self.code(),
            ErrorCode::RateLimitExceeded
                | ErrorCode::NetTimeout
                | ErrorCode::NetConnectionFailed
                | ErrorCode::LlmConnectionFailed
                | ErrorCode::LlmGenerationFailed
                | ErrorCode::LlmEmptyResponse
                | ErrorCode::EmbConnectionFailed
                | ErrorCode::VecConnectionFailed
        )
    }

    /// Get a user-friendly suggestion for resolving this error.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::Authentication { .. } => {
                Some("Please check your API key and authentication credentials")
            }
            Self::RateLimit { .. } => Some("Please wait before making more requests"),
            Self::Validation { suggestion, .. } => suggestion.as_deref(),
            Self::VectorStore {
                code: ErrorCode::VecIndexUnavailable,
                ..
            } => Some("Build the vector index before starting the query service"),
            Self::VectorStore { .. } => Some("Please check your vector store connection settings"),
            Self::GraphStore {
                code: ErrorCode::GrpGraphUnavailable,
                ..
            } => Some("Check graph_store.path or disable the knowledge graph"),
            Self::Llm { .. } => Some("Please check your LLM provider configuration"),
            Self::Embedding { .. } => Some("Please check your embedding provider configuration"),
            _ => None,
        }
    }

    /// Convert from HTTP status code (for provider responses).
    pub fn from_http_status(status: u16, body: &str) -> Self {
        match status {
            400 => Self::Validation {
                message: body.to_string(),
                code: ErrorCode::ValInvalidInput,
                details: HashMap::new(),
                suggestion: Some("Please check your request parameters".to_string()),
            },
            401 | 403 => Self::Authentication {
                message: body.to_string(),
                code: ErrorCode::AuthInvalidKey,
                source: None,
            },
            404 => Self::NotFound {
                message: body.to_string(),
                code: ErrorCode::NotFound,
            },
            408 | 504 => Self::Network {
                message: body.to_string(),
                code: ErrorCode::NetTimeout,
                source: None,
            },
            429 => Self::RateLimit {
                message: body.to_string(),
                code: ErrorCode::RateLimitExceeded,
                retry_after: None,
            },
            _ => Self::Internal(format!("HTTP {}: {}", status, body)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error() {
        let err = DaneshError::validation("Invalid input");
        assert_eq!(err.code(), ErrorCode::ValInvalidInput);
        assert!(err.to_string().contains("Invalid input"));
    }

    #[test]
    fn test_dimension_mismatch_has_details() {
        let err = DaneshError::dimension_mismatch(768, 1536);
        assert_eq!(err.code(), ErrorCode::ValDimensionMismatch);
        assert!(err.to_string().contains("1536"));
        assert!(err.suggestion().is_some());
    }

    #[test]
    fn test_unavailable_stores_have_suggestions() {
        let err = DaneshError::index_unavailable("collection missing");
        assert_eq!(err.code().as_str(), "VEC_003");
        assert!(err.suggestion().unwrap().contains("index"));

        let err = DaneshError::graph_unavailable("no such file");
        assert_eq!(err.code().as_str(), "GRP_002");
        assert!(err.suggestion().unwrap().contains("graph_store"));
    }

    #[test]
    fn test_transient_classification() {
        assert!(DaneshError::rate_limit("slow down").is_transient());
        assert!(DaneshError::llm("boom").is_transient());
        assert!(!DaneshError::Configuration("bad".into()).is_transient());
        assert!(!DaneshError::authentication("bad key").is_transient());
    }

    #[test]
    fn test_from_http_status() {
        assert_eq!(
            DaneshError::from_http_status(429, "quota").code(),
            ErrorCode::RateLimitExceeded
        );
        assert_eq!(
            DaneshError::from_http_status(401, "nope").code(),
            ErrorCode::AuthInvalidKey
        );
        assert_eq!(
            DaneshError::from_http_status(500, "err").code(),
            ErrorCode::Internal
        );
    }

    #[test]
    fn test_error_code_as_str() {
        assert_eq!(ErrorCode::AuthInvalidKey.as_str(), "AUTH_001");
        assert_eq!(ErrorCode::RrkParseFailed.as_str(), "RRK_002");
    }
}
