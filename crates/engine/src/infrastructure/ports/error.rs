//! Error types for port operations.

/// Persistence errors with context for debugging.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    /// Database operation failed - includes operation name for tracing.
    #[error("Database error in {operation}: {message}")]
    Database {
        operation: &'static str,
        message: String,
    },

    /// Serialization/deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl RepoError {
    /// Create a Database error with operation context.
    pub fn database(operation: &'static str, message: impl ToString) -> Self {
        Self::Database {
            operation,
            message: message.to_string(),
        }
    }

    pub fn serialization(message: impl ToString) -> Self {
        Self::Serialization(message.to_string())
    }
}

/// Transport-level failures talking to a language model.
#[derive(Debug, Clone, thiserror::Error)]
pub enum LlmError {
    #[error("LLM request failed: {0}")]
    RequestFailed(String),
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Why the narrative generator produced nothing usable.
///
/// Every variant is recoverable: callers substitute fallback content.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GeneratorError {
    #[error("Narrative generator unavailable")]
    Unavailable,
    #[error("Narrative generator timed out after {0}s")]
    Timeout(u64),
    #[error("Generator request failed: {0}")]
    RequestFailed(String),
    #[error("Generator returned an invalid response: {0}")]
    InvalidResponse(String),
}

impl From<LlmError> for GeneratorError {
    fn from(value: LlmError) -> Self {
        match value {
            LlmError::RequestFailed(msg) => Self::RequestFailed(msg),
            LlmError::InvalidResponse(msg) => Self::InvalidResponse(msg),
        }
    }
}
