//! Error types for interchange operations.

use thiserror::Error;

/// Errors raised while loading or writing interchange documents.
#[derive(Debug, Error)]
pub enum InterchangeError {
    /// JSON parsing or serialization error.
    #[error("JSON error: {0}")]
    Json(String),

    /// IO error during read/write.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A document that parsed but does not describe a valid project.
    #[error("Invalid {kind}: {message}")]
    Invalid { kind: &'static str, message: String },
}

impl InterchangeError {
    /// Create a JSON error.
    pub fn json(message: impl Into<String>) -> Self {
        Self::Json(message.into())
    }

    pub fn invalid_type(message: impl Into<String>) -> Self {
        Self::Invalid {
            kind: "type",
            message: message.into(),
        }
    }

    pub fn invalid_member(message: impl Into<String>) -> Self {
        Self::Invalid {
            kind: "member",
            message: message.into(),
        }
    }

    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::Invalid {
            kind: "config",
            message: message.into(),
        }
    }
}
