//! Generation errors and the failure reasons reported to callers.

use thiserror::Error;

/// Errors from a [`crate::TextGenerator`] call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GenerationError {
    #[error("no API credential configured")]
    MissingCredential,

    #[error("provider unavailable: {0}")]
    Unavailable(String),

    #[error("request timed out after {0}s")]
    Timeout(u64),

    #[error("invalid provider response: {0}")]
    InvalidResponse(String),
}

/// Why the AI path was abandoned for the fallback.
///
/// `Display` yields the short tagged reason surfaced as `aiError`. The
/// detail of a shape failure is logged, not returned.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AiFailure {
    #[error("missing credential")]
    MissingCredential,

    #[error("call failed: {0}")]
    CallFailed(String),

    #[error("invalid response shape")]
    InvalidShape { detail: String },
}

impl AiFailure {
    pub fn invalid_shape(detail: impl Into<String>) -> Self {
        Self::InvalidShape {
            detail: detail.into(),
        }
    }

    /// Whether the provider itself looks unhealthy, as opposed to one bad answer.
    pub fn is_provider_fault(&self) -> bool {
        !matches!(self, Self::InvalidShape { .. })
    }
}

impl From<GenerationError> for AiFailure {
    fn from(err: GenerationError) -> Self {
        match err {
            GenerationError::MissingCredential => Self::MissingCredential,
            GenerationError::Unavailable(msg) => Self::CallFailed(msg),
            GenerationError::Timeout(secs) => Self::CallFailed(format!("timed out after {}s", secs)),
            GenerationError::InvalidResponse(detail) => Self::InvalidShape { detail },
        }
    }
}
