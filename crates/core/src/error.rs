//! Unified error types for the adaptive landing service.
//!
//! Error codes:
//! - INPUT_001-002: Insufficient or invalid input
//! - NOT_FOUND_001: Unknown variant, page or slug
//! - STORE_001: Document store errors

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Input error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputErrorCode {
    /// INPUT_001: The event window is empty
    EmptyEventWindow,
    /// INPUT_002: Required fields missing or invalid
    InvalidFields,
}

impl InputErrorCode {
    /// Get the error code string.
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyEventWindow => "INPUT_001",
            Self::InvalidFields => "INPUT_002",
        }
    }

    /// Get the HTTP status code.
    pub fn http_status(&self) -> u16 {
        400
    }
}

/// Store error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorCode {
    /// STORE_001: Read or write against the document store failed
    OperationFailed,
}

impl StoreErrorCode {
    /// Get the error code string.
    pub fn code(&self) -> &'static str {
        match self {
            Self::OperationFailed => "STORE_001",
        }
    }

    /// Get the HTTP status code.
    pub fn http_status(&self) -> u16 {
        500
    }
}

/// Unified error type for the adaptive landing service.
#[derive(Debug, Error)]
pub enum Error {
    /// Input error with code.
    #[error("[{code}] {message}")]
    Input {
        code: &'static str,
        message: String,
        http_status: u16,
    },

    /// Store error with code.
    #[error("[{code}] {message}")]
    Store {
        code: &'static str,
        message: String,
        http_status: u16,
    },

    #[error("validation error: {0}")]
    Validation(String),

    #[error("missing required field: {0}")]
    MissingField(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// A guarded write lost a race with a concurrent writer.
    #[error("conflicting write: {0}")]
    Conflict(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create an input error with code.
    pub fn input(code: InputErrorCode, msg: impl Into<String>) -> Self {
        Self::Input {
            code: code.code(),
            message: msg.into(),
            http_status: code.http_status(),
        }
    }

    /// Create a store error.
    pub fn store(code: StoreErrorCode, msg: impl Into<String>) -> Self {
        Self::Store {
            code: code.code(),
            message: msg.into(),
            http_status: code.http_status(),
        }
    }

    /// Shorthand for the "no events yet" input error.
    pub fn empty_window() -> Self {
        Self::input(
            InputErrorCode::EmptyEventWindow,
            "no analytics events recorded yet",
        )
    }

    /// Shorthand for a failed store operation.
    pub fn store_failed(msg: impl Into<String>) -> Self {
        Self::store(StoreErrorCode::OperationFailed, msg)
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField(field.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Get the HTTP status code for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Input { http_status, .. } => *http_status,
            Self::Store { http_status, .. } => *http_status,
            Self::Validation(_) => 400,
            Self::MissingField(_) => 400,
            Self::NotFound(_) => 404,
            Self::Conflict(_) => 409,
            Self::Internal(_) => 500,
        }
    }

    /// Get the error code if this is a coded error.
    pub fn error_code(&self) -> Option<&'static str> {
        match self {
            Self::Input { code, .. } => Some(code),
            Self::Store { code, .. } => Some(code),
            _ => None,
        }
    }
}
