//! Error Taxonomy
//!
//! `BackendError` is what a capability call can fail with; `BrowserError` is
//! what the controller reports to the view layer.

use thiserror::Error;

pub type BackendResult<T> = Result<T, BackendError>;
pub type BrowserResult<T> = Result<T, BrowserError>;

/// Failure of a single backend capability call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// The bridge could not be reached or the call never completed
    #[error("backend unavailable: {0}")]
    Unavailable(String),
    /// The backend answered with an error
    #[error("backend rejected the call: {0}")]
    Rejected(String),
    /// The backend answered with something that could not be decoded
    #[error("malformed backend response: {0}")]
    Malformed(String),
}

/// Errors surfaced by the controller
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BrowserError {
    /// Backend never became reachable within the bind budget
    #[error("backend not reachable after {waited_ms} ms")]
    BindTimeout { waited_ms: u64 },
    /// A capability call failed or was rejected
    #[error("{operation} failed: {message}")]
    CallFailure {
        operation: &'static str,
        message: String,
        /// Transport-level failure (as opposed to a backend rejection)
        transport: bool,
    },
    /// Result object missing required fields or falsy without a message
    #[error("{operation} returned an invalid result: {message}")]
    InvalidResult { operation: &'static str, message: String },
    /// Input rejected before any backend call
    #[error("invalid input: {0}")]
    Validation(String),
}

impl BrowserError {
    /// Whether this error should demote the connectivity state
    pub fn is_connectivity(&self) -> bool {
        matches!(
            self,
            BrowserError::BindTimeout { .. } | BrowserError::CallFailure { transport: true, .. }
        )
    }

    /// Map a failed capability call onto the taxonomy
    pub fn from_backend(operation: &'static str, err: BackendError) -> Self {
        match err {
            BackendError::Unavailable(message) => BrowserError::CallFailure { operation, message, transport: true },
            BackendError::Rejected(message) => BrowserError::CallFailure { operation, message, transport: false },
            BackendError::Malformed(message) => BrowserError::InvalidResult { operation, message },
        }
    }

    /// Short text for a transient notification
    pub fn user_message(&self) -> String {
        match self {
            BrowserError::BindTimeout { .. } => "Backend not reachable".to_string(),
            BrowserError::CallFailure { message, .. } => message.clone(),
            BrowserError::InvalidResult { message, .. } => message.clone(),
            BrowserError::Validation(message) => message.clone(),
        }
    }
}
