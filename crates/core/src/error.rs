//! Error types for Sanad.
//!
//! One enum covers configuration, I/O, serialization and prompt failures as
//! well as the failure taxonomy of the answering core: an unavailable
//! document store, an unavailable or slow remote model, and a missing
//! lookup table.

use thiserror::Error;

/// Unified error type for Sanad.
///
/// All fallible functions return `Result<T, AppError>`.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Prompt loading or rendering errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// The document store could not be reached or failed a query.
    /// Fatal for the current query only.
    #[error("Document store unavailable: {0}")]
    StoreUnavailable(String),

    /// The remote model rejected the request or could not be reached
    #[error("Remote model unavailable: {0}")]
    RemoteUnavailable(String),

    /// The remote model did not answer within the deadline
    #[error("Remote model timed out after {seconds}s")]
    RemoteTimeout { seconds: u64 },

    /// The lookup table is missing or unreadable; queries fall back to search
    #[error("Lookup table unavailable: {0}")]
    LookupTableUnavailable(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl AppError {
    /// Whether the error came from the remote model collaborator.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            AppError::RemoteUnavailable(_) | AppError::RemoteTimeout { .. }
        )
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
