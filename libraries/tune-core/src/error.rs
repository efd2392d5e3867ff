/// Core error types for TuneViewer
use thiserror::Error;

/// Result type alias using `TuneError`
pub type Result<T> = std::result::Result<T, TuneError>;

/// Core error type for TuneViewer
///
/// The first four variants are the user-facing taxonomy: they describe a
/// logically invalid request and are never retried. The rest are failures of
/// the underlying store.
#[derive(Error, Debug)]
pub enum TuneError {
    /// Entity not found
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Caller is not allowed to perform the operation
    #[error("Permission denied: {0}")]
    Forbidden(String),

    /// Request collides with existing state (duplicate membership, taken username, ...)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Database errors (for storage implementations)
    #[error("Database error: {0}")]
    Database(String),
}

impl TuneError {
    /// Create a not found error
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Create a permission denied error
    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    /// Create a conflict error
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }
}

#[cfg(feature = "sqlx-support")]
impl From<sqlx::Error> for TuneError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database(err.to_string())
    }
}
