//! Error types for pagecopy-core

use thiserror::Error;

/// Result type alias for pagecopy operations
pub type Result<T> = std::result::Result<T, PagecopyError>;

/// Main error type for pagecopy operations
#[derive(Error, Debug)]
pub enum PagecopyError {
    /// Malformed or missing required parameters
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Actor lacks the required page permission
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Record-store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Record-store specific errors
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// Record not found
    #[error("Record not found: {table} {uid}")]
    RecordNotFound { table: &'static str, uid: i64 },

    /// Field not writable through the store boundary
    #[error("Unknown field: {0}")]
    UnknownField(String),
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Database(err.to_string())
    }
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for PagecopyError {
    fn from(err: rusqlite::Error) -> Self {
        PagecopyError::Store(StoreError::Database(err.to_string()))
    }
}
