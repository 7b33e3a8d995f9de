//! Common error types for REVA

use thiserror::Error;

/// Common result type for REVA operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across REVA crates
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found (or query matched nothing)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A stored row failed to decode (bad guid, timestamp, or label token).
    /// Data only gets into the store through validated ingestion, so this
    /// means the store was modified out of band.
    #[error("Corrupt stored data: {0}")]
    CorruptData(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}
