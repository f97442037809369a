//! Common error types for revdw

use thiserror::Error;

/// Common result type for revdw operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across revdw crates
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

    /// Malformed input from a source feed or caller
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Intermediate artifact could not be written
    #[error("Artifact error: {0}")]
    Artifact(String),
}
