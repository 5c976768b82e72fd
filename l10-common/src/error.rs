//! Common error types for L10

use thiserror::Error;

/// Common result type for L10 operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the L10 service and facade
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested session, section or agenda entry not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Operation not valid in the current session state
    /// (pause while paused, resume while running, mutate an ended session)
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// An active session already exists for the requested scope
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Caller addressed a session outside its organization/team scope
    #[error("Permission denied: {0}")]
    Permission(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}
