//! Error types for infrastructure operations

use thiserror::Error;

/// Result type for infrastructure operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by infrastructure components
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),

    /// Failure installing the global tracing subscriber
    #[error("Logging setup error: {0}")]
    Logging(String),
}
