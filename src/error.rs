//! Error types for ctxlog.
//!
//! Logging calls never fail. These errors only come out of construction:
//! loading configuration, opening sinks, installing the global logger.

use thiserror::Error;

/// Construction-time failures.
#[derive(Debug, Error)]
pub enum LogError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Rotating file error: {0}")]
    Rotation(String),

    #[error("Output `file` requires a rotation or lumberjack section")]
    MissingRotation,

    #[error("Global logger already initialized")]
    AlreadyInitialized,
}

/// Result type alias for construction operations.
pub type LogResult<T> = Result<T, LogError>;
