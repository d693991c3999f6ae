//! Factory: an explicitly passed source of loggers, plus an optional
//! process-wide default.

use std::sync::OnceLock;

use crate::engine::Engine;
use crate::error::{LogError, LogResult};
use crate::field::Field;
use crate::logger::Logger;

static GLOBAL: OnceLock<Logger> = OnceLock::new();

/// Hands out loggers built on one engine.
#[derive(Debug, Clone)]
pub struct Factory {
    logger: Logger,
}

impl Factory {
    /// Stacktraces from `Error` up.
    pub fn new(engine: Engine) -> Self {
        Self {
            logger: Logger::new(engine),
        }
    }

    pub fn from_logger(logger: Logger) -> Self {
        Self { logger }
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    pub fn engine(&self) -> &Engine {
        self.logger.engine()
    }

    /// A factory whose loggers carry `fields`.
    pub fn with(&self, fields: Vec<Field>) -> Factory {
        Factory {
            logger: self.logger.with(fields),
        }
    }
}

/// Install the process-wide default logger. Only the first call succeeds.
pub fn init_global(logger: Logger) -> LogResult<()> {
    GLOBAL
        .set(logger)
        .map_err(|_| LogError::AlreadyInitialized)?;

    tracing::debug!("Global logger installed");
    Ok(())
}

/// The process-wide default, once installed.
pub fn global() -> Option<&'static Logger> {
    GLOBAL.get()
}
