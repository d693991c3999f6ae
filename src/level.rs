//! Log severity levels.
//!
//! Ordering is ascending severity, so `level >= threshold` is the check used
//! both for filtering and for stack-capture gating.

use std::fmt;

/// Severity of a log record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Level {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    /// Logged like `Error`; reserved for conditions that would panic in development.
    DPanic,
    /// Panics after the record is written.
    Panic,
    /// Terminates the process after the record is written.
    Fatal,
}

impl Level {
    /// Parse a level from configuration text.
    ///
    /// Accepts the all-lowercase and all-uppercase spellings. Anything else,
    /// including the empty string, falls back to `Info`.
    pub fn from_text(text: &str) -> Self {
        match text {
            "debug" | "DEBUG" => Level::Debug,
            "info" | "INFO" | "" => Level::Info,
            "warn" | "WARN" => Level::Warn,
            "error" | "ERROR" => Level::Error,
            "dpanic" | "DPANIC" => Level::DPanic,
            "panic" | "PANIC" => Level::Panic,
            "fatal" | "FATAL" => Level::Fatal,
            _ => Level::Info,
        }
    }

    /// Lowercase name, as written by the JSON encoder.
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
            Level::DPanic => "dpanic",
            Level::Panic => "panic",
            Level::Fatal => "fatal",
        }
    }

    /// Uppercase name, as written by the console encoder.
    pub fn capital_str(&self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
            Level::DPanic => "DPANIC",
            Level::Panic => "PANIC",
            Level::Fatal => "FATAL",
        }
    }

    /// ANSI color code used for the console level column.
    pub(crate) fn color(&self) -> u8 {
        match self {
            Level::Debug => 35,
            Level::Info => 34,
            Level::Warn => 33,
            Level::Error | Level::DPanic | Level::Panic | Level::Fatal => 31,
        }
    }

    /// Nearest `tracing` level. Everything at or above `Error` maps to `ERROR`.
    pub fn as_tracing(&self) -> tracing::Level {
        match self {
            Level::Debug => tracing::Level::DEBUG,
            Level::Info => tracing::Level::INFO,
            Level::Warn => tracing::Level::WARN,
            _ => tracing::Level::ERROR,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_ordering() {
        assert!(Level::Debug < Level::Info);
        assert!(Level::Info < Level::Warn);
        assert!(Level::Warn < Level::Error);
        assert!(Level::Error < Level::DPanic);
        assert!(Level::DPanic < Level::Panic);
        assert!(Level::Panic < Level::Fatal);
    }

    #[test]
    fn test_from_text_known_spellings() {
        assert_eq!(Level::from_text("debug"), Level::Debug);
        assert_eq!(Level::from_text("WARN"), Level::Warn);
        assert_eq!(Level::from_text("error"), Level::Error);
        assert_eq!(Level::from_text("DPANIC"), Level::DPanic);
        assert_eq!(Level::from_text("fatal"), Level::Fatal);
    }

    #[test]
    fn test_from_text_defaults_to_info() {
        assert_eq!(Level::from_text(""), Level::Info);
        assert_eq!(Level::from_text("verbose"), Level::Info);
        // Mixed case is not a recognized spelling
        assert_eq!(Level::from_text("Error"), Level::Info);
    }

    #[test]
    fn test_display_is_lowercase() {
        assert_eq!(Level::DPanic.to_string(), "dpanic");
        assert_eq!(Level::Warn.capital_str(), "WARN");
    }

    #[test]
    fn test_as_tracing_saturates_at_error() {
        assert_eq!(Level::Debug.as_tracing(), tracing::Level::DEBUG);
        assert_eq!(Level::Warn.as_tracing(), tracing::Level::WARN);
        assert_eq!(Level::Fatal.as_tracing(), tracing::Level::ERROR);
    }
}
