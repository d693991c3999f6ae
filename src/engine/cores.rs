//! Cores: the part of the engine that filters and writes records.

use std::io::Write;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::encoder::{short_caller, Encoder, Entry, MapEncoder};
use crate::field::Field;
use crate::level::Level;

/// Filtering and output for an [`Engine`](super::Engine).
///
/// Implementations must be safe to call from many threads at once.
pub trait Core: Send + Sync {
    /// Whether records at `level` are written at all.
    fn enabled(&self, level: Level) -> bool;

    /// Write one record. Failures are the core's to handle; nothing is returned.
    fn write(&self, entry: &Entry<'_>, bound: &[Field], fields: &[Field]);

    /// Flush buffered output.
    fn sync(&self);
}

/// Encodes records and writes them to an `io::Write` sink.
pub struct IoCore {
    encoder: Encoder,
    level: Level,
    writer: Mutex<Box<dyn Write + Send>>,
}

impl IoCore {
    pub fn new(encoder: Encoder, writer: impl Write + Send + 'static, level: Level) -> Self {
        Self {
            encoder,
            level,
            writer: Mutex::new(Box::new(writer)),
        }
    }

    fn writer(&self) -> MutexGuard<'_, Box<dyn Write + Send>> {
        self.writer.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Core for IoCore {
    fn enabled(&self, level: Level) -> bool {
        level >= self.level
    }

    fn write(&self, entry: &Entry<'_>, bound: &[Field], fields: &[Field]) {
        let line = self.encoder.encode(entry, bound, fields);
        // A full disk or closed pipe must not take the caller down
        let _ = self.writer().write_all(&line);
    }

    fn sync(&self) {
        let _ = self.writer().flush();
    }
}

/// Forwards records to the `tracing` dispatcher as events with target `ctxlog`.
///
/// Record fields travel as one JSON-encoded `fields` value, so whatever
/// subscriber is installed decides the final layout.
pub struct TracingCore {
    level: Level,
}

impl TracingCore {
    pub fn new(level: Level) -> Self {
        Self { level }
    }
}

impl Core for TracingCore {
    fn enabled(&self, level: Level) -> bool {
        level >= self.level
    }

    fn write(&self, entry: &Entry<'_>, bound: &[Field], fields: &[Field]) {
        let mut enc = MapEncoder::new();
        for field in bound.iter().chain(fields) {
            field.encode(&mut enc);
        }
        let fields = serde_json::to_string(&enc.into_map()).unwrap_or_default();
        let caller = entry.caller.map(short_caller).unwrap_or_default();
        let logger = entry.logger_name.unwrap_or_default();
        let message = entry.message;

        match entry.level {
            Level::Debug => {
                tracing::debug!(target: "ctxlog", logger, caller = %caller, fields = %fields, "{}", message)
            }
            Level::Info => {
                tracing::info!(target: "ctxlog", logger, caller = %caller, fields = %fields, "{}", message)
            }
            Level::Warn => {
                tracing::warn!(target: "ctxlog", logger, caller = %caller, fields = %fields, "{}", message)
            }
            level => tracing::error!(
                target: "ctxlog",
                level = level.as_str(),
                logger,
                caller = %caller,
                fields = %fields,
                "{}",
                message
            ),
        }
    }

    fn sync(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::SharedBuffer;
    use chrono::Local;
    use std::io;

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }
    }

    fn entry(level: Level) -> Entry<'static> {
        Entry {
            level,
            time: Local::now(),
            logger_name: None,
            message: "hello",
            caller: None,
        }
    }

    #[test]
    fn test_io_core_filters_by_level() {
        let core = IoCore::new(Encoder::json(), SharedBuffer::default(), Level::Warn);

        assert!(!core.enabled(Level::Info));
        assert!(core.enabled(Level::Warn));
        assert!(core.enabled(Level::Fatal));
    }

    #[test]
    fn test_io_core_writes_encoded_line() {
        let buffer = SharedBuffer::default();
        let core = IoCore::new(Encoder::json(), buffer.clone(), Level::Info);

        core.write(&entry(Level::Info), &[Field::string("a", "1")], &[]);
        core.sync();

        let records = buffer.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["msg"], "hello");
        assert_eq!(records[0]["a"], "1");
    }

    #[test]
    fn test_io_core_swallows_write_errors() {
        let core = IoCore::new(Encoder::json(), BrokenPipe, Level::Info);

        core.write(&entry(Level::Error), &[], &[]);
        core.sync();
    }

    #[test]
    fn test_tracing_core_without_subscriber() {
        let core = TracingCore::new(Level::Debug);

        assert!(core.enabled(Level::Debug));
        core.write(&entry(Level::Fatal), &[], &[Field::bool("ok", true)]);
    }
}
