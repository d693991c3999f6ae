//! The logging facade.
//!
//! A [`Logger`] wraps an [`Engine`] and adds two things: a stacktrace on
//! records at or above the stack threshold, and `ctx` enrichment from a
//! request [`Context`]. Handles are immutable; `with` and `ctx` branch.

use std::panic::Location;

use crate::context::{self, Context, WELL_KNOWN_FIELDS};
use crate::engine::Engine;
use crate::field::Field;
use crate::level::Level;
use crate::stack;

/// Frames between `stack_skip` and the caller of a level method:
/// `emit`, then the level method itself.
const STACK_SKIP: usize = 2;

/// Immutable logging handle.
#[derive(Debug, Clone)]
pub struct Logger {
    engine: Engine,
    stack_level: Level,
    json_stacktrace: bool,
    context_fields: &'static [&'static str],
}

impl Logger {
    /// Wrap an engine. Stacktraces are attached from `Error` up, as text.
    pub fn new(engine: Engine) -> Self {
        Self {
            engine,
            stack_level: Level::Error,
            json_stacktrace: false,
            context_fields: WELL_KNOWN_FIELDS,
        }
    }

    /// Attach stacktraces to records at or above `level`.
    pub fn with_stack_level(mut self, level: Level) -> Self {
        self.stack_level = level;
        self
    }

    /// Emit stacktraces as structured objects instead of text.
    pub fn with_json_stacktrace(mut self, enabled: bool) -> Self {
        self.json_stacktrace = enabled;
        self
    }

    /// Names `ctx` looks up, in order.
    pub fn with_context_fields(mut self, names: &'static [&'static str]) -> Self {
        self.context_fields = names;
        self
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn stack_level(&self) -> Level {
        self.stack_level
    }

    pub fn json_stacktrace(&self) -> bool {
        self.json_stacktrace
    }

    #[track_caller]
    #[inline(never)]
    pub fn debug(&self, msg: &str, fields: Vec<Field>) {
        self.emit(Level::Debug, msg, fields, Location::caller());
    }

    #[track_caller]
    #[inline(never)]
    pub fn info(&self, msg: &str, fields: Vec<Field>) {
        self.emit(Level::Info, msg, fields, Location::caller());
    }

    #[track_caller]
    #[inline(never)]
    pub fn warn(&self, msg: &str, fields: Vec<Field>) {
        self.emit(Level::Warn, msg, fields, Location::caller());
    }

    #[track_caller]
    #[inline(never)]
    pub fn error(&self, msg: &str, fields: Vec<Field>) {
        self.emit(Level::Error, msg, fields, Location::caller());
    }

    /// Log and terminate the process.
    #[track_caller]
    #[inline(never)]
    pub fn fatal(&self, msg: &str, fields: Vec<Field>) {
        self.emit(Level::Fatal, msg, fields, Location::caller());
    }

    /// A new handle with `fields` bound to every record it writes.
    pub fn with(&self, fields: Vec<Field>) -> Logger {
        Logger {
            engine: self.engine.with(fields),
            ..self.clone()
        }
    }

    /// A new handle enriched with the trace and request fields found in `ctx`.
    pub fn ctx(&self, ctx: Option<&Context>) -> Logger {
        match ctx {
            Some(ctx) => self.with(context::extract(Some(ctx), self.context_fields)),
            None => self.clone(),
        }
    }

    #[inline(never)]
    fn emit(
        &self,
        level: Level,
        msg: &str,
        mut fields: Vec<Field>,
        caller: &'static Location<'static>,
    ) {
        if level >= self.stack_level {
            fields.push(stack::stack_skip(STACK_SKIP, self.json_stacktrace));
        }
        self.engine.log_at(level, msg, fields, caller);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Metadata;
    use crate::engine::{Encoder, FatalHook, IoCore};
    use crate::stack::STACKTRACE_KEY;
    use crate::testing::SharedBuffer;
    use serde_json::Value;
    use std::hint::black_box;
    use std::sync::Arc;

    fn logger(level: Level) -> (Logger, SharedBuffer) {
        let buffer = SharedBuffer::default();
        let core = IoCore::new(Encoder::json(), buffer.clone(), level);
        let engine = Engine::new(Arc::new(core))
            .with_caller(true)
            .with_fatal_hook(FatalHook::Panic);
        (Logger::new(engine), buffer)
    }

    /// Logs one error and returns the line of the call.
    #[inline(never)]
    fn error_here(logger: &Logger) -> u32 {
        let line = line!() + 1;
        logger.error("boom", vec![]);
        black_box(line)
    }

    fn stack_fields(records: &[Value]) -> Vec<usize> {
        records
            .iter()
            .map(|r| usize::from(r.get(STACKTRACE_KEY).is_some()))
            .collect()
    }

    #[test]
    fn test_stack_threshold_gating() {
        let (logger, buffer) = logger(Level::Debug);
        let logger = logger.with_stack_level(Level::Warn);

        logger.debug("d", vec![]);
        logger.info("i", vec![]);
        logger.warn("w", vec![]);
        logger.error("e", vec![]);

        assert_eq!(stack_fields(&buffer.records()), vec![0, 0, 1, 1]);
    }

    #[test]
    fn test_text_stack_starts_at_call_site() {
        let (logger, buffer) = logger(Level::Info);

        let line = error_here(&logger);

        let records = buffer.records();
        let text = records[0][STACKTRACE_KEY].as_str().unwrap();
        let mut lines = text.lines();
        let function = lines.next().unwrap();
        let location = lines.next().unwrap();
        assert!(function.ends_with("::error_here"), "{function}");
        assert!(location.ends_with(&format!("logger.rs:{line}")), "{location}");
    }

    #[test]
    fn test_json_stack_starts_at_call_site() {
        let (logger, buffer) = logger(Level::Info);
        let logger = logger.with_json_stacktrace(true);

        let line = error_here(&logger);

        let records = buffer.records();
        let top = &records[0][STACKTRACE_KEY]["0"];
        let func = top["func"].as_str().unwrap();
        let file = top["file"].as_str().unwrap();
        assert!(func.ends_with("::error_here"), "{func}");
        assert!(file.ends_with(&format!("logger.rs:{line}")), "{file}");
    }

    #[test]
    fn test_caller_is_the_call_site() {
        let (logger, buffer) = logger(Level::Info);

        let line = line!() + 1;
        logger.info("here", vec![]);

        assert_eq!(buffer.records()[0]["caller"], format!("src/logger.rs:{line}"));
    }

    #[test]
    fn test_filtered_records_skip_output_but_not_gating() {
        let (logger, buffer) = logger(Level::Error);
        let logger = logger.with_stack_level(Level::Debug);

        logger.info("dropped", vec![]);
        logger.error("kept", vec![]);

        let records = buffer.records();
        assert_eq!(records.len(), 1);
        assert!(records[0].get(STACKTRACE_KEY).is_some());
    }

    #[test]
    fn test_branch_independence() {
        let (h1, buffer) = logger(Level::Info);

        let mut f = vec![Field::string("requestId", "r-1")];
        let h2 = h1.with(f.clone());
        // Changing the caller's vector afterwards does not reach h2
        f[0] = Field::string("requestId", "r-2");
        f.push(Field::string("extra", "x"));

        h1.info("one", vec![]);
        h2.info("two", vec![]);
        h1.info("three", vec![]);

        let records = buffer.records();
        assert!(records[0].get("requestId").is_none());
        assert_eq!(records[1]["requestId"], "r-1");
        assert!(records[1].get("extra").is_none());
        assert!(records[2].get("requestId").is_none());
        assert_eq!(h2.stack_level(), h1.stack_level());
    }

    #[test]
    fn test_ctx_binds_extracted_fields() {
        let (logger, buffer) = logger(Level::Info);
        let ctx = Context::new()
            .with_value("userId", "a")
            .with_incoming_metadata(Metadata::from_pairs([("userId", "b")]));

        logger.ctx(Some(&ctx)).info("hello", vec![]);
        logger.ctx(None).info("plain", vec![]);

        let records = buffer.records();
        // Metadata was appended last and wins
        assert_eq!(records[0]["userId"], "b");
        assert!(records[1].get("userId").is_none());
    }

    #[test]
    fn test_custom_context_fields() {
        let (logger, buffer) = logger(Level::Info);
        let logger = logger.with_context_fields(&["tenant"]);
        let ctx = Context::new().with_value("tenant", "acme").with_value("userId", "u");

        logger.ctx(Some(&ctx)).info("x", vec![]);

        let records = buffer.records();
        assert_eq!(records[0]["tenant"], "acme");
        assert!(records[0].get("userId").is_none());
    }

    #[test]
    fn test_fatal_writes_with_stack_then_stops() {
        let (logger, buffer) = logger(Level::Info);

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            logger.fatal("unrecoverable", vec![]);
        }));

        assert!(result.is_err());
        let records = buffer.records();
        assert_eq!(records[0]["level"], "fatal");
        assert!(records[0].get(STACKTRACE_KEY).is_some());
    }

    #[test]
    fn test_concurrent_logging_on_shared_handle() {
        let (logger, buffer) = logger(Level::Info);
        let logger = logger.with_stack_level(Level::Warn);

        std::thread::scope(|s| {
            for worker in 0..8i64 {
                let logger = logger.with(vec![Field::i64("worker", worker)]);
                s.spawn(move || {
                    for _ in 0..25 {
                        logger.info("tick", vec![]);
                        logger.warn("tock", vec![]);
                    }
                });
            }
        });

        let records = buffer.records();
        assert_eq!(records.len(), 8 * 50);
        assert!(records
            .iter()
            .all(|r| (r["msg"] == "tock") == r.get(STACKTRACE_KEY).is_some()));
    }
}
