//! ctxlog - structured logging with stacktraces and request context
//!
//! A leveled logging facade over a pluggable engine. Records at or above a
//! configurable severity carry a stacktrace captured with pooled buffers;
//! `ctx` enriches a logger with trace and request identifiers found in an
//! execution [`Context`].
//!
//! ```no_run
//! use ctxlog::{Context, Field, Metadata, Store, StoreConfig};
//!
//! let store = Store::new(StoreConfig::default())?;
//! let logger = store.logger();
//!
//! let ctx = Context::new()
//!     .with_value("userId", "u-42")
//!     .with_incoming_metadata(Metadata::from_pairs([("traceId", "t-1")]));
//! logger.ctx(Some(&ctx)).info("payment accepted", vec![Field::i64("amount", 1200)]);
//! # Ok::<(), ctxlog::LogError>(())
//! ```

pub mod context;
pub mod engine;
pub mod error;
pub mod factory;
pub mod field;
pub mod level;
pub mod logger;
pub mod stack;
pub mod store;

#[cfg(test)]
mod testing;

pub use context::{Context, Metadata, SpanContext, TraceParent};
pub use engine::{Engine, FatalHook};
pub use error::{LogError, LogResult};
pub use factory::{global, init_global, Factory};
pub use field::{Field, FieldValue, ObjectEncoder, ObjectMarshaler};
pub use level::Level;
pub use logger::Logger;
pub use store::{LumberjackConfig, Output, RotationConfig, RotationPeriod, Store, StoreConfig};
