//! Execution context and the fields extracted from it.
//!
//! A [`Context`] is an immutable, cheaply cloned bag of request-scoped data:
//! named values, inbound and outbound [`Metadata`], and an optional ambient
//! span. Each `with_*` call returns a new context; nothing is shared mutably.

mod extract;
mod metadata;
mod span;

pub use extract::{extract, TRACE_ID_KEY, USER_ID_KEY, WELL_KNOWN_FIELDS};
pub use metadata::Metadata;
pub use span::{SpanContext, TraceParent};

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

/// Request-scoped data a logger can be enriched from.
#[derive(Clone, Default)]
pub struct Context {
    values: Arc<HashMap<String, Value>>,
    incoming: Option<Arc<Metadata>>,
    outgoing: Option<Arc<Metadata>>,
    span: Option<Arc<dyn SpanContext>>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a named value.
    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        Arc::make_mut(&mut self.values).insert(key.into(), value.into());
        self
    }

    /// The value bound under `key`. A bound `null` counts as absent.
    pub fn value(&self, key: &str) -> Option<&Value> {
        self.values.get(key).filter(|v| !v.is_null())
    }

    /// Attach metadata received with the request.
    pub fn with_incoming_metadata(mut self, md: Metadata) -> Self {
        self.incoming = Some(Arc::new(md));
        self
    }

    /// Attach metadata to be sent on outbound calls.
    pub fn with_outgoing_metadata(mut self, md: Metadata) -> Self {
        self.outgoing = Some(Arc::new(md));
        self
    }

    pub fn incoming_metadata(&self) -> Option<&Metadata> {
        self.incoming.as_deref()
    }

    pub fn outgoing_metadata(&self) -> Option<&Metadata> {
        self.outgoing.as_deref()
    }

    /// Bind the ambient span.
    pub fn with_span(mut self, span: Arc<dyn SpanContext>) -> Self {
        self.span = Some(span);
        self
    }

    pub fn span(&self) -> Option<&dyn SpanContext> {
        self.span.as_deref()
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("values", &self.values)
            .field("incoming", &self.incoming)
            .field("outgoing", &self.outgoing)
            .field("span", &self.span.as_ref().map(|s| s.trace_id()))
            .finish()
    }
}
