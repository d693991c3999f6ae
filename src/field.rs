//! Typed key/value fields attached to log records.
//!
//! Fields are not serialized when they are created. Each encoder walks them
//! through the [`ObjectEncoder`] hook at write time, which lets structured
//! values (such as a captured stack) be escaped by whichever encoder the
//! engine was built with.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

/// Sink for structured values, implemented by each encoder.
pub trait ObjectEncoder {
    fn add_string(&mut self, key: &str, value: &str);
    fn add_i64(&mut self, key: &str, value: i64);
    fn add_u64(&mut self, key: &str, value: u64);
    fn add_f64(&mut self, key: &str, value: f64);
    fn add_bool(&mut self, key: &str, value: bool);
    fn add_json(&mut self, key: &str, value: &Value);

    /// Add a nested object, built by the marshaler against a child encoder.
    fn add_object(&mut self, key: &str, value: &dyn ObjectMarshaler);

    /// Add a pre-formatted stacktrace blob.
    ///
    /// Encoders that print stacks outside the field list override this.
    fn add_stacktrace(&mut self, key: &str, value: &dyn fmt::Display) {
        self.add_string(key, &value.to_string());
    }
}

/// A value that knows how to describe itself as a nested object.
pub trait ObjectMarshaler: Send + Sync {
    fn marshal_log_object(&self, enc: &mut dyn ObjectEncoder);
}

/// The value half of a [`Field`].
#[derive(Clone)]
pub enum FieldValue {
    String(String),
    I64(i64),
    U64(u64),
    F64(f64),
    Bool(bool),
    /// Arbitrary JSON, used for context-local values of unknown shape.
    Json(Value),
    Object(Arc<dyn ObjectMarshaler>),
    /// Rendered with `Display` into a single text blob.
    Stacktrace(Arc<dyn fmt::Display + Send + Sync>),
}

impl fmt::Debug for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::String(s) => f.debug_tuple("String").field(s).finish(),
            FieldValue::I64(n) => f.debug_tuple("I64").field(n).finish(),
            FieldValue::U64(n) => f.debug_tuple("U64").field(n).finish(),
            FieldValue::F64(n) => f.debug_tuple("F64").field(n).finish(),
            FieldValue::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            FieldValue::Json(v) => f.debug_tuple("Json").field(v).finish(),
            FieldValue::Object(_) => f.write_str("Object(..)"),
            FieldValue::Stacktrace(_) => f.write_str("Stacktrace(..)"),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::String(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::String(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::I64(value)
    }
}

impl From<u64> for FieldValue {
    fn from(value: u64) -> Self {
        FieldValue::U64(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        FieldValue::Json(value)
    }
}

/// A single key/value pair on a log record.
#[derive(Debug, Clone)]
pub struct Field {
    key: Cow<'static, str>,
    value: FieldValue,
}

impl Field {
    pub fn new(key: impl Into<Cow<'static, str>>, value: impl Into<FieldValue>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn string(key: impl Into<Cow<'static, str>>, value: impl Into<String>) -> Self {
        Self::new(key, FieldValue::String(value.into()))
    }

    pub fn i64(key: impl Into<Cow<'static, str>>, value: i64) -> Self {
        Self::new(key, FieldValue::I64(value))
    }

    pub fn u64(key: impl Into<Cow<'static, str>>, value: u64) -> Self {
        Self::new(key, FieldValue::U64(value))
    }

    pub fn f64(key: impl Into<Cow<'static, str>>, value: f64) -> Self {
        Self::new(key, FieldValue::F64(value))
    }

    pub fn bool(key: impl Into<Cow<'static, str>>, value: bool) -> Self {
        Self::new(key, FieldValue::Bool(value))
    }

    /// Any JSON value.
    pub fn json(key: impl Into<Cow<'static, str>>, value: impl Into<Value>) -> Self {
        Self::new(key, FieldValue::Json(value.into()))
    }

    pub fn object(key: impl Into<Cow<'static, str>>, value: Arc<dyn ObjectMarshaler>) -> Self {
        Self::new(key, FieldValue::Object(value))
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &FieldValue {
        &self.value
    }

    /// Write this field into an encoder.
    pub fn encode(&self, enc: &mut dyn ObjectEncoder) {
        let key = self.key.as_ref();
        match &self.value {
            FieldValue::String(s) => enc.add_string(key, s),
            FieldValue::I64(n) => enc.add_i64(key, *n),
            FieldValue::U64(n) => enc.add_u64(key, *n),
            FieldValue::F64(n) => enc.add_f64(key, *n),
            FieldValue::Bool(b) => enc.add_bool(key, *b),
            FieldValue::Json(v) => enc.add_json(key, v),
            FieldValue::Object(obj) => enc.add_object(key, obj.as_ref()),
            FieldValue::Stacktrace(blob) => enc.add_stacktrace(key, blob.as_ref()),
        }
    }
}
