//! Ambient span capability.
//!
//! The extractor only needs a trace id from whatever tracing backend produced
//! the span, so the dependency is a two-method trait rather than a concrete
//! span type.

use super::Metadata;

/// Trace identity of the span bound to a context.
pub trait SpanContext: Send + Sync {
    /// Trace id in its canonical text form.
    fn trace_id(&self) -> String;

    /// False for placeholder or unsampled-and-empty contexts whose id is meaningless.
    fn is_valid(&self) -> bool;
}

/// A parsed W3C `traceparent` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceParent {
    trace_id: String,
    span_id: String,
    sampled: bool,
}

impl TraceParent {
    /// Header name carrying the trace context.
    pub const HEADER: &'static str = "traceparent";

    /// Parse `version-traceid-spanid-flags`. Returns `None` for malformed or all-zero ids.
    pub fn parse(header: &str) -> Option<Self> {
        let mut parts = header.trim().split('-');
        let version = parts.next()?;
        let trace_id = parts.next()?;
        let span_id = parts.next()?;
        let flags = parts.next()?;

        if !is_hex(version, 2) || version == "ff" {
            return None;
        }
        // Version 00 has exactly four parts; later versions may append more
        if version == "00" && parts.next().is_some() {
            return None;
        }
        if !is_hex(trace_id, 32) || is_zero(trace_id) {
            return None;
        }
        if !is_hex(span_id, 16) || is_zero(span_id) {
            return None;
        }
        if !is_hex(flags, 2) {
            return None;
        }
        let flags = u8::from_str_radix(flags, 16).ok()?;

        Some(Self {
            trace_id: trace_id.to_string(),
            span_id: span_id.to_string(),
            sampled: flags & 0x01 == 0x01,
        })
    }

    /// Read the header from request metadata.
    pub fn from_metadata(md: &Metadata) -> Option<Self> {
        md.first(Self::HEADER).and_then(Self::parse)
    }

    pub fn span_id(&self) -> &str {
        &self.span_id
    }

    pub fn sampled(&self) -> bool {
        self.sampled
    }
}

impl SpanContext for TraceParent {
    fn trace_id(&self) -> String {
        self.trace_id.clone()
    }

    fn is_valid(&self) -> bool {
        true
    }
}

#[cfg(feature = "opentelemetry")]
impl SpanContext for opentelemetry::trace::SpanContext {
    fn trace_id(&self) -> String {
        opentelemetry::trace::SpanContext::trace_id(self).to_string()
    }

    fn is_valid(&self) -> bool {
        opentelemetry::trace::SpanContext::is_valid(self)
    }
}

fn is_hex(s: &str, len: usize) -> bool {
    s.len() == len && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

fn is_zero(s: &str) -> bool {
    s.bytes().all(|b| b == b'0')
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01";

    #[test]
    fn test_parse_traceparent() {
        let tp = TraceParent::parse(HEADER).unwrap();

        assert_eq!(tp.trace_id(), "4bf92f3577b34da6a3ce929d0e0e4736");
        assert_eq!(tp.span_id(), "00f067aa0ba902b7");
        assert!(tp.sampled());
        assert!(tp.is_valid());
    }

    #[test]
    fn test_parse_rejects_bad_headers() {
        assert!(TraceParent::parse("").is_none());
        assert!(TraceParent::parse("00-4bf92f35-00f067aa0ba902b7-01").is_none());
        assert!(TraceParent::parse("00-00000000000000000000000000000000-00f067aa0ba902b7-01").is_none());
        assert!(TraceParent::parse("ff-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01").is_none());
        assert!(TraceParent::parse("00-4BF92F3577B34DA6A3CE929D0E0E4736-00f067aa0ba902b7-01").is_none());
        assert!(TraceParent::parse(&format!("{HEADER}-extra")).is_none());
    }

    #[test]
    fn test_from_metadata() {
        let md = Metadata::from_pairs([("Traceparent", HEADER)]);
        let tp = TraceParent::from_metadata(&md).unwrap();

        assert_eq!(tp.trace_id(), "4bf92f3577b34da6a3ce929d0e0e4736");
    }
}
