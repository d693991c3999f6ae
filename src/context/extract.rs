//! Context field extraction.

use super::Context;
use crate::field::Field;

pub const USER_ID_KEY: &str = "userId";
pub const TRACE_ID_KEY: &str = "traceId";

/// Names looked up in context values and metadata, in extraction order.
pub const WELL_KNOWN_FIELDS: &[&str] = &[USER_ID_KEY, TRACE_ID_KEY];

/// Collect log fields from a context.
///
/// Order of the result:
/// 1. `traceId` from the bound span, if it is valid.
/// 2. For each name: the context value, then the first metadata value.
///    Inbound metadata is used when present, outbound otherwise.
///
/// A key may appear more than once; the engine keeps the last one, so metadata
/// wins over context values and both win over the span. Absence of any part
/// is not an error.
pub fn extract(ctx: Option<&Context>, names: &[&'static str]) -> Vec<Field> {
    let Some(ctx) = ctx else {
        return Vec::new();
    };

    let mut fields = Vec::new();

    if let Some(span) = ctx.span() {
        if span.is_valid() {
            fields.push(Field::string(TRACE_ID_KEY, span.trace_id()));
        }
    }

    let md = ctx.incoming_metadata().or_else(|| ctx.outgoing_metadata());

    for &name in names {
        if let Some(value) = ctx.value(name) {
            fields.push(Field::json(name, value.clone()));
        }
        if let Some(first) = md.and_then(|md| md.first(name)) {
            fields.push(Field::string(name, first));
        }
    }

    fields
}
