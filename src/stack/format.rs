//! Rendering of captured stacks as record fields.

use std::fmt;
use std::sync::Arc;

use super::capture::{CapturedStack, StackFrame};
use crate::field::{Field, FieldValue, ObjectEncoder, ObjectMarshaler};

/// Key under which stacktraces are attached to records.
pub const STACKTRACE_KEY: &str = "stacktrace";

/// Render a stack as a field value.
///
/// Structured stacks become an object keyed by frame index, each entry
/// holding `func` and `file`. Text stacks become a blob with one
/// `function\n\tfile:line` entry per frame.
pub fn format(stack: Arc<CapturedStack>, structured: bool) -> FieldValue {
    if structured {
        FieldValue::Object(stack)
    } else {
        FieldValue::Stacktrace(stack)
    }
}

/// A `stacktrace` field carrying the given stack.
pub fn stacktrace_field(stack: Arc<CapturedStack>, structured: bool) -> Field {
    Field::new(STACKTRACE_KEY, format(stack, structured))
}

impl fmt::Display for CapturedStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, frame) in self.frames().iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{}\n\t{}", frame.function(), frame.location())?;
        }
        Ok(())
    }
}

impl ObjectMarshaler for CapturedStack {
    fn marshal_log_object(&self, enc: &mut dyn ObjectEncoder) {
        for (i, frame) in self.frames().iter().enumerate() {
            enc.add_object(&i.to_string(), frame);
        }
    }
}

impl ObjectMarshaler for StackFrame {
    fn marshal_log_object(&self, enc: &mut dyn ObjectEncoder) {
        enc.add_string("func", self.function());
        enc.add_string("file", self.location());
    }
}
