//! Stack capture and formatting.
//!
//! # Data Flow
//! ```text
//! Logger (level >= stack threshold)
//!     → stack_skip()          picks text or structured output
//!     → StackCapturer         walks and resolves frames (pooled buffers)
//!     → format()              wraps the stack as a FieldValue
//!     → encoder               renders it at write time
//! ```

mod capture;
mod format;
pub mod pool;

use std::sync::{Arc, LazyLock};

pub use capture::{CapturedStack, StackCapturer, StackFrame, DEFAULT_CAPACITY, UNKNOWN_LOCATION};
pub use format::{format, stacktrace_field, STACKTRACE_KEY};

use crate::field::Field;

static CAPTURER: LazyLock<StackCapturer> = LazyLock::new(StackCapturer::default);

/// Capture the stack of the caller using the shared capturer.
///
/// Frame locations come from the binary's line tables. Without debug info
/// (`debug = 0`) every location is `unknown:0`; `debug = "line-tables-only"`
/// is enough.
///
/// `skip` frames above the caller are discarded.
#[inline(never)]
pub fn capture(skip: usize) -> CapturedStack {
    CAPTURER.capture(skip + 1)
}

/// A `stacktrace` field for the caller's stack, skipping `skip` frames above it.
#[inline(never)]
pub fn stack_skip(skip: usize, structured: bool) -> Field {
    let stack = CAPTURER.capture(skip + 1);
    stacktrace_field(Arc::new(stack), structured)
}

/// A structured `stacktrace` field for the caller's stack.
#[inline(never)]
pub fn json_stacktrace(skip: usize) -> Field {
    stack_skip(skip + 1, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::MapEncoder;

    use std::hint::black_box;

    #[inline(never)]
    fn call_site() -> (CapturedStack, u32) {
        let line = line!() + 1;
        let stack = capture(0);
        black_box((stack, line))
    }

    #[inline(never)]
    fn json_call_site() -> (Field, u32) {
        let line = line!() + 1;
        let field = json_stacktrace(0);
        black_box((field, line))
    }

    #[test]
    fn test_capture_starts_at_caller() {
        let (stack, line) = call_site();

        let top = &stack.frames()[0];
        assert!(top.function().ends_with("::call_site"), "{}", top.function());
        assert!(top.location().ends_with(&format!("mod.rs:{line}")), "{}", top.location());
    }

    #[test]
    fn test_json_stacktrace_starts_at_caller() {
        let (field, line) = json_call_site();
        assert_eq!(field.key(), STACKTRACE_KEY);

        let mut enc = MapEncoder::new();
        field.encode(&mut enc);
        let map = enc.into_map();
        let func = map[STACKTRACE_KEY]["0"]["func"].as_str().unwrap();
        let file = map[STACKTRACE_KEY]["0"]["file"].as_str().unwrap();
        assert!(func.ends_with("::json_call_site"), "{func}");
        assert!(file.ends_with(&format!("mod.rs:{line}")), "{file}");
    }
}
