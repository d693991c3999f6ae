//! Call-stack capture with pooled scratch buffers.
//!
//! Walking the stack happens in two steps. Raw instruction pointers are first
//! collected into a pooled buffer; when the walk fills the buffer completely the
//! stack may have been truncated, so the buffer is dropped and the walk retried
//! with twice the capacity. The surviving pointers are then resolved to
//! function names and `file:line` locations, using a pooled string builder for
//! the locations.

use std::ffi::c_void;
use std::fmt::Write as _;

use super::pool::{Pool, DEFAULT_MAX_IDLE};

/// Initial capacity of the program-counter buffer.
pub const DEFAULT_CAPACITY: usize = 64;

/// Location reported for frames without file information.
pub const UNKNOWN_LOCATION: &str = "unknown:0";

/// One resolved frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackFrame {
    function: String,
    location: String,
}

impl StackFrame {
    pub fn new(function: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            function: function.into(),
            location: location.into(),
        }
    }

    /// Demangled function path, empty when the symbol could not be resolved.
    pub fn function(&self) -> &str {
        &self.function
    }

    /// `file:line` of the frame.
    pub fn location(&self) -> &str {
        &self.location
    }
}

/// Frames of one capture, innermost (closest to the log call) first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedStack {
    frames: Vec<StackFrame>,
}

impl CapturedStack {
    pub fn new(frames: Vec<StackFrame>) -> Self {
        Self { frames }
    }

    pub fn frames(&self) -> &[StackFrame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

/// Captures call stacks, reusing buffers across calls.
///
/// Safe to share between threads; the pools are the only mutable state.
pub struct StackCapturer {
    counters: Pool<Vec<usize>>,
    builders: Pool<String>,
}

impl StackCapturer {
    /// Create a capturer whose program-counter buffers start at `initial_capacity`.
    pub fn new(initial_capacity: usize) -> Self {
        let initial = initial_capacity.max(1);
        Self {
            counters: Pool::new(DEFAULT_MAX_IDLE, move || vec![0; initial]),
            builders: Pool::new(DEFAULT_MAX_IDLE, String::new),
        }
    }

    /// Capture the current stack.
    ///
    /// The first frame is the caller of `capture`, after discarding `skip`
    /// further frames. Never fails; frames that cannot be resolved are kept
    /// with an empty function name.
    #[inline(never)]
    pub fn capture(&self, skip: usize) -> CapturedStack {
        let anchor = Self::capture as usize;

        let mut pcs = self.counters.get();
        let (count, anchor_at) = loop {
            let (count, anchor_at) = walk(&mut pcs, anchor);
            if count < pcs.len() {
                break (count, anchor_at);
            }
            // Possibly truncated; the old buffer is dropped, the new one is pooled on exit
            let grown = pcs.len() * 2;
            *pcs = vec![0; grown];
        };

        // Without an anchor nothing is skipped rather than guessing at a depth
        let start = anchor_at.map_or(0, |at| at + 1 + skip).min(count);

        let mut builder = self.builders.get();
        builder.clear();

        let mut frames = Vec::with_capacity(count - start);
        for &ip in &pcs[start..count] {
            let mut resolved = false;
            backtrace::resolve(ip as *mut c_void, |symbol| {
                resolved = true;

                let function = symbol
                    .name()
                    .map(|name| format!("{name:#}"))
                    .unwrap_or_default();

                match symbol.filename() {
                    Some(file) => {
                        let line = symbol.lineno().unwrap_or(0);
                        let _ = write!(builder, "{}:{}", file.display(), line);
                    }
                    None => builder.push_str(UNKNOWN_LOCATION),
                }

                frames.push(StackFrame {
                    function,
                    location: builder.as_str().to_owned(),
                });
                builder.clear();
            });

            if !resolved {
                frames.push(StackFrame::new(String::new(), UNKNOWN_LOCATION));
            }
        }

        CapturedStack { frames }
    }
}

impl Default for StackCapturer {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// Record instruction pointers into `pcs` until the stack ends or the buffer is full.
///
/// Returns how many were recorded and the index of the frame running the
/// function at `anchor`, if it was seen.
fn walk(pcs: &mut [usize], anchor: usize) -> (usize, Option<usize>) {
    let mut count = 0;
    let mut anchor_at = None;

    backtrace::trace(|frame| {
        if count == pcs.len() {
            return false;
        }
        if anchor_at.is_none() && frame.symbol_address() as usize == anchor {
            anchor_at = Some(count);
        }
        pcs[count] = frame.ip() as usize;
        count += 1;
        true
    });

    (count, anchor_at)
}
