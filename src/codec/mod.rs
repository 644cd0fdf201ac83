// Stateful codec engines driven by the streaming loop.
//
// An engine is an opaque state machine exposing one bounded step at a time:
// it is handed an input window, an output window and a flush instruction,
// and reports how much it consumed and produced plus a status code from its
// direction's code table. The driver never looks inside; it only watches
// `state()` for the terminal marker.
//
// - `status`: status codes and their translation into `CodecError`
// - `wrapper`: gzip/zlib/raw container selection and headerless trailers
// - `deflate`: flate2-backed encoder
// - `inflate`: flate2-backed decoder

pub mod deflate;
pub mod inflate;
pub mod status;
pub mod wrapper;

pub use deflate::DeflateEngine;
pub use inflate::InflateEngine;
pub use status::{CodecError, CodecErrorKind, Direction};
pub use wrapper::{WrapperFlags, WrapperFormat};

/// Flush instruction passed with each step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlushMode {
    /// Buffer freely; emit output only when blocks fill up.
    NoFlush,
    /// Emit all pending output, aligned to a byte boundary.
    SyncFlush,
    /// Like `SyncFlush`, and reset the dictionary.
    FullFlush,
}

/// Externally observable engine state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodecState {
    Running,
    /// All input consumed and all output flushed.
    End,
}

/// Outcome of one engine step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepReport {
    /// Status code from the engine's direction table (0 = ok).
    pub status: i32,
    /// Bytes taken from the front of the input window.
    pub consumed: usize,
    /// Bytes written to the front of the output window.
    pub produced: usize,
}

impl StepReport {
    pub fn ok(consumed: usize, produced: usize) -> Self {
        Self {
            status: status::COMP_OK,
            consumed,
            produced,
        }
    }

    pub fn failed(status: i32) -> Self {
        Self {
            status,
            consumed: 0,
            produced: 0,
        }
    }
}

/// A stateful compression or decompression engine.
///
/// Engines are configured at construction (their `init`). The session lends
/// them its scratch workspace on every step; they must not hold on to it.
pub trait CodecEngine {
    /// Code table used for this engine's statuses.
    fn direction(&self) -> Direction;

    /// Run one bounded step.
    ///
    /// `end_of_stream` is set once the caller has offered its last input
    /// chunk; it stays set for every later step of the session.
    fn step(
        &mut self,
        scratch: &mut [u8],
        input: &[u8],
        output: &mut [u8],
        flush: FlushMode,
        end_of_stream: bool,
    ) -> StepReport;

    fn state(&self) -> CodecState;
}

impl<E: CodecEngine + ?Sized> CodecEngine for &mut E {
    fn direction(&self) -> Direction {
        (**self).direction()
    }

    fn step(
        &mut self,
        scratch: &mut [u8],
        input: &[u8],
        output: &mut [u8],
        flush: FlushMode,
        end_of_stream: bool,
    ) -> StepReport {
        (**self).step(scratch, input, output, flush, end_of_stream)
    }

    fn state(&self) -> CodecState {
        (**self).state()
    }
}
