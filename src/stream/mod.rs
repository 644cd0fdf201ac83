// Buffer management around a codec engine.
//
// - `chunk`: bounds caller input to the engine's per-step size field
// - `output`: growable output buffer
// - `scratch`: engine workspace released on drop
// - `driver`: the session and its drive loop

pub mod chunk;
pub mod driver;
pub mod output;
pub mod scratch;

pub use chunk::{CHUNK_LIMIT, InputCursor, take_chunk};
pub use driver::{CodecSession, DriveOptions, Drained, run};
pub use output::{DEFAULT_BUFFER_SIZE, OutputBuffer, UNBOUNDED};
pub use scratch::ScratchWorkspace;
