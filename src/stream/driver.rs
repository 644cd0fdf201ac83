// Streaming drive loop.
//
// The outer loop offers the caller's input one bounded chunk at a time; the
// inner loop keeps stepping the codec over that chunk for as long as each
// step fills the whole output window it was given. The session owns the
// scratch workspace and the output buffer, so leaving `drive` by any route
// releases both.

use log::{debug, trace};

use super::chunk::{CHUNK_LIMIT, InputCursor};
use super::output::{DEFAULT_BUFFER_SIZE, OutputBuffer, UNBOUNDED};
use super::scratch::ScratchWorkspace;
use crate::codec::status::{self, Direction};
use crate::codec::{CodecEngine, CodecState, FlushMode};
use crate::error::{ConfigError, StreamError};
use crate::level::CompressionProfile;

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Buffer policy for one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriveOptions {
    /// Largest input chunk and output window offered per step.
    pub chunk_limit: usize,
    /// Output capacity allocated on the first step.
    pub initial_capacity: usize,
    /// Hard ceiling for the output buffer.
    pub max_output: usize,
}

impl Default for DriveOptions {
    fn default() -> Self {
        Self {
            chunk_limit: CHUNK_LIMIT,
            initial_capacity: DEFAULT_BUFFER_SIZE,
            max_output: UNBOUNDED,
        }
    }
}

impl DriveOptions {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_limit == 0 {
            return Err(ConfigError::ZeroSize {
                name: "chunk limit",
            });
        }
        if self.initial_capacity == 0 {
            return Err(ConfigError::ZeroSize {
                name: "initial capacity",
            });
        }
        if self.max_output == 0 {
            return Err(ConfigError::ZeroSize {
                name: "maximum output",
            });
        }
        Ok(())
    }

    fn is_bounded(&self) -> bool {
        self.max_output < UNBOUNDED
    }
}

/// Result of a completed session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Drained {
    /// Everything the codec produced, trimmed to length.
    pub output: Vec<u8>,
    /// Input bytes left over after the codec reached its end state.
    pub unused_input: usize,
    /// Number of codec steps taken.
    pub steps: u64,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// One in-flight run of a codec engine over a caller buffer.
pub struct CodecSession<E> {
    engine: E,
    scratch: ScratchWorkspace,
    profile: Option<CompressionProfile>,
}

impl<E: CodecEngine> CodecSession<E> {
    pub fn new(engine: E, scratch: ScratchWorkspace) -> Self {
        Self {
            engine,
            scratch,
            profile: None,
        }
    }

    /// Allocate the scratch workspace `profile` calls for and bind `engine`
    /// to it.
    pub fn with_profile(engine: E, profile: CompressionProfile) -> Result<Self, StreamError> {
        let scratch = ScratchWorkspace::allocate(profile.scratch_size())?;
        Ok(Self {
            engine,
            scratch,
            profile: Some(profile),
        })
    }

    pub fn profile(&self) -> Option<&CompressionProfile> {
        self.profile.as_ref()
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Feed all of `input` through the engine until it reaches its end
    /// state.
    ///
    /// Any error is terminal: the partial output is dropped along with the
    /// scratch workspace.
    pub fn drive(mut self, input: &[u8], options: &DriveOptions) -> Result<Drained, StreamError> {
        options.validate()?;

        let direction = self.engine.direction();
        debug!(
            "session start: {direction:?}, {} input bytes, scratch {} bytes, chunk limit {}",
            input.len(),
            self.scratch.len(),
            options.chunk_limit
        );

        let mut cursor = InputCursor::new(input);
        let mut output = OutputBuffer::new(options.initial_capacity, options.max_output);
        let mut steps = 0u64;
        let mut unused_input = 0;

        while self.engine.state() != CodecState::End {
            let mut pending = cursor.next_chunk(options.chunk_limit);
            let end_of_stream = cursor.is_exhausted();
            let flush = if end_of_stream {
                FlushMode::FullFlush
            } else {
                FlushMode::NoFlush
            };

            loop {
                let window = output
                    .arrange(options.chunk_limit)
                    .map_err(|e| growth_failure(e, options))?;

                let report = self.engine.step(
                    self.scratch.as_mut_slice(),
                    pending,
                    output.window(window.free),
                    flush,
                    end_of_stream,
                );
                steps += 1;
                trace!(
                    "step {steps}: consumed {} produced {} of {} status {}",
                    report.consumed, report.produced, window.free, report.status
                );

                if report.consumed > pending.len() || report.produced > window.free {
                    return Err(StreamError::Protocol(format!(
                        "step reported {} consumed / {} produced for windows of {} / {}",
                        report.consumed,
                        report.produced,
                        pending.len(),
                        window.free
                    )));
                }
                output.commit(report.produced);
                pending = &pending[report.consumed..];

                status::check(direction, report.status)?;

                if self.engine.state() == CodecState::End {
                    break;
                }
                if end_of_stream && report.consumed == 0 && report.produced == 0 {
                    return Err(stalled(direction));
                }
                if report.produced < window.free {
                    break;
                }
            }

            if self.engine.state() == CodecState::End {
                unused_input = pending.len() + cursor.remaining();
            } else if !pending.is_empty() {
                debug_assert!(
                    pending.is_empty(),
                    "codec left {} offered bytes unconsumed",
                    pending.len()
                );
                return Err(StreamError::Protocol(format!(
                    "codec left {} offered bytes unconsumed",
                    pending.len()
                )));
            }
        }

        debug!(
            "session end: {} bytes out in {steps} steps, {unused_input} input bytes unused",
            output.filled()
        );
        Ok(Drained {
            output: output.into_vec(),
            unused_input,
            steps,
        })
    }
}

/// Drive `engine` over `input` with an already allocated scratch workspace.
pub fn run<E: CodecEngine>(
    engine: E,
    scratch: ScratchWorkspace,
    input: &[u8],
    options: &DriveOptions,
) -> Result<Drained, StreamError> {
    CodecSession::new(engine, scratch).drive(input, options)
}

/// Without a configured ceiling, running out of room means the allocator
/// cannot give more.
fn growth_failure(err: StreamError, options: &DriveOptions) -> StreamError {
    match err {
        StreamError::CapacityExceeded { max } if !options.is_bounded() => {
            StreamError::OutOfMemory { requested: max }
        }
        other => other,
    }
}

fn stalled(direction: Direction) -> StreamError {
    match direction {
        Direction::Decode => match status::translate(direction, status::END_INPUT) {
            Some(e) => e.into(),
            None => StreamError::Protocol("input ended before the stream did".into()),
        },
        Direction::Encode => {
            StreamError::Protocol("codec made no progress after end of stream".into())
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
