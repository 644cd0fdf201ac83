// Encode-direction engine backed by flate2.
//
// flate2 owns the deflate state and, for gzip/zlib with headers, the whole
// container. For headerless formats this engine appends the trailer itself
// once flate2 reports the end of the deflate stream, spreading it over as
// many steps as the output windows require.

use flate2::{Compress, Compression, FlushCompress, Status};
use log::{debug, trace};

use super::status::{self, Direction};
use super::wrapper::{self, TrailerCheck, WrapperFlags, WrapperFormat};
use super::{CodecEngine, CodecState, FlushMode, StepReport};
use crate::level;

/// flate2 level used for each supported level.
const FLATE2_LEVELS: [u32; 4] = [1, 4, 6, 9];

/// Parameters fixed at engine initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeflateParams {
    pub level: u32,
    pub format: WrapperFormat,
    pub hist_bits: u16,
}

impl Default for DeflateParams {
    fn default() -> Self {
        Self {
            level: level::DEFAULT_LEVEL,
            format: WrapperFormat::Gzip,
            hist_bits: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Body,
    Trailer,
    End,
}

/// Streaming deflate encoder.
pub struct DeflateEngine {
    stream: Compress,
    level: u32,
    check: TrailerCheck,
    trailer: Vec<u8>,
    trailer_pos: usize,
    phase: Phase,
    /// Status reported on every step when initialization was rejected.
    setup_error: Option<i32>,
}

impl DeflateEngine {
    /// Create a fresh encoder. Invalid parameters are reported by the first
    /// step rather than here.
    pub fn init(params: DeflateParams) -> Self {
        let mut setup_error = None;

        let flate_level = match FLATE2_LEVELS.get(params.level as usize) {
            Some(&l) => l,
            None => {
                setup_error = Some(status::INVALID_LEVEL);
                FLATE2_LEVELS[level::DEFAULT_LEVEL as usize]
            }
        };

        let bits = match wrapper::window_bits(params.hist_bits) {
            Ok(bits) => bits,
            Err(_) => {
                if setup_error.is_none() {
                    setup_error = Some(status::INVALID_PARAM);
                }
                wrapper::DEFAULT_HIST_BITS
            }
        };

        let flags = params.format.flags();
        let compression = Compression::new(flate_level);
        let stream = if flags.contains(WrapperFlags::GZIP_HEADER) {
            Compress::new_gzip(compression, bits)
        } else {
            Compress::new_with_window_bits(
                compression,
                flags.contains(WrapperFlags::ZLIB_HEADER),
                bits,
            )
        };

        debug!(
            "deflate init: level {} (flate2 {flate_level}), format {}, window bits {bits}",
            params.level,
            params.format.name()
        );

        Self {
            stream,
            level: params.level,
            check: TrailerCheck::for_flags(flags),
            trailer: Vec::new(),
            trailer_pos: 0,
            phase: Phase::Body,
            setup_error,
        }
    }

    /// Total uncompressed bytes consumed so far.
    pub fn total_in(&self) -> u64 {
        self.stream.total_in()
    }

    /// Total compressed bytes produced so far, trailer included.
    pub fn total_out(&self) -> u64 {
        self.stream.total_out() + self.trailer_pos as u64
    }

    fn compress_body(
        &mut self,
        input: &[u8],
        output: &mut [u8],
        flush: FlushMode,
        end_of_stream: bool,
    ) -> StepReport {
        let mode = if end_of_stream {
            FlushCompress::Finish
        } else {
            match flush {
                FlushMode::NoFlush => FlushCompress::None,
                FlushMode::SyncFlush => FlushCompress::Sync,
                FlushMode::FullFlush => FlushCompress::Full,
            }
        };

        let before_in = self.stream.total_in();
        let before_out = self.stream.total_out();
        let result = self.stream.compress(input, output, mode);
        let consumed = (self.stream.total_in() - before_in) as usize;
        let mut produced = (self.stream.total_out() - before_out) as usize;
        self.check.update(&input[..consumed]);

        match result {
            Ok(Status::StreamEnd) => {
                self.trailer = self.check.trailer();
                self.phase = Phase::Trailer;
                produced += self.drain_trailer(&mut output[produced..]);
            }
            Ok(Status::Ok | Status::BufError) => {}
            Err(e) => {
                debug!("deflate stream error: {e}");
                return StepReport::failed(status::INVALID_STATE);
            }
        }

        StepReport::ok(consumed, produced)
    }

    /// Copy as much of the pending trailer as fits into `output`.
    fn drain_trailer(&mut self, output: &mut [u8]) -> usize {
        let pending = &self.trailer[self.trailer_pos..];
        let n = pending.len().min(output.len());
        output[..n].copy_from_slice(&pending[..n]);
        self.trailer_pos += n;
        if self.trailer_pos == self.trailer.len() {
            self.phase = Phase::End;
        }
        n
    }
}

impl CodecEngine for DeflateEngine {
    fn direction(&self) -> Direction {
        Direction::Encode
    }

    fn step(
        &mut self,
        scratch: &mut [u8],
        input: &[u8],
        output: &mut [u8],
        flush: FlushMode,
        end_of_stream: bool,
    ) -> StepReport {
        if let Some(code) = self.setup_error {
            return StepReport::failed(code);
        }
        let required = level::min_scratch_size(self.level).unwrap_or(0) as usize;
        if scratch.len() < required {
            debug!(
                "deflate: level {} needs {required} bytes of scratch, got {}",
                self.level,
                scratch.len()
            );
            return StepReport::failed(status::INVALID_LEVEL_BUF);
        }

        let report = match self.phase {
            Phase::Body => self.compress_body(input, output, flush, end_of_stream),
            Phase::Trailer => StepReport::ok(0, self.drain_trailer(output)),
            Phase::End if input.is_empty() => StepReport::ok(0, 0),
            Phase::End => StepReport::failed(status::INVALID_OPERATION),
        };

        trace!(
            "deflate step: in {}/{} out {}/{} status {} eos {end_of_stream}",
            report.consumed,
            input.len(),
            report.produced,
            output.len(),
            report.status
        );
        report
    }

    fn state(&self) -> CodecState {
        if self.phase == Phase::End {
            CodecState::End
        } else {
            CodecState::Running
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
