// Decode-direction engine backed by flate2.
//
// flate2 failures carry a zlib-style message rather than a code, so they are
// classified into the decode status table by message content. Headerless
// trailers are collected from the input that follows the deflate stream and
// checked against a running checksum of the produced bytes.

use flate2::{Decompress, DecompressError, FlushDecompress, Status};
use log::{debug, trace};

use super::status::{self, Direction};
use super::wrapper::{self, TrailerCheck, WrapperFlags, WrapperFormat};
use super::{CodecEngine, CodecState, FlushMode, StepReport};

/// Parameters fixed at engine initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InflateParams {
    pub format: WrapperFormat,
    pub hist_bits: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Body,
    Trailer,
    End,
}

/// Streaming inflate decoder.
pub struct InflateEngine {
    stream: Decompress,
    check: TrailerCheck,
    trailer: Vec<u8>,
    phase: Phase,
    setup_error: Option<i32>,
}

impl InflateEngine {
    pub fn init(params: InflateParams) -> Self {
        let (bits, setup_error) = match wrapper::window_bits(params.hist_bits) {
            Ok(bits) => (bits, None),
            Err(_) => (wrapper::DEFAULT_HIST_BITS, Some(status::INVALID_WRAPPER)),
        };

        let flags = params.format.flags();
        let stream = if flags.contains(WrapperFlags::GZIP_HEADER) {
            Decompress::new_gzip(bits)
        } else {
            Decompress::new_with_window_bits(flags.contains(WrapperFlags::ZLIB_HEADER), bits)
        };

        debug!(
            "inflate init: format {}, window bits {bits}",
            params.format.name()
        );

        Self {
            stream,
            check: TrailerCheck::for_flags(flags),
            trailer: Vec::new(),
            phase: Phase::Body,
            setup_error,
        }
    }

    /// Total compressed bytes consumed so far, trailer excluded.
    pub fn total_in(&self) -> u64 {
        self.stream.total_in()
    }

    /// Total decompressed bytes produced so far.
    pub fn total_out(&self) -> u64 {
        self.stream.total_out()
    }

    fn inflate_body(&mut self, input: &[u8], output: &mut [u8]) -> StepReport {
        let before_in = self.stream.total_in();
        let before_out = self.stream.total_out();
        let result = self.stream.decompress(input, output, FlushDecompress::None);
        let mut consumed = (self.stream.total_in() - before_in) as usize;
        let produced = (self.stream.total_out() - before_out) as usize;
        self.check.update(&output[..produced]);

        match result {
            Ok(Status::StreamEnd) => {
                if self.check.is_none() {
                    self.phase = Phase::End;
                } else {
                    self.phase = Phase::Trailer;
                    let (taken, code) = self.collect_trailer(&input[consumed..]);
                    consumed += taken;
                    if code != status::DECOMP_OK {
                        return StepReport {
                            status: code,
                            consumed,
                            produced,
                        };
                    }
                }
            }
            Ok(Status::Ok | Status::BufError) => {}
            Err(e) => {
                let code = classify_error(&e);
                debug!("inflate error: {e} (status {code})");
                return StepReport {
                    status: code,
                    consumed,
                    produced,
                };
            }
        }

        StepReport::ok(consumed, produced)
    }

    /// Take trailer bytes from `input`; verify once the trailer is complete.
    fn collect_trailer(&mut self, input: &[u8]) -> (usize, i32) {
        let want = self.check.trailer_len() - self.trailer.len();
        let taken = want.min(input.len());
        self.trailer.extend_from_slice(&input[..taken]);

        if self.trailer.len() == self.check.trailer_len() {
            if self.trailer != self.check.trailer() {
                return (taken, status::INCORRECT_CHECKSUM);
            }
            self.phase = Phase::End;
        }
        (taken, status::DECOMP_OK)
    }
}

/// Map a flate2 decompression failure onto the decode status table.
fn classify_error(err: &DecompressError) -> i32 {
    if err.needs_dictionary().is_some() {
        return status::NEED_DICT;
    }
    classify_message(err.message())
}

fn classify_message(message: Option<&str>) -> i32 {
    let msg = message.unwrap_or_default().to_ascii_lowercase();
    if msg.contains("header") || msg.contains("window size") {
        status::INVALID_WRAPPER
    } else if msg.contains("compression method") {
        status::UNSUPPORTED_METHOD
    } else if msg.contains("data check") || msg.contains("length check") {
        status::INCORRECT_CHECKSUM
    } else if msg.contains("too far back") {
        status::INVALID_LOOKBACK
    } else if msg.contains("literal/length code") || msg.contains("distance code") {
        status::INVALID_SYMBOL
    } else {
        status::INVALID_BLOCK
    }
}

impl CodecEngine for InflateEngine {
    fn direction(&self) -> Direction {
        Direction::Decode
    }

    fn step(
        &mut self,
        _scratch: &mut [u8],
        input: &[u8],
        output: &mut [u8],
        _flush: FlushMode,
        end_of_stream: bool,
    ) -> StepReport {
        if let Some(code) = self.setup_error {
            return StepReport::failed(code);
        }

        let report = match self.phase {
            Phase::Body => self.inflate_body(input, output),
            Phase::Trailer => {
                let (taken, code) = self.collect_trailer(input);
                StepReport {
                    status: code,
                    consumed: taken,
                    produced: 0,
                }
            }
            // Anything after the end is trailing data; the caller decides.
            Phase::End => StepReport::ok(0, 0),
        };

        trace!(
            "inflate step: in {}/{} out {}/{} status {} eos {end_of_stream}",
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
