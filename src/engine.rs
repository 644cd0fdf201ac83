// One-shot compression API.
//
// Ties the pieces together for whole-buffer use:
//   - options are validated (profile, wrapper, history bits, buffer sizes)
//     before anything is allocated
//   - a scratch workspace is sized from the compression profile
//   - the flate2-backed engine is driven over the input by the stream driver

use log::{debug, warn};

use crate::codec::deflate::{DeflateEngine, DeflateParams};
use crate::codec::inflate::{InflateEngine, InflateParams};
use crate::codec::wrapper::{self, WrapperFormat};
use crate::error::{ConfigError, StreamError};
use crate::level::{self, CompressionProfile, MemLevel};
use crate::stream::driver::{self, CodecSession, DriveOptions, Drained};
use crate::stream::output::UNBOUNDED;
use crate::stream::scratch::ScratchWorkspace;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

pub use crate::stream::output::DEFAULT_BUFFER_SIZE;

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Configuration for [`compress`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressOptions {
    /// Compression level (0-3).
    pub level: u32,
    /// Scratch memory profile.
    pub mem_level: MemLevel,
    /// Container written around the deflate stream.
    pub format: WrapperFormat,
    /// Window size as a power of two; 0 picks the default (15).
    pub hist_bits: u16,
    pub drive: DriveOptions,
}

impl Default for CompressOptions {
    fn default() -> Self {
        Self {
            level: level::DEFAULT_LEVEL,
            mem_level: MemLevel::Default,
            format: WrapperFormat::Gzip,
            hist_bits: 0,
            drive: DriveOptions::default(),
        }
    }
}

impl CompressOptions {
    /// Check every setting; returns the resolved compression profile.
    pub fn validate(&self) -> Result<CompressionProfile, ConfigError> {
        let profile = CompressionProfile::new(self.level, self.mem_level)?;
        wrapper::window_bits(self.hist_bits)?;
        self.drive.validate()?;
        Ok(profile)
    }
}

/// Configuration for [`decompress`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DecompressOptions {
    /// Container expected around the deflate stream.
    pub format: WrapperFormat,
    /// Window size as a power of two; 0 picks the default (15).
    pub hist_bits: u16,
    pub drive: DriveOptions,
}

impl DecompressOptions {
    pub fn validate(&self) -> Result<(), ConfigError> {
        wrapper::window_bits(self.hist_bits)?;
        self.drive.validate()
    }
}

// ---------------------------------------------------------------------------
// High-level compress / decompress
// ---------------------------------------------------------------------------

/// Compress `data` into the configured container.
///
/// Empty input still yields a complete container (headers and trailer).
pub fn compress(data: &[u8], opts: &CompressOptions) -> Result<Vec<u8>, StreamError> {
    let profile = opts.validate()?;
    let engine = DeflateEngine::init(DeflateParams {
        level: opts.level,
        format: opts.format,
        hist_bits: opts.hist_bits,
    });
    let drained = CodecSession::with_profile(engine, profile)?.drive(data, &opts.drive)?;
    Ok(drained.output)
}

/// Decompress `data`, ignoring anything after the end of the stream.
///
/// Concatenated gzip members are all decoded; see [`decompress_with_unused`].
pub fn decompress(data: &[u8], opts: &DecompressOptions) -> Result<Vec<u8>, StreamError> {
    let drained = decompress_with_unused(data, opts)?;
    if drained.unused_input > 0 {
        warn!(
            "ignoring {} bytes of trailing data after the compressed stream",
            drained.unused_input
        );
    }
    Ok(drained.output)
}

/// Decompress `data` and report how many input bytes followed the stream.
///
/// Gzip input may hold several concatenated members; each one is decoded in
/// turn and the outputs are joined. Decoding stops at the first leftover
/// bytes that do not form a complete member, and those are reported as
/// `unused_input`. Errors in the first member are always returned.
pub fn decompress_with_unused(
    data: &[u8],
    opts: &DecompressOptions,
) -> Result<Drained, StreamError> {
    opts.validate()?;
    let mut drained = decompress_member(data, opts, &opts.drive)?;
    if opts.format != WrapperFormat::Gzip {
        return Ok(drained);
    }

    let max_output = opts.drive.max_output;
    while drained.unused_input > 0 {
        let rest = &data[data.len() - drained.unused_input..];
        let room = max_output - drained.output.len();
        let drive = DriveOptions {
            // A session needs a positive ceiling; overshoot is checked below.
            max_output: if max_output == UNBOUNDED {
                UNBOUNDED
            } else {
                room.max(1)
            },
            ..opts.drive
        };

        let next = match decompress_member(rest, opts, &drive) {
            Ok(next) => next,
            Err(StreamError::CapacityExceeded { .. }) => {
                return Err(StreamError::CapacityExceeded { max: max_output });
            }
            Err(e) if e.is_resource_limit() => return Err(e),
            Err(e) => {
                debug!("{} trailing bytes are not a gzip member: {e}", rest.len());
                break;
            }
        };
        if next.output.len() > room {
            return Err(StreamError::CapacityExceeded { max: max_output });
        }
        if next.unused_input >= rest.len() {
            break;
        }

        debug!(
            "gzip member: {} bytes in, {} bytes out",
            rest.len() - next.unused_input,
            next.output.len()
        );
        drained
            .output
            .try_reserve_exact(next.output.len())
            .map_err(|_| StreamError::OutOfMemory {
                requested: drained.output.len() + next.output.len(),
            })?;
        drained.output.extend_from_slice(&next.output);
        drained.unused_input = next.unused_input;
        drained.steps += next.steps;
    }
    Ok(drained)
}

fn decompress_member(
    data: &[u8],
    opts: &DecompressOptions,
    drive: &DriveOptions,
) -> Result<Drained, StreamError> {
    let engine = InflateEngine::init(InflateParams {
        format: opts.format,
        hist_bits: opts.hist_bits,
    });
    driver::run(engine, ScratchWorkspace::empty(), data, drive)
}

/// Compress independent buffers concurrently, one session per buffer.
///
/// Results keep the order of `inputs`.
#[cfg(feature = "parallel")]
pub fn compress_many<T>(
    inputs: &[T],
    opts: &CompressOptions,
) -> Vec<Result<Vec<u8>, StreamError>>
where
    T: AsRef<[u8]> + Sync,
{
    inputs
        .par_iter()
        .map(|data| compress(data.as_ref(), opts))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::status;
    use crate::error::ErrorKind;
    use rand::rngs::StdRng;
    use rand::{RngCore, SeedableRng};
    use std::io::Read;

    fn roundtrip(data: &[u8], copts: &CompressOptions) {
        let packed = compress(data, copts).expect("compress failed");
        let dopts = DecompressOptions {
            format: copts.format,
            hist_bits: copts.hist_bits,
            drive: copts.drive,
        };
        let unpacked = decompress(&packed, &dopts).expect("decompress failed");
        assert_eq!(
            unpacked,
            data,
            "roundtrip mismatch (format={}, level={}, packed={})",
            copts.format.name(),
            copts.level,
            packed.len()
        );
    }

    fn text(len: usize) -> Vec<u8> {
        b"It was the best of times, it was the worst of times. "
            .iter()
            .copied()
            .cycle()
            .take(len)
            .collect()
    }

    #[test]
    fn roundtrip_defaults() {
        roundtrip(&text(100_000), &CompressOptions::default());
    }

    #[test]
    fn roundtrip_every_format_and_level() {
        let data = text(30_000);
        for format in WrapperFormat::ALL {
            for level in level::MIN_LEVEL..=level::MAX_LEVEL {
                roundtrip(
                    &data,
                    &CompressOptions {
                        level,
                        format,
                        ..Default::default()
                    },
                );
            }
        }
    }

    #[test]
    fn roundtrip_every_mem_level() {
        let data = text(10_000);
        for mem_level in MemLevel::ALL {
            roundtrip(
                &data,
                &CompressOptions {
                    mem_level,
                    ..Default::default()
                },
            );
        }
    }

    #[test]
    fn empty_input_is_a_complete_gzip_member() {
        let packed = compress(b"", &CompressOptions::default()).unwrap();
        assert!(!packed.is_empty());
        assert_eq!(&packed[..2], &[0x1f, 0x8b]);

        let mut decoded = Vec::new();
        flate2::read::GzDecoder::new(&packed[..])
            .read_to_end(&mut decoded)
            .unwrap();
        assert!(decoded.is_empty());
        assert!(
            decompress(&packed, &DecompressOptions::default())
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn small_history_window() {
        roundtrip(
            &text(50_000),
            &CompressOptions {
                format: WrapperFormat::Zlib,
                hist_bits: 9,
                ..Default::default()
            },
        );
    }

    #[test]
    fn config_rejected_before_allocation() {
        let bad_level = compress(
            b"x",
            &CompressOptions {
                level: 4,
                ..Default::default()
            },
        )
        .unwrap_err();
        assert!(matches!(
            bad_level,
            StreamError::Config(ConfigError::InvalidProfile { level: 4, .. })
        ));

        let bad_bits = decompress(
            b"x",
            &DecompressOptions {
                hist_bits: 16,
                ..Default::default()
            },
        )
        .unwrap_err();
        assert_eq!(bad_bits.kind(), ErrorKind::Config);
    }

    #[test]
    fn corrupt_input_is_a_codec_error() {
        let mut packed = compress(&text(5_000), &CompressOptions::default()).unwrap();
        let n = packed.len();
        packed[n - 6] ^= 0x55;
        let err = decompress(&packed, &DecompressOptions::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Codec);
    }

    #[test]
    fn truncated_input_reports_end_of_input() {
        let packed = compress(&text(5_000), &CompressOptions::default()).unwrap();
        let err = decompress(&packed[..packed.len() / 2], &DecompressOptions::default())
            .unwrap_err();
        assert_eq!(err.code(), Some(status::END_INPUT));
    }

    #[test]
    fn trailing_data_is_counted() {
        let mut packed = compress(b"payload", &CompressOptions::default()).unwrap();
        packed.extend_from_slice(b"junk");
        let drained = decompress_with_unused(&packed, &DecompressOptions::default()).unwrap();
        assert_eq!(drained.output, b"payload");
        assert_eq!(drained.unused_input, 4);
    }

    #[test]
    fn concatenated_gzip_members_are_joined() {
        let mut packed = compress(b"first member ", &CompressOptions::default()).unwrap();
        packed.extend(compress(b"", &CompressOptions::default()).unwrap());
        packed.extend(compress(b"second member", &CompressOptions::default()).unwrap());

        let drained = decompress_with_unused(&packed, &DecompressOptions::default()).unwrap();
        assert_eq!(drained.output, b"first member second member");
        assert_eq!(drained.unused_input, 0);

        packed.extend_from_slice(b"\0\0junk");
        let drained = decompress_with_unused(&packed, &DecompressOptions::default()).unwrap();
        assert_eq!(drained.output, b"first member second member");
        assert_eq!(drained.unused_input, 6);
    }

    #[test]
    fn only_gzip_continues_into_following_members() {
        let zlib = CompressOptions {
            format: WrapperFormat::Zlib,
            ..Default::default()
        };
        let mut packed = compress(b"one", &zlib).unwrap();
        let second = compress(b"two", &zlib).unwrap();
        packed.extend_from_slice(&second);

        let drained = decompress_with_unused(
            &packed,
            &DecompressOptions {
                format: WrapperFormat::Zlib,
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(drained.output, b"one");
        assert_eq!(drained.unused_input, second.len());
    }

    #[test]
    fn output_ceiling_covers_all_members() {
        let mut packed = compress(&text(3_000), &CompressOptions::default()).unwrap();
        packed.extend(compress(&text(3_000), &CompressOptions::default()).unwrap());
        let bounded = |max_output| DecompressOptions {
            drive: DriveOptions {
                max_output,
                ..Default::default()
            },
            ..Default::default()
        };

        for max in [3_000, 4_000, 5_999] {
            let err = decompress(&packed, &bounded(max)).unwrap_err();
            assert!(
                matches!(err, StreamError::CapacityExceeded { max: m } if m == max),
                "max {max}: {err}"
            );
        }
        assert_eq!(decompress(&packed, &bounded(6_001)).unwrap().len(), 6_000);
    }

    #[test]
    fn bounded_output_reports_capacity() {
        let mut data = vec![0u8; 200_000];
        StdRng::seed_from_u64(7).fill_bytes(&mut data);
        let opts = CompressOptions {
            drive: DriveOptions {
                initial_capacity: 1024,
                max_output: 4096,
                ..Default::default()
            },
            ..Default::default()
        };
        let err = compress(&data, &opts).unwrap_err();
        assert!(matches!(err, StreamError::CapacityExceeded { max: 4096 }));
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn compress_many_keeps_order() {
        let inputs: Vec<Vec<u8>> = (1..=8).map(|i| text(i * 1000)).collect();
        let results = compress_many(&inputs, &CompressOptions::default());
        assert_eq!(results.len(), inputs.len());
        for (input, packed) in inputs.iter().zip(results) {
            let unpacked = decompress(&packed.unwrap(), &DecompressOptions::default()).unwrap();
            assert_eq!(&unpacked, input);
        }
    }
}
