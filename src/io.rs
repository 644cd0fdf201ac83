// File-level I/O helpers for compression and decompression.
//
// Provides `compress_file()` / `decompress_file()` and their reader/writer
// counterparts. None of them stream in bounded memory: the engine works on
// whole buffers, so the input is read into memory, run through one session,
// and the result is written out with buffered I/O. Optionally computes
// SHA-256 checksums of the uncompressed side (feature-gated behind `file-io`).

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

#[cfg(feature = "file-io")]
use sha2::Digest;
use thiserror::Error;

use crate::engine::{self, CompressOptions, DecompressOptions};
use crate::error::StreamError;

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Statistics returned by `compress_file()`.
#[derive(Debug, Clone)]
pub struct CompressStats {
    /// Uncompressed input size in bytes.
    pub input_size: u64,
    /// Compressed output size in bytes.
    pub output_size: u64,
    /// SHA-256 of the uncompressed input (if `file-io` feature is enabled).
    pub input_sha256: Option<[u8; 32]>,
}

/// Statistics returned by `decompress_file()`.
#[derive(Debug, Clone)]
pub struct DecompressStats {
    /// Compressed input size in bytes.
    pub input_size: u64,
    /// Decompressed output size in bytes.
    pub output_size: u64,
    /// Bytes after the end of the compressed stream that were ignored.
    pub trailing_bytes: u64,
    /// SHA-256 of the decompressed output (if `file-io` feature is enabled).
    pub output_sha256: Option<[u8; 32]>,
}

impl CompressStats {
    /// Compressed size as a fraction of the input size.
    pub fn ratio(&self) -> f64 {
        if self.input_size == 0 {
            0.0
        } else {
            self.output_size as f64 / self.input_size as f64
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Error type for file I/O operations.
#[derive(Debug, Error)]
pub enum IoError {
    /// I/O error (file open, read, write).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// The compression session failed.
    #[error("stream error: {0}")]
    Stream(#[from] StreamError),
}

const BUF_SIZE: usize = 64 * 1024; // 64 KiB

#[cfg(feature = "file-io")]
fn sha256(data: &[u8]) -> Option<[u8; 32]> {
    Some(sha2::Sha256::digest(data).into())
}

#[cfg(not(feature = "file-io"))]
fn sha256(_data: &[u8]) -> Option<[u8; 32]> {
    None
}

// ---------------------------------------------------------------------------
// Reader / writer
// ---------------------------------------------------------------------------

/// Compress everything `reader` yields into `writer`.
///
/// Whole-buffer: the entire input is read into memory before the session
/// starts, and the output is held in memory until the session succeeds.
pub fn compress_stream<R: Read, W: Write>(
    mut reader: R,
    mut writer: W,
    opts: &CompressOptions,
) -> Result<CompressStats, IoError> {
    let mut input = Vec::new();
    reader.read_to_end(&mut input)?;

    let output = engine::compress(&input, opts)?;
    writer.write_all(&output)?;
    writer.flush()?;

    Ok(CompressStats {
        input_size: input.len() as u64,
        output_size: output.len() as u64,
        input_sha256: sha256(&input),
    })
}

/// Decompress everything `reader` yields into `writer`.
///
/// Whole-buffer, like [`compress_stream`]. Concatenated gzip members are
/// joined; bytes after the last member are counted in
/// [`DecompressStats::trailing_bytes`] and left to the caller to report.
pub fn decompress_stream<R: Read, W: Write>(
    mut reader: R,
    mut writer: W,
    opts: &DecompressOptions,
) -> Result<DecompressStats, IoError> {
    let mut input = Vec::new();
    reader.read_to_end(&mut input)?;

    let drained = engine::decompress_with_unused(&input, opts)?;
    if drained.unused_input > 0 {
        log::debug!("{} bytes of trailing data ignored", drained.unused_input);
    }
    writer.write_all(&drained.output)?;
    writer.flush()?;

    Ok(DecompressStats {
        input_size: input.len() as u64,
        output_size: drained.output.len() as u64,
        trailing_bytes: drained.unused_input as u64,
        output_sha256: sha256(&drained.output),
    })
}

// ---------------------------------------------------------------------------
// Files
// ---------------------------------------------------------------------------

/// Compress `input_path` into `output_path`.
///
/// The whole file is read into memory. The output file is created (or
/// truncated) only after compression succeeded.
pub fn compress_file(
    input_path: &Path,
    output_path: &Path,
    opts: &CompressOptions,
) -> Result<CompressStats, IoError> {
    let mut input = Vec::new();
    BufReader::with_capacity(BUF_SIZE, File::open(input_path)?).read_to_end(&mut input)?;

    let output = engine::compress(&input, opts)?;
    let mut writer = BufWriter::with_capacity(BUF_SIZE, File::create(output_path)?);
    writer.write_all(&output)?;
    writer.flush()?;

    Ok(CompressStats {
        input_size: input.len() as u64,
        output_size: output.len() as u64,
        input_sha256: sha256(&input),
    })
}

/// Decompress `input_path` into `output_path`.
///
/// The whole file is read into memory. Nothing is written when the input is
/// malformed.
pub fn decompress_file(
    input_path: &Path,
    output_path: &Path,
    opts: &DecompressOptions,
) -> Result<DecompressStats, IoError> {
    let mut input = Vec::new();
    BufReader::with_capacity(BUF_SIZE, File::open(input_path)?).read_to_end(&mut input)?;
    let drained = engine::decompress_with_unused(&input, opts)?;
    if drained.unused_input > 0 {
        log::debug!(
            "{}: {} bytes of trailing data ignored",
            input_path.display(),
            drained.unused_input
        );
    }

    let mut writer = BufWriter::with_capacity(BUF_SIZE, File::create(output_path)?);
    writer.write_all(&drained.output)?;
    writer.flush()?;

    Ok(DecompressStats {
        input_size: input.len() as u64,
        output_size: drained.output.len() as u64,
        trailing_bytes: drained.unused_input as u64,
        output_sha256: sha256(&drained.output),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
