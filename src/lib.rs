//! Oxigzip: a streaming gzip/zlib/deflate buffer engine in Rust.
//!
//! The crate drives a stateful codec whose per-step interface is bounded to
//! 32-bit window sizes over caller buffers of any length, growing the output
//! on demand until the codec reaches its end state.
//!
//! The crate provides:
//! - Scratch size policy per compression level and memory profile (`level`)
//! - The codec seam plus flate2-backed engines and status codes (`codec`)
//! - Chunking, output growth and the drive loop (`stream`)
//! - One-shot compression APIs (`engine`)
//! - File-oriented helpers (`io`)
//! - An optional CLI (`cli` feature)
//!
//! # Quick Start
//!
//! ```no_run
//! use oxigzip::engine::{self, CompressOptions, DecompressOptions};
//!
//! let data = b"hello hello hello hello";
//! let packed = engine::compress(data, &CompressOptions::default()).unwrap();
//! let unpacked = engine::decompress(&packed, &DecompressOptions::default()).unwrap();
//! assert_eq!(unpacked, data);
//! ```

pub mod codec;
pub mod engine;
pub mod error;
pub mod io;
pub mod level;
pub mod stream;

#[cfg(feature = "cli")]
pub mod cli;

pub use engine::{CompressOptions, DecompressOptions, compress, decompress};
pub use error::{ConfigError, ErrorKind, StreamError};
