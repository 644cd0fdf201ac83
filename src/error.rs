// Error taxonomy for streaming sessions.
//
// Configuration problems are detected before anything is allocated and are
// reported as `ConfigError`. Everything that can go wrong once a session is
// running surfaces as a `StreamError`; every variant is terminal for the
// session and no partial output is handed back.

use thiserror::Error;

use crate::codec::status::CodecError;

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// Invalid session configuration. Raised before any allocation happens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The `(level, memory level)` pair has no entry in the scratch size table.
    #[error("Invalid memory level or compression level (level {level}, memory level {mem_level})")]
    InvalidProfile { level: u32, mem_level: u32 },

    /// Memory level index outside the six known profiles.
    #[error("Invalid memory level: {0}")]
    InvalidMemLevel(u32),

    /// Unrecognized wrapper format flag.
    #[error("invalid gzip flag: {0}")]
    InvalidWrapper(u16),

    /// History bits outside 0 (default) or 9..=15.
    #[error("invalid history bits: {0} (expected 0 or 9..=15)")]
    InvalidHistBits(u16),

    /// A buffer size option that must be positive was zero.
    #[error("{name} must be greater than zero")]
    ZeroSize { name: &'static str },
}

// ---------------------------------------------------------------------------
// Session errors
// ---------------------------------------------------------------------------

/// Terminal error of a streaming session.
#[derive(Debug, Error)]
pub enum StreamError {
    /// Rejected configuration; no resources were acquired.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Allocation (or growth) of the scratch workspace or output buffer failed.
    #[error("insufficient memory for buffer allocation ({requested} bytes)")]
    OutOfMemory { requested: usize },

    /// The output buffer is already at its configured maximum and the codec
    /// still needs more room.
    #[error("output buffer cannot grow beyond {max} bytes")]
    CapacityExceeded { max: usize },

    /// The codec reported a non-ok status.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// The codec broke its step contract (e.g. reported success but left
    /// input unconsumed).
    #[error("codec protocol violation: {0}")]
    Protocol(String),
}

/// Coarse classification of a [`StreamError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Config,
    OutOfMemory,
    CapacityExceeded,
    Codec,
    Protocol,
}

impl StreamError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_) => ErrorKind::Config,
            Self::OutOfMemory { .. } => ErrorKind::OutOfMemory,
            Self::CapacityExceeded { .. } => ErrorKind::CapacityExceeded,
            Self::Codec(_) => ErrorKind::Codec,
            Self::Protocol(_) => ErrorKind::Protocol,
        }
    }

    /// Raw codec status code, if the error came from the codec.
    pub fn code(&self) -> Option<i32> {
        match self {
            Self::Codec(e) => Some(e.code),
            _ => None,
        }
    }

    /// Whether a larger memory budget could make the call succeed.
    pub fn is_resource_limit(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::OutOfMemory | ErrorKind::CapacityExceeded
        )
    }
}
