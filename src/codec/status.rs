// Codec status codes and their translation into domain errors.
//
// Encode and decode directions use separate code tables; the same numeric
// value means different things in each (e.g. -3 is "invalid state" when
// encoding and "invalid lookback distance" when decoding).

use thiserror::Error;

// ---------------------------------------------------------------------------
// Encode-direction codes
// ---------------------------------------------------------------------------

pub const COMP_OK: i32 = 0;
pub const STATELESS_OVERFLOW: i32 = -1;
pub const INVALID_STATE: i32 = -3;
pub const INVALID_LEVEL: i32 = -4;
pub const INVALID_LEVEL_BUF: i32 = -5;
pub const INVALID_FLUSH: i32 = -7;
pub const INVALID_PARAM: i32 = -8;
pub const INVALID_OPERATION: i32 = -9;

// ---------------------------------------------------------------------------
// Decode-direction codes
// ---------------------------------------------------------------------------

pub const DECOMP_OK: i32 = 0;
pub const END_INPUT: i32 = 1;
pub const OUT_OVERFLOW: i32 = 2;
pub const NAME_OVERFLOW: i32 = 3;
pub const COMMENT_OVERFLOW: i32 = 4;
pub const EXTRA_OVERFLOW: i32 = 5;
pub const NEED_DICT: i32 = 6;
pub const INVALID_BLOCK: i32 = -1;
pub const INVALID_SYMBOL: i32 = -2;
pub const INVALID_LOOKBACK: i32 = -3;
pub const INVALID_WRAPPER: i32 = -4;
pub const UNSUPPORTED_METHOD: i32 = -5;
pub const INCORRECT_CHECKSUM: i32 = -6;

/// Which code table a status belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Encode,
    Decode,
}

/// Domain meaning of a non-ok codec status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodecErrorKind {
    // Encode
    InvalidFlush,
    InvalidParameter,
    OutputBufferTooSmall,
    InvalidOperation,
    InvalidState,
    InvalidLevel,
    LevelBufferTooSmall,
    // Decode
    EndOfInput,
    OutputExhausted,
    NameOverflow,
    CommentOverflow,
    ExtraFieldOverflow,
    DictionaryRequired,
    InvalidBlock,
    InvalidSymbol,
    InvalidLookback,
    InvalidWrapper,
    UnsupportedMethod,
    ChecksumMismatch,
    /// Code outside both tables.
    Unknown,
}

impl CodecErrorKind {
    pub fn message(self) -> &'static str {
        match self {
            Self::InvalidFlush => "Invalid flush type",
            Self::InvalidParameter => "Invalid parameter",
            Self::OutputBufferTooSmall => "Not enough room in output buffer",
            Self::InvalidOperation => "Invalid operation",
            Self::InvalidState => "Invalid state",
            Self::InvalidLevel => "Invalid compression level.",
            Self::LevelBufferTooSmall => "Level buffer too small.",
            Self::EndOfInput => "End of input reached",
            Self::OutputExhausted => "End of output reached",
            Self::NameOverflow => "End of gzip name buffer reached",
            Self::CommentOverflow => "End of gzip comment buffer reached",
            Self::ExtraFieldOverflow => "End of extra buffer reached",
            Self::DictionaryRequired => "Dictionary needed to continue",
            Self::InvalidBlock => "Invalid deflate block found",
            Self::InvalidSymbol => "Invalid deflate symbol found",
            Self::InvalidLookback => "Invalid lookback distance found",
            Self::InvalidWrapper => "Invalid gzip/zlib wrapper found",
            Self::UnsupportedMethod => "Gzip/zlib wrapper specifies unsupported compress method",
            Self::ChecksumMismatch => "Incorrect checksum found",
            Self::Unknown => "Unknown error",
        }
    }
}

/// A non-ok status reported by the codec.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Error {code} {message}")]
pub struct CodecError {
    pub direction: Direction,
    pub kind: CodecErrorKind,
    /// Raw status code as reported by the codec.
    pub code: i32,
    pub message: &'static str,
}

fn encode_kind(code: i32) -> CodecErrorKind {
    match code {
        INVALID_FLUSH => CodecErrorKind::InvalidFlush,
        INVALID_PARAM => CodecErrorKind::InvalidParameter,
        STATELESS_OVERFLOW => CodecErrorKind::OutputBufferTooSmall,
        INVALID_OPERATION => CodecErrorKind::InvalidOperation,
        INVALID_STATE => CodecErrorKind::InvalidState,
        INVALID_LEVEL => CodecErrorKind::InvalidLevel,
        INVALID_LEVEL_BUF => CodecErrorKind::LevelBufferTooSmall,
        _ => CodecErrorKind::Unknown,
    }
}

fn decode_kind(code: i32) -> CodecErrorKind {
    match code {
        END_INPUT => CodecErrorKind::EndOfInput,
        OUT_OVERFLOW => CodecErrorKind::OutputExhausted,
        NAME_OVERFLOW => CodecErrorKind::NameOverflow,
        COMMENT_OVERFLOW => CodecErrorKind::CommentOverflow,
        EXTRA_OVERFLOW => CodecErrorKind::ExtraFieldOverflow,
        NEED_DICT => CodecErrorKind::DictionaryRequired,
        INVALID_BLOCK => CodecErrorKind::InvalidBlock,
        INVALID_SYMBOL => CodecErrorKind::InvalidSymbol,
        INVALID_LOOKBACK => CodecErrorKind::InvalidLookback,
        INVALID_WRAPPER => CodecErrorKind::InvalidWrapper,
        UNSUPPORTED_METHOD => CodecErrorKind::UnsupportedMethod,
        INCORRECT_CHECKSUM => CodecErrorKind::ChecksumMismatch,
        _ => CodecErrorKind::Unknown,
    }
}

/// Translate a codec status into an error. `None` means the status is ok.
pub fn translate(direction: Direction, code: i32) -> Option<CodecError> {
    // Both tables use 0 for success.
    if code == COMP_OK {
        return None;
    }
    let kind = match direction {
        Direction::Encode => encode_kind(code),
        Direction::Decode => decode_kind(code),
    };
    Some(CodecError {
        direction,
        kind,
        code,
        message: kind.message(),
    })
}

/// `Ok(())` for an ok status, the translated error otherwise.
pub fn check(direction: Direction, code: i32) -> Result<(), CodecError> {
    match translate(direction, code) {
        None => Ok(()),
        Some(e) => Err(e),
    }
}
