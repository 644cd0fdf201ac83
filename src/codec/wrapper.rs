// Container formats around the raw deflate bitstream.
//
// Gzip and zlib with headers are handled end to end by flate2. The
// headerless variants carry only a trailer, which the engines produce and
// verify themselves from a running checksum.

use bitflags::bitflags;

use crate::error::ConfigError;

/// Window size used when `hist_bits` is 0.
pub const DEFAULT_HIST_BITS: u8 = 15;
/// Smallest window flate2 accepts.
pub const MIN_HIST_BITS: u8 = 9;

bitflags! {
    /// Header/trailer pieces present in a wrapper format.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct WrapperFlags: u8 {
        const GZIP_HEADER = 1 << 0;
        const GZIP_TRAILER = 1 << 1;
        const ZLIB_HEADER = 1 << 2;
        const ZLIB_TRAILER = 1 << 3;
    }
}

/// Container format selected by the gzip flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WrapperFormat {
    /// Raw deflate, no header or trailer.
    Deflate,
    /// Gzip header, deflate body, CRC-32/ISIZE trailer.
    #[default]
    Gzip,
    /// Deflate body followed by the gzip trailer only.
    GzipNoHeader,
    /// Zlib header, deflate body, Adler-32 trailer.
    Zlib,
    /// Deflate body followed by the Adler-32 trailer only.
    ZlibNoHeader,
}

impl WrapperFormat {
    pub const ALL: [WrapperFormat; 5] = [
        WrapperFormat::Deflate,
        WrapperFormat::Gzip,
        WrapperFormat::GzipNoHeader,
        WrapperFormat::Zlib,
        WrapperFormat::ZlibNoHeader,
    ];

    /// Parse a numeric gzip flag (0..=4).
    pub fn from_flag(flag: u16) -> Result<Self, ConfigError> {
        Self::ALL
            .into_iter()
            .find(|f| f.flag() == flag)
            .ok_or(ConfigError::InvalidWrapper(flag))
    }

    pub fn flag(self) -> u16 {
        match self {
            Self::Deflate => 0,
            Self::Gzip => 1,
            Self::GzipNoHeader => 2,
            Self::Zlib => 3,
            Self::ZlibNoHeader => 4,
        }
    }

    pub fn flags(self) -> WrapperFlags {
        match self {
            Self::Deflate => WrapperFlags::empty(),
            Self::Gzip => WrapperFlags::GZIP_HEADER | WrapperFlags::GZIP_TRAILER,
            Self::GzipNoHeader => WrapperFlags::GZIP_TRAILER,
            Self::Zlib => WrapperFlags::ZLIB_HEADER | WrapperFlags::ZLIB_TRAILER,
            Self::ZlibNoHeader => WrapperFlags::ZLIB_TRAILER,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Deflate => "deflate",
            Self::Gzip => "gzip",
            Self::GzipNoHeader => "gzip-no-header",
            Self::Zlib => "zlib",
            Self::ZlibNoHeader => "zlib-no-header",
        }
    }
}

/// Resolve `hist_bits` to a flate2 window size.
///
/// 0 selects the default 32 KiB window.
pub fn window_bits(hist_bits: u16) -> Result<u8, ConfigError> {
    match hist_bits {
        0 => Ok(DEFAULT_HIST_BITS),
        9..=15 => Ok(hist_bits as u8),
        _ => Err(ConfigError::InvalidHistBits(hist_bits)),
    }
}

// ---------------------------------------------------------------------------
// Headerless trailers
// ---------------------------------------------------------------------------

/// Running checksum for a trailer the engine writes or verifies itself.
pub(crate) enum TrailerCheck {
    None,
    Gzip(flate2::Crc),
    Zlib(Adler32),
}

impl TrailerCheck {
    /// Checksum needed for `flags`, or `None` when flate2 owns the trailer.
    pub(crate) fn for_flags(flags: WrapperFlags) -> Self {
        let has_header = flags.intersects(WrapperFlags::GZIP_HEADER | WrapperFlags::ZLIB_HEADER);
        if has_header {
            Self::None
        } else if flags.contains(WrapperFlags::GZIP_TRAILER) {
            Self::Gzip(flate2::Crc::new())
        } else if flags.contains(WrapperFlags::ZLIB_TRAILER) {
            Self::Zlib(Adler32::new())
        } else {
            Self::None
        }
    }

    pub(crate) fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    pub(crate) fn update(&mut self, data: &[u8]) {
        match self {
            Self::None => {}
            Self::Gzip(crc) => crc.update(data),
            Self::Zlib(adler) => adler.update(data),
        }
    }

    /// Trailer length in bytes.
    pub(crate) fn trailer_len(&self) -> usize {
        match self {
            Self::None => 0,
            Self::Gzip(_) => 8,
            Self::Zlib(_) => 4,
        }
    }

    /// Serialize the trailer: CRC-32 and ISIZE little-endian for gzip,
    /// Adler-32 big-endian for zlib.
    pub(crate) fn trailer(&self) -> Vec<u8> {
        match self {
            Self::None => Vec::new(),
            Self::Gzip(crc) => {
                let mut out = Vec::with_capacity(8);
                out.extend_from_slice(&crc.sum().to_le_bytes());
                out.extend_from_slice(&crc.amount().to_le_bytes());
                out
            }
            Self::Zlib(adler) => adler.sum().to_be_bytes().to_vec(),
        }
    }
}

/// Incremental Adler-32.
pub(crate) struct Adler32 {
    #[cfg(feature = "adler32")]
    inner: simd_adler32::Adler32,
    #[cfg(not(feature = "adler32"))]
    a: u32,
    #[cfg(not(feature = "adler32"))]
    b: u32,
}

impl Adler32 {
    #[cfg(feature = "adler32")]
    pub(crate) fn new() -> Self {
        Self {
            inner: simd_adler32::Adler32::new(),
        }
    }

    #[cfg(not(feature = "adler32"))]
    pub(crate) fn new() -> Self {
        Self { a: 1, b: 0 }
    }

    pub(crate) fn update(&mut self, data: &[u8]) {
        #[cfg(feature = "adler32")]
        {
            self.inner.write(data);
        }
        #[cfg(not(feature = "adler32"))]
        {
            const MOD_ADLER: u32 = 65521;
            for &byte in data {
                self.a = (self.a + u32::from(byte)) % MOD_ADLER;
                self.b = (self.b + self.a) % MOD_ADLER;
            }
        }
    }

    pub(crate) fn sum(&self) -> u32 {
        #[cfg(feature = "adler32")]
        {
            self.inner.finish()
        }
        #[cfg(not(feature = "adler32"))]
        {
            (self.b << 16) | self.a
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_roundtrip() {
        for format in WrapperFormat::ALL {
            assert_eq!(WrapperFormat::from_flag(format.flag()).unwrap(), format);
        }
        assert_eq!(
            WrapperFormat::from_flag(5),
            Err(ConfigError::InvalidWrapper(5))
        );
    }

    #[test]
    fn headerless_formats_have_trailer_only() {
        let gz = WrapperFormat::GzipNoHeader.flags();
        assert!(gz.contains(WrapperFlags::GZIP_TRAILER));
        assert!(!gz.contains(WrapperFlags::GZIP_HEADER));
        assert!(WrapperFormat::Deflate.flags().is_empty());
        assert!(TrailerCheck::for_flags(WrapperFormat::Gzip.flags()).is_none());
        assert_eq!(
            TrailerCheck::for_flags(WrapperFormat::ZlibNoHeader.flags()).trailer_len(),
            4
        );
    }

    #[test]
    fn window_bits_range() {
        assert_eq!(window_bits(0).unwrap(), 15);
        assert_eq!(window_bits(9).unwrap(), 9);
        assert_eq!(window_bits(15).unwrap(), 15);
        for bad in [1, 8, 16, 31] {
            assert_eq!(window_bits(bad), Err(ConfigError::InvalidHistBits(bad)));
        }
    }

    #[test]
    fn adler32_known_value() {
        // Adler-32 of "Wikipedia" is 0x11E60398.
        let mut a = Adler32::new();
        a.update(b"Wiki");
        a.update(b"pedia");
        assert_eq!(a.sum(), 0x11E6_0398);
    }

    #[test]
    fn gzip_trailer_layout() {
        let mut check = TrailerCheck::for_flags(WrapperFormat::GzipNoHeader.flags());
        check.update(b"hello");
        let trailer = check.trailer();
        assert_eq!(trailer.len(), 8);
        // CRC-32 of "hello" is 0x3610A686.
        assert_eq!(&trailer[..4], &0x3610_A686u32.to_le_bytes());
        assert_eq!(&trailer[4..], &5u32.to_le_bytes());
    }
}
