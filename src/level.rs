// Scratch workspace sizing per compression level and memory level.
//
// The deflate engine keeps its hash table and token buffer in a scratch
// workspace owned by the session. The hash table size depends on the level;
// the token buffer (how many symbols are queued before a block is emitted)
// depends on the memory level.

use crate::error::ConfigError;

/// Fastest supported compression level.
pub const MIN_LEVEL: u32 = 0;

/// Best supported compression level.
pub const MAX_LEVEL: u32 = 3;

/// Level used when the caller does not pick one.
pub const DEFAULT_LEVEL: u32 = 2;

const KIB: u32 = 1024;

/// Bytes per buffered token.
const TOKEN_SIZE: u32 = 4;

/// Fixed per-level requirement: hash table plus level-specific state.
const LVL0_REQ: u32 = 2 * 8 * KIB;
const LVL1_REQ: u32 = 4 * KIB + 2 * 32 * KIB;
const LVL2_REQ: u32 = 4 * KIB + 2 * 48 * KIB;
const LVL3_REQ: u32 = 4 * KIB + 4 * 4 * KIB + 2 * 48 * KIB;

/// Time/memory trade-off point selecting the token buffer size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MemLevel {
    #[default]
    Default,
    Min,
    Small,
    Medium,
    Large,
    ExtraLarge,
}

impl MemLevel {
    pub const ALL: [MemLevel; 6] = [
        MemLevel::Default,
        MemLevel::Min,
        MemLevel::Small,
        MemLevel::Medium,
        MemLevel::Large,
        MemLevel::ExtraLarge,
    ];

    /// Numeric selector (0 = default, 1 = min, ... 5 = extra large).
    pub fn index(self) -> u32 {
        match self {
            Self::Default => 0,
            Self::Min => 1,
            Self::Small => 2,
            Self::Medium => 3,
            Self::Large => 4,
            Self::ExtraLarge => 5,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Min => "min",
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
            Self::ExtraLarge => "extra-large",
        }
    }
}

impl TryFrom<u32> for MemLevel {
    type Error = ConfigError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|m| m.index() == value)
            .ok_or(ConfigError::InvalidMemLevel(value))
    }
}

/// Token buffer size in bytes for a memory level.
const fn token_buffer(kib: u32) -> u32 {
    TOKEN_SIZE * kib * KIB
}

// ---------------------------------------------------------------------------
// Size table
// ---------------------------------------------------------------------------

pub const LVL0_MIN: u32 = LVL0_REQ + token_buffer(1);
pub const LVL0_SMALL: u32 = LVL0_REQ + token_buffer(16);
pub const LVL0_MEDIUM: u32 = LVL0_REQ + token_buffer(32);
pub const LVL0_DEFAULT: u32 = LVL0_REQ + token_buffer(48);
pub const LVL0_LARGE: u32 = LVL0_REQ + token_buffer(64);
pub const LVL0_EXTRA_LARGE: u32 = LVL0_REQ + token_buffer(128);

pub const LVL1_MIN: u32 = LVL1_REQ + token_buffer(1);
pub const LVL1_SMALL: u32 = LVL1_REQ + token_buffer(16);
pub const LVL1_MEDIUM: u32 = LVL1_REQ + token_buffer(32);
pub const LVL1_DEFAULT: u32 = LVL1_REQ + token_buffer(48);
pub const LVL1_LARGE: u32 = LVL1_REQ + token_buffer(64);
pub const LVL1_EXTRA_LARGE: u32 = LVL1_REQ + token_buffer(128);

pub const LVL2_MIN: u32 = LVL2_REQ + token_buffer(1);
pub const LVL2_SMALL: u32 = LVL2_REQ + token_buffer(16);
pub const LVL2_MEDIUM: u32 = LVL2_REQ + token_buffer(32);
pub const LVL2_DEFAULT: u32 = LVL2_REQ + token_buffer(48);
pub const LVL2_LARGE: u32 = LVL2_REQ + token_buffer(64);
pub const LVL2_EXTRA_LARGE: u32 = LVL2_REQ + token_buffer(128);

pub const LVL3_MIN: u32 = LVL3_REQ + token_buffer(1);
pub const LVL3_SMALL: u32 = LVL3_REQ + token_buffer(16);
pub const LVL3_MEDIUM: u32 = LVL3_REQ + token_buffer(32);
pub const LVL3_DEFAULT: u32 = LVL3_REQ + token_buffer(48);
pub const LVL3_LARGE: u32 = LVL3_REQ + token_buffer(64);
pub const LVL3_EXTRA_LARGE: u32 = LVL3_REQ + token_buffer(128);

/// Scratch workspace size for `(level, mem_level)`.
///
/// Every supported pair has its own entry; anything else is a configuration
/// error and nothing is allocated.
pub fn scratch_size(level: u32, mem_level: MemLevel) -> Result<u32, ConfigError> {
    use MemLevel as M;

    match (level, mem_level) {
        (0, M::Default) => Ok(LVL0_DEFAULT),
        (0, M::Min) => Ok(LVL0_MIN),
        (0, M::Small) => Ok(LVL0_SMALL),
        (0, M::Medium) => Ok(LVL0_MEDIUM),
        (0, M::Large) => Ok(LVL0_LARGE),
        (0, M::ExtraLarge) => Ok(LVL0_EXTRA_LARGE),

        (1, M::Default) => Ok(LVL1_DEFAULT),
        (1, M::Min) => Ok(LVL1_MIN),
        (1, M::Small) => Ok(LVL1_SMALL),
        (1, M::Medium) => Ok(LVL1_MEDIUM),
        (1, M::Large) => Ok(LVL1_LARGE),
        (1, M::ExtraLarge) => Ok(LVL1_EXTRA_LARGE),

        (2, M::Default) => Ok(LVL2_DEFAULT),
        (2, M::Min) => Ok(LVL2_MIN),
        (2, M::Small) => Ok(LVL2_SMALL),
        (2, M::Medium) => Ok(LVL2_MEDIUM),
        (2, M::Large) => Ok(LVL2_LARGE),
        (2, M::ExtraLarge) => Ok(LVL2_EXTRA_LARGE),

        (3, M::Default) => Ok(LVL3_DEFAULT),
        (3, M::Min) => Ok(LVL3_MIN),
        (3, M::Small) => Ok(LVL3_SMALL),
        (3, M::Medium) => Ok(LVL3_MEDIUM),
        (3, M::Large) => Ok(LVL3_LARGE),
        (3, M::ExtraLarge) => Ok(LVL3_EXTRA_LARGE),

        (level, mem_level) => Err(ConfigError::InvalidProfile {
            level,
            mem_level: mem_level.index(),
        }),
    }
}

/// Smallest workspace the engine accepts for `level` (the `Min` entry).
pub fn min_scratch_size(level: u32) -> Option<u32> {
    scratch_size(level, MemLevel::Min).ok()
}

// ---------------------------------------------------------------------------
// CompressionProfile
// ---------------------------------------------------------------------------

/// A validated `(level, mem_level)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionProfile {
    level: u32,
    mem_level: MemLevel,
    scratch_size: u32,
}

impl CompressionProfile {
    pub fn new(level: u32, mem_level: MemLevel) -> Result<Self, ConfigError> {
        let scratch_size = scratch_size(level, mem_level)?;
        Ok(Self {
            level,
            mem_level,
            scratch_size,
        })
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn mem_level(&self) -> MemLevel {
        self.mem_level
    }

    /// Scratch workspace size in bytes.
    pub fn scratch_size(&self) -> usize {
        self.scratch_size as usize
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn every_pair_has_its_own_entry() {
        let expected: [(u32, MemLevel, u32); 24] = [
            (0, MemLevel::Default, 212_992),
            (0, MemLevel::Min, 20_480),
            (0, MemLevel::Small, 81_920),
            (0, MemLevel::Medium, 147_456),
            (0, MemLevel::Large, 278_528),
            (0, MemLevel::ExtraLarge, 540_672),
            (1, MemLevel::Default, 266_240),
            (1, MemLevel::Min, 73_728),
            (1, MemLevel::Small, 135_168),
            (1, MemLevel::Medium, 200_704),
            (1, MemLevel::Large, 331_776),
            (1, MemLevel::ExtraLarge, 593_920),
            (2, MemLevel::Default, 299_008),
            (2, MemLevel::Min, 106_496),
            (2, MemLevel::Small, 167_936),
            (2, MemLevel::Medium, 233_472),
            (2, MemLevel::Large, 364_544),
            (2, MemLevel::ExtraLarge, 626_688),
            (3, MemLevel::Default, 315_392),
            (3, MemLevel::Min, 122_880),
            (3, MemLevel::Small, 184_320),
            (3, MemLevel::Medium, 249_856),
            (3, MemLevel::Large, 380_928),
            (3, MemLevel::ExtraLarge, 643_072),
        ];

        let mut seen = HashSet::new();
        for (level, mem, size) in expected {
            let got = scratch_size(level, mem).unwrap();
            assert_eq!(got, size, "level {level}, mem level {}", mem.name());
            assert!(got > 0);
            assert!(seen.insert(got), "duplicate size {got}");
        }
        assert_eq!(seen.len(), 24);
    }

    #[test]
    fn sizes_grow_with_memory_level() {
        for level in MIN_LEVEL..=MAX_LEVEL {
            let order = [
                MemLevel::Min,
                MemLevel::Small,
                MemLevel::Medium,
                MemLevel::Default,
                MemLevel::Large,
                MemLevel::ExtraLarge,
            ];
            let sizes: Vec<u32> = order
                .iter()
                .map(|m| scratch_size(level, *m).unwrap())
                .collect();
            assert!(sizes.windows(2).all(|w| w[0] < w[1]), "level {level}");
        }
    }

    #[test]
    fn unknown_level_rejected() {
        for level in [4, 9, u32::MAX] {
            let err = scratch_size(level, MemLevel::Default).unwrap_err();
            assert_eq!(
                err,
                ConfigError::InvalidProfile {
                    level,
                    mem_level: 0
                }
            );
        }
    }

    #[test]
    fn mem_level_from_index() {
        for m in MemLevel::ALL {
            assert_eq!(MemLevel::try_from(m.index()).unwrap(), m);
        }
        let err = MemLevel::try_from(6u32).unwrap_err();
        assert_eq!(err, ConfigError::InvalidMemLevel(6));
        assert_eq!(err.to_string(), "Invalid memory level: 6");
    }

    #[test]
    fn profile_carries_scratch_size() {
        let p = CompressionProfile::new(1, MemLevel::Small).unwrap();
        assert_eq!(p.level(), 1);
        assert_eq!(p.mem_level(), MemLevel::Small);
        assert_eq!(p.scratch_size(), LVL1_SMALL as usize);
        assert!(CompressionProfile::new(4, MemLevel::Small).is_err());
        assert_eq!(min_scratch_size(3), Some(LVL3_MIN));
        assert_eq!(min_scratch_size(4), None);
    }
}
