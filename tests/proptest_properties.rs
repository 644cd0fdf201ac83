use oxigzip::codec::WrapperFormat;
use oxigzip::codec::status::{self, CodecErrorKind, Direction};
use oxigzip::engine::{self, CompressOptions, DecompressOptions};
use oxigzip::level::{self, MemLevel};
use oxigzip::stream::chunk::take_chunk;
use oxigzip::stream::driver::DriveOptions;
use oxigzip::stream::output::OutputBuffer;
use oxigzip::StreamError;
use proptest::prelude::*;

fn format_strategy() -> impl Strategy<Value = WrapperFormat> {
    prop::sample::select(WrapperFormat::ALL.to_vec())
}

const ENCODE_CODES: [i32; 7] = [
    status::STATELESS_OVERFLOW,
    status::INVALID_STATE,
    status::INVALID_LEVEL,
    status::INVALID_LEVEL_BUF,
    status::INVALID_FLUSH,
    status::INVALID_PARAM,
    status::INVALID_OPERATION,
];

const DECODE_CODES: [i32; 12] = [
    status::END_INPUT,
    status::OUT_OVERFLOW,
    status::NAME_OVERFLOW,
    status::COMMENT_OVERFLOW,
    status::EXTRA_OVERFLOW,
    status::NEED_DICT,
    status::INVALID_BLOCK,
    status::INVALID_SYMBOL,
    status::INVALID_LOOKBACK,
    status::INVALID_WRAPPER,
    status::UNSUPPORTED_METHOD,
    status::INCORRECT_CHECKSUM,
];

proptest! {
    #[test]
    fn prop_compress_decompress_roundtrip(
        data in proptest::collection::vec(any::<u8>(), 0..16384),
        level in level::MIN_LEVEL..=level::MAX_LEVEL,
        format in format_strategy(),
        chunk_limit in 1usize..4096,
        initial_capacity in 1usize..2048,
    ) {
        let drive = DriveOptions {
            chunk_limit,
            initial_capacity,
            ..Default::default()
        };
        let packed = engine::compress(&data, &CompressOptions {
            level,
            format,
            drive,
            ..Default::default()
        }).unwrap();
        let unpacked = engine::decompress(&packed, &DecompressOptions {
            format,
            hist_bits: 0,
            drive,
        }).unwrap();
        prop_assert_eq!(unpacked, data);
    }

    #[test]
    fn prop_chunks_conserve_total(total in 0usize..1_000_000, limit in 1usize..70_000) {
        let mut remaining = total;
        let mut sum = 0usize;
        loop {
            let (chunk, rest) = take_chunk(remaining, limit);
            prop_assert!(chunk <= limit);
            prop_assert!(chunk > 0 || total == 0);
            prop_assert_eq!(chunk + rest, remaining);
            sum += chunk;
            remaining = rest;
            if remaining == 0 {
                break;
            }
        }
        prop_assert_eq!(sum, total);
    }

    #[test]
    fn prop_growth_doubles_then_clamps(c0 in 1usize..512, max in 1usize..100_000) {
        let mut buf = OutputBuffer::new(c0, max);
        let mut expected = c0.min(max);
        let mut written = 0u8;
        loop {
            let a = buf.arrange(usize::MAX).unwrap();
            prop_assert_eq!(a.capacity, expected);
            buf.window(a.free).fill(written);
            buf.commit(a.free);
            written = written.wrapping_add(1);
            if expected == max {
                break;
            }
            expected = if expected <= max / 2 { expected * 2 } else { max };
        }
        let is_capped = matches!(
            buf.arrange(usize::MAX),
            Err(StreamError::CapacityExceeded { max: m }) if m == max
        );
        prop_assert!(is_capped);
        prop_assert_eq!(buf.filled(), max);
        prop_assert_eq!(buf.into_vec().len(), max);
    }

    #[test]
    fn prop_unknown_codes_keep_their_value(code in any::<i32>()) {
        for direction in [Direction::Encode, Direction::Decode] {
            let known = match direction {
                Direction::Encode => ENCODE_CODES.contains(&code),
                Direction::Decode => DECODE_CODES.contains(&code),
            };
            match status::translate(direction, code) {
                None => prop_assert_eq!(code, 0),
                Some(e) => {
                    prop_assert_eq!(e.code, code);
                    prop_assert_eq!(e.kind == CodecErrorKind::Unknown, !known);
                }
            }
        }
    }

    #[test]
    fn prop_garbage_never_panics(data in proptest::collection::vec(any::<u8>(), 0..2048), format in format_strategy()) {
        let _ = engine::decompress(&data, &DecompressOptions {
            format,
            ..Default::default()
        });
    }

    #[test]
    fn prop_scratch_sizes_grow_with_profile(lvl in level::MIN_LEVEL..=level::MAX_LEVEL) {
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
            .map(|&m| level::scratch_size(lvl, m).unwrap())
            .collect();
        prop_assert!(sizes.windows(2).all(|w| w[0] < w[1]));
        prop_assert_eq!(level::min_scratch_size(lvl), Some(sizes[0]));
    }
}

#[test]
fn every_table_code_has_a_specific_kind() {
    for code in ENCODE_CODES {
        let e = status::translate(Direction::Encode, code).unwrap();
        assert_ne!(e.kind, CodecErrorKind::Unknown, "encode {code}");
    }
    for code in DECODE_CODES {
        let e = status::translate(Direction::Decode, code).unwrap();
        assert_ne!(e.kind, CodecErrorKind::Unknown, "decode {code}");
    }
    assert!(status::translate(Direction::Encode, status::COMP_OK).is_none());
    assert!(status::translate(Direction::Decode, status::DECOMP_OK).is_none());
}
