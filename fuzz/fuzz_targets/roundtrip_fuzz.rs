#![no_main]
use libfuzzer_sys::fuzz_target;
use oxigzip::codec::WrapperFormat;
use oxigzip::engine::{self, CompressOptions, DecompressOptions};
use oxigzip::level::MemLevel;
use oxigzip::stream::driver::DriveOptions;

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    // First byte picks the settings, the rest is the payload.
    let flags = data[0];
    let payload = &data[1..];
    let format = WrapperFormat::ALL[(flags as usize) % WrapperFormat::ALL.len()];
    let drive = DriveOptions {
        chunk_limit: 1 + (flags as usize >> 3),
        initial_capacity: 1 + (flags as usize & 0x1f),
        ..Default::default()
    };
    let copts = CompressOptions {
        level: u32::from(flags >> 6),
        mem_level: MemLevel::ALL[(flags as usize >> 2) % MemLevel::ALL.len()],
        format,
        hist_bits: 0,
        drive,
    };

    let packed = engine::compress(payload, &copts).unwrap();
    let dopts = DecompressOptions {
        format,
        hist_bits: 0,
        drive,
    };
    let unpacked = engine::decompress(&packed, &dopts).unwrap();
    assert_eq!(unpacked, payload);
});
