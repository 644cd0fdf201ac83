#![no_main]
use libfuzzer_sys::fuzz_target;
use oxigzip::codec::WrapperFormat;
use oxigzip::engine::{self, DecompressOptions};
use oxigzip::stream::driver::DriveOptions;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes must only ever produce errors, never a panic.
    for format in WrapperFormat::ALL {
        let opts = DecompressOptions {
            format,
            hist_bits: 0,
            drive: DriveOptions {
                chunk_limit: 17,
                initial_capacity: 64,
                max_output: 1 << 20,
            },
        };
        let _ = engine::decompress(data, &opts);
    }
});
