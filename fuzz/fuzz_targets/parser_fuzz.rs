#![no_main]
use libfuzzer_sys::fuzz_target;

const SUBCOMMANDS: [&str; 3] = ["compress", "decompress", "config"];

fuzz_target!(|data: &[u8]| {
    let Some((&pick, rest)) = data.split_first() else {
        return;
    };
    // Lead with a real subcommand most of the time so option parsing and
    // output naming get exercised, not just the top-level error path.
    let mut args: Vec<String> = Vec::new();
    if pick & 0x80 == 0 {
        args.push(SUBCOMMANDS[pick as usize % SUBCOMMANDS.len()].to_string());
    }
    args.extend(
        String::from_utf8_lossy(rest)
            .split_whitespace()
            .take(32)
            .map(str::to_string),
    );
    oxigzip::cli::fuzz_try_parse_args(&args);
});
