// Command-line front end for oxigzip.
//
// Explicit subcommands (`compress`, `decompress`, `config`) with gzip-style
// short flags. Files are named the way gzip names them: compressing `x`
// writes `x.gz`, decompressing `x.gz` writes `x`.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum, ValueHint};

use crate::codec::wrapper::{self, WrapperFormat};
use crate::engine::{CompressOptions, DecompressOptions};
use crate::io::{self as file_io, CompressStats, DecompressStats};
use crate::level::{self, MemLevel};
use crate::stream::chunk::CHUNK_LIMIT;
use crate::stream::driver::DriveOptions;
use crate::stream::output::{DEFAULT_BUFFER_SIZE, UNBOUNDED};

const BUF_SIZE: usize = 64 * 1024;
const SUFFIX: &str = "gz";

// ---------------------------------------------------------------------------
// Value parsers
// ---------------------------------------------------------------------------

/// Byte sizes with optional K, M, G suffixes.
fn parse_byte_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty size string".into());
    }
    let (num_part, multiplier) = match s.as_bytes().last() {
        Some(b'k' | b'K') => (&s[..s.len() - 1], 1024u64),
        Some(b'm' | b'M') => (&s[..s.len() - 1], 1024 * 1024),
        Some(b'g' | b'G') => (&s[..s.len() - 1], 1024 * 1024 * 1024),
        _ => (s, 1u64),
    };
    let num: u64 = num_part
        .trim()
        .parse()
        .map_err(|e| format!("invalid size '{s}': {e}"))?;
    num.checked_mul(multiplier)
        .ok_or_else(|| format!("size overflow: '{s}'"))
}

fn parse_hist_bits(s: &str) -> Result<u16, String> {
    let bits: u16 = s
        .trim()
        .parse()
        .map_err(|e| format!("invalid history bits '{s}': {e}"))?;
    wrapper::window_bits(bits).map_err(|e| e.to_string())?;
    Ok(bits)
}

// ---------------------------------------------------------------------------
// Clap CLI definition
// ---------------------------------------------------------------------------

/// Streaming gzip/zlib/deflate compressor.
#[derive(Parser, Debug)]
#[command(
    name = "oxigzip",
    version,
    about = "gzip/zlib/deflate compressor",
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Cmd,

    /// Force overwrite existing output files.
    #[arg(short = 'f', long, global = true)]
    force: bool,

    /// Quiet mode (suppress non-error output).
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Verbose mode (use multiple times for more detail).
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Output stats as JSON to stderr.
    #[arg(long = "json", global = true)]
    json_output: bool,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Compress a file or stdin.
    Compress(CompressArgs),
    /// Decompress a file or stdin.
    Decompress(DecompressArgs),
    /// Print build/configuration details.
    Config,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum MemLevelArg {
    Default,
    Min,
    Small,
    Medium,
    Large,
    ExtraLarge,
}

impl From<MemLevelArg> for MemLevel {
    fn from(arg: MemLevelArg) -> Self {
        match arg {
            MemLevelArg::Default => MemLevel::Default,
            MemLevelArg::Min => MemLevel::Min,
            MemLevelArg::Small => MemLevel::Small,
            MemLevelArg::Medium => MemLevel::Medium,
            MemLevelArg::Large => MemLevel::Large,
            MemLevelArg::ExtraLarge => MemLevel::ExtraLarge,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    Deflate,
    Gzip,
    GzipNoHeader,
    Zlib,
    ZlibNoHeader,
}

impl From<FormatArg> for WrapperFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Deflate => WrapperFormat::Deflate,
            FormatArg::Gzip => WrapperFormat::Gzip,
            FormatArg::GzipNoHeader => WrapperFormat::GzipNoHeader,
            FormatArg::Zlib => WrapperFormat::Zlib,
            FormatArg::ZlibNoHeader => WrapperFormat::ZlibNoHeader,
        }
    }
}

#[derive(Args, Debug)]
struct ContainerArgs {
    /// Container format around the deflate stream.
    #[arg(long, value_enum, default_value_t = FormatArg::Gzip)]
    format: FormatArg,

    /// Window size as a power of two (9-15, 0 = default).
    #[arg(long = "hist-bits", value_parser = parse_hist_bits, default_value_t = 0)]
    hist_bits: u16,

    /// Refuse to produce more than this many bytes (supports K/M/G suffix).
    #[arg(long = "max-output", value_parser = parse_byte_size)]
    max_output: Option<u64>,
}

/// Level selection: `-l N`, the gzip-style `-0`..`-3`, or `--fast`/`--best`.
/// At most one may be given.
#[derive(Args, Debug)]
#[group(multiple = false)]
struct LevelArgs {
    /// Compression level (0-3, default 2).
    #[arg(long, short = 'l', value_parser = clap::value_parser!(u32).range(0..=3))]
    level: Option<u32>,

    /// Level 0 (same as --fast).
    #[arg(short = '0', hide_short_help = true)]
    level0: bool,
    /// Level 1.
    #[arg(short = '1', hide_short_help = true)]
    level1: bool,
    /// Level 2.
    #[arg(short = '2', hide_short_help = true)]
    level2: bool,
    /// Level 3 (same as --best).
    #[arg(short = '3', hide_short_help = true)]
    level3: bool,

    /// Fastest compression (level 0).
    #[arg(long)]
    fast: bool,
    /// Best compression (level 3).
    #[arg(long)]
    best: bool,
}

impl LevelArgs {
    fn resolve(&self) -> u32 {
        if self.level0 || self.fast {
            level::MIN_LEVEL
        } else if self.level1 {
            1
        } else if self.level2 {
            2
        } else if self.level3 || self.best {
            level::MAX_LEVEL
        } else {
            self.level.unwrap_or(level::DEFAULT_LEVEL)
        }
    }
}

#[derive(Args, Debug)]
struct CompressArgs {
    #[command(flatten)]
    level: LevelArgs,

    /// Scratch memory profile.
    #[arg(long = "mem-level", value_enum, default_value_t = MemLevelArg::Default)]
    mem_level: MemLevelArg,

    #[command(flatten)]
    container: ContainerArgs,

    /// Write output to stdout.
    #[arg(short = 'c', long)]
    stdout: bool,

    /// Output file (default: <input>.gz, or stdout when reading stdin).
    #[arg(long, short = 'o', value_hint = ValueHint::FilePath)]
    output: Option<PathBuf>,

    /// Input file (default: stdin).
    #[arg(value_hint = ValueHint::FilePath)]
    input: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct DecompressArgs {
    #[command(flatten)]
    container: ContainerArgs,

    /// Write output to stdout.
    #[arg(short = 'c', long)]
    stdout: bool,

    /// Output file (default: input without its .gz suffix).
    #[arg(long, short = 'o', value_hint = ValueHint::FilePath)]
    output: Option<PathBuf>,

    /// Input file (default: stdin).
    #[arg(value_hint = ValueHint::FilePath)]
    input: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Resolved options
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Compress,
    Decompress,
    Config,
}

struct Options {
    command: Command,
    use_stdout: bool,
    force: bool,
    quiet: bool,
    verbose: u8,
    level: u32,
    mem_level: MemLevel,
    format: WrapperFormat,
    hist_bits: u16,
    max_output: Option<u64>,
    input_file: Option<PathBuf>,
    output_file: Option<PathBuf>,
    json_output: bool,
}

fn resolve_options(cli: Cli) -> Options {
    let base = Options {
        command: Command::Config,
        use_stdout: false,
        force: cli.force,
        quiet: cli.quiet,
        verbose: cli.verbose.min(2),
        level: level::DEFAULT_LEVEL,
        mem_level: MemLevel::Default,
        format: WrapperFormat::Gzip,
        hist_bits: 0,
        max_output: None,
        input_file: None,
        output_file: None,
        json_output: cli.json_output,
    };

    match cli.command {
        Cmd::Compress(args) => Options {
            command: Command::Compress,
            use_stdout: args.stdout,
            level: args.level.resolve(),
            mem_level: args.mem_level.into(),
            format: args.container.format.into(),
            hist_bits: args.container.hist_bits,
            max_output: args.container.max_output,
            input_file: args.input,
            output_file: args.output,
            ..base
        },
        Cmd::Decompress(args) => Options {
            command: Command::Decompress,
            use_stdout: args.stdout,
            format: args.container.format.into(),
            hist_bits: args.container.hist_bits,
            max_output: args.container.max_output,
            input_file: args.input,
            output_file: args.output,
            ..base
        },
        Cmd::Config => base,
    }
}

#[cfg(any(test, feature = "fuzzing"))]
pub fn fuzz_try_parse_args(args: &[String]) {
    let argv: Vec<String> = std::iter::once("oxigzip".to_string())
        .chain(args.iter().cloned())
        .collect();
    if let Ok(cli) = Cli::try_parse_from(argv) {
        let opts = resolve_options(cli);
        let _ = output_path(&opts);
    }
}

// ---------------------------------------------------------------------------
// Output naming
// ---------------------------------------------------------------------------

/// Where output goes: `None` means stdout.
fn output_path(opts: &Options) -> Result<Option<PathBuf>, String> {
    if opts.use_stdout {
        return Ok(None);
    }
    if let Some(path) = &opts.output_file {
        return Ok(Some(path.clone()));
    }
    let Some(input) = &opts.input_file else {
        return Ok(None);
    };
    match opts.command {
        Command::Compress => {
            let mut name = input.clone().into_os_string();
            name.push(".");
            name.push(SUFFIX);
            Ok(Some(PathBuf::from(name)))
        }
        Command::Decompress => strip_suffix(input).map(Some),
        Command::Config => Ok(None),
    }
}

fn strip_suffix(input: &Path) -> Result<PathBuf, String> {
    match input.extension() {
        Some(ext) if ext == SUFFIX && input.file_stem().is_some() => {
            Ok(input.with_extension(""))
        }
        _ => Err(format!(
            "{}: unknown suffix, expected .{SUFFIX} (use -o or -c)",
            input.display()
        )),
    }
}

fn drive_options(opts: &Options) -> DriveOptions {
    DriveOptions {
        chunk_limit: CHUNK_LIMIT,
        initial_capacity: DEFAULT_BUFFER_SIZE,
        max_output: opts
            .max_output
            .map_or(UNBOUNDED, |m| usize::try_from(m).unwrap_or(UNBOUNDED)),
    }
}

fn build_compress_options(opts: &Options) -> CompressOptions {
    CompressOptions {
        level: opts.level,
        mem_level: opts.mem_level,
        format: opts.format,
        hist_bits: opts.hist_bits,
        drive: drive_options(opts),
    }
}

fn build_decompress_options(opts: &Options) -> DecompressOptions {
    DecompressOptions {
        format: opts.format,
        hist_bits: opts.hist_bits,
        drive: drive_options(opts),
    }
}

// ---------------------------------------------------------------------------
// Shared I/O plumbing
// ---------------------------------------------------------------------------

fn open_input(opts: &Options) -> Result<Box<dyn Read>, i32> {
    match &opts.input_file {
        Some(path) => match File::open(path) {
            Ok(f) => Ok(Box::new(BufReader::with_capacity(BUF_SIZE, f))),
            Err(e) => {
                eprintln!("oxigzip: input file: {}: {e}", path.display());
                Err(1)
            }
        },
        None => Ok(Box::new(BufReader::new(io::stdin()))),
    }
}

fn open_output(opts: &Options, path: Option<&Path>) -> Result<Box<dyn Write>, i32> {
    match path {
        None => Ok(Box::new(BufWriter::with_capacity(
            BUF_SIZE,
            io::stdout().lock(),
        ))),
        Some(path) => {
            if path.exists() && !opts.force {
                eprintln!(
                    "oxigzip: output file exists, use -f to overwrite: {}",
                    path.display()
                );
                return Err(1);
            }
            match File::create(path) {
                Ok(f) => Ok(Box::new(BufWriter::with_capacity(BUF_SIZE, f))),
                Err(e) => {
                    eprintln!("oxigzip: output file: {}: {e}", path.display());
                    Err(1)
                }
            }
        }
    }
}

fn hex(digest: Option<[u8; 32]>) -> Option<String> {
    digest.map(|d| d.iter().map(|b| format!("{b:02x}")).collect())
}

fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => eprintln!("{s}"),
        Err(e) => eprintln!("oxigzip: json error: {e}"),
    }
}

// ---------------------------------------------------------------------------
// Config command
// ---------------------------------------------------------------------------

fn cmd_config() -> i32 {
    let version = env!("CARGO_PKG_VERSION");
    eprintln!("oxigzip version {version} (Rust)");

    let adler32 = cfg!(feature = "adler32") as u8;
    let file_io = cfg!(feature = "file-io") as u8;
    let parallel = cfg!(feature = "parallel") as u8;
    let ptr_size = std::mem::size_of::<*const ()>();

    eprintln!("ADLER32={adler32}");
    eprintln!("FILE_IO={file_io}");
    eprintln!("PARALLEL={parallel}");
    eprintln!("DEFAULT_LEVEL={}", level::DEFAULT_LEVEL);
    eprintln!("MAX_LEVEL={}", level::MAX_LEVEL);
    eprintln!("DEFAULT_BUFFER_SIZE={DEFAULT_BUFFER_SIZE}");
    eprintln!("CHUNK_LIMIT={CHUNK_LIMIT}");
    eprintln!("DEFAULT_HIST_BITS={}", wrapper::DEFAULT_HIST_BITS);
    for lvl in level::MIN_LEVEL..=level::MAX_LEVEL {
        let sizes: Vec<String> = MemLevel::ALL
            .iter()
            .map(|&m| match level::scratch_size(lvl, m) {
                Ok(size) => format!("{}={size}", m.name()),
                Err(_) => format!("{}=?", m.name()),
            })
            .collect();
        eprintln!("LEVEL{lvl}_SCRATCH {}", sizes.join(" "));
    }
    eprintln!("sizeof(usize)={ptr_size}");

    0
}

// ---------------------------------------------------------------------------
// Compress command
// ---------------------------------------------------------------------------

fn cmd_compress(opts: &Options) -> i32 {
    let compress_opts = build_compress_options(opts);
    if let Err(e) = compress_opts.validate() {
        eprintln!("oxigzip: {e}");
        return 1;
    }

    let out_path = match output_path(opts) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("oxigzip: {e}");
            return 1;
        }
    };
    let reader = match open_input(opts) {
        Ok(r) => r,
        Err(code) => return code,
    };
    let writer = match open_output(opts, out_path.as_deref()) {
        Ok(w) => w,
        Err(code) => return code,
    };

    let stats: CompressStats = match file_io::compress_stream(reader, writer, &compress_opts) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("oxigzip: compress error: {e}");
            discard(out_path.as_deref());
            return 1;
        }
    };

    if opts.verbose > 0 && !opts.quiet {
        eprintln!(
            "oxigzip: compress: input size: {}, output size: {}, ratio: {:.3}",
            stats.input_size,
            stats.output_size,
            stats.ratio()
        );
    }

    if opts.json_output {
        print_json(&serde_json::json!({
            "command": "compress",
            "input_size": stats.input_size,
            "output_size": stats.output_size,
            "level": opts.level,
            "mem_level": opts.mem_level.name(),
            "format": opts.format.name(),
            "input_sha256": hex(stats.input_sha256),
        }));
    }

    0
}

// ---------------------------------------------------------------------------
// Decompress command
// ---------------------------------------------------------------------------

fn cmd_decompress(opts: &Options) -> i32 {
    let decompress_opts = build_decompress_options(opts);
    if let Err(e) = decompress_opts.validate() {
        eprintln!("oxigzip: {e}");
        return 1;
    }

    let out_path = match output_path(opts) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("oxigzip: {e}");
            return 1;
        }
    };
    let reader = match open_input(opts) {
        Ok(r) => r,
        Err(code) => return code,
    };
    let writer = match open_output(opts, out_path.as_deref()) {
        Ok(w) => w,
        Err(code) => return code,
    };

    let stats: DecompressStats =
        match file_io::decompress_stream(reader, writer, &decompress_opts) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("oxigzip: decompress error: {e}");
                discard(out_path.as_deref());
                return 1;
            }
        };

    if stats.trailing_bytes > 0 && !opts.quiet {
        eprintln!(
            "oxigzip: warning: {} bytes of trailing data ignored",
            stats.trailing_bytes
        );
    }

    if opts.verbose > 0 && !opts.quiet {
        eprintln!(
            "oxigzip: decompress: input size: {}, output size: {}",
            stats.input_size, stats.output_size
        );
    }

    if opts.json_output {
        print_json(&serde_json::json!({
            "command": "decompress",
            "input_size": stats.input_size,
            "output_size": stats.output_size,
            "trailing_bytes": stats.trailing_bytes,
            "format": opts.format.name(),
            "output_sha256": hex(stats.output_sha256),
        }));
    }

    0
}

/// Remove a half-written output file after a failure.
fn discard(path: Option<&Path>) {
    if let Some(path) = path {
        let _ = std::fs::remove_file(path);
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run() -> ! {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .format_target(false)
        .init();

    let cli = Cli::parse();
    let mut opts = resolve_options(cli);

    // Warn if -c overrides output filename.
    if opts.use_stdout && !opts.quiet {
        if let Some(path) = &opts.output_file {
            eprintln!(
                "oxigzip: warning: -c option overrides output filename: {}",
                path.display()
            );
        }
    }
    if opts.use_stdout {
        opts.output_file = None;
    }

    let exit_code = match opts.command {
        Command::Compress => cmd_compress(&opts),
        Command::Decompress => cmd_decompress(&opts),
        Command::Config => cmd_config(),
    };

    process::exit(exit_code);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
