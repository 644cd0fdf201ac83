fn main() {
    #[cfg(feature = "cli")]
    oxigzip::cli::run();

    #[cfg(not(feature = "cli"))]
    {
        eprintln!("oxigzip: CLI not enabled. Rebuild with `--features cli`.");
        std::process::exit(1);
    }
}
