use tracing_subscriber::EnvFilter;

/// Installs the global tracing subscriber for a harness run.
///
/// `RUST_LOG` wins when set; otherwise the harness logs at debug (its own
/// events) when `verbose`, info otherwise. Only the first call in a process
/// installs, so every test in a binary can call this from its setup.
pub fn init_logging(verbose: bool) {
    let fallback = if verbose { "fs_e2e=debug,info" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();
}
