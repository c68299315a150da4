use tracing_subscriber::EnvFilter;

/// Log to stderr so prompts and results on stdout stay clean.
///
/// `RUST_LOG` wins when set; otherwise only warnings, or everything down to
/// debug with `--verbose`.
pub fn init(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with_writer(std::io::stderr)
        .init();
}
