use tracing_subscriber::EnvFilter;

/// Initialise tracing output for the crate.
///
/// - 0 -> warn
/// - 1 -> info
/// - 2 -> debug
/// - 3+ -> trace
///
/// `RUST_LOG` overrides the verbosity when set. Calling this twice is a
/// no-op; the second subscriber is rejected silently.
pub fn init(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("slepian={level}")));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
