// Logging setup
//
// Diagnostics go to stderr through tracing so they never mix with the
// transcript on stdout. RUST_LOG wins over the defaults below.

use tracing_subscriber::EnvFilter;

/// Default filter: quiet unless `--debug`
pub fn default_filter(debug: bool) -> &'static str {
    if debug {
        "warn,kramer=debug"
    } else {
        "warn"
    }
}

pub fn init(debug: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(debug)));

    // A second init (tests, embedding) is harmless
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
