pub mod build_info;

use tracing_subscriber::{fmt, EnvFilter};

/// Installs the global subscriber on stderr, keeping stdout for command
/// output. A subscriber installed elsewhere is left alone.
pub fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("flowzi=info"));

    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
