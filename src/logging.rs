//! Tracing setup for the binary

use tracing_subscriber::{fmt, EnvFilter};

/// Initialize the global subscriber; respects `RUST_LOG`, defaults to
/// `info`. Safe to call more than once.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .try_init();
}
