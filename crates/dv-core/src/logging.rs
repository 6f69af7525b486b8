//! Structured logging setup
//!
//! Library code only emits `tracing` events. Binaries and tests call
//! [`init_tracing`] to install a formatter; repeated calls are ignored.

use std::sync::Once;

use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Install the global `fmt` subscriber.
///
/// `RUST_LOG` wins over `default_directive` when set. Only the first call in
/// a process has any effect.
pub fn init_tracing(default_directive: &str) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_directive));
        // Another subscriber may already be installed by the host
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .try_init();
    });
}

/// Default directive for a verbosity count, as given by repeated `-v` flags
pub fn directive_for_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}
