//! Diagnostics go to stderr through `tracing-subscriber`; stdout stays
//! reserved for JSON output.

use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber.
///
/// `RUST_LOG` wins when set (e.g. `RUST_LOG=oneline_recon=debug`); otherwise
/// `verbose` selects `debug`, else `warn`. Library records emitted through the
/// `log` facade are bridged into the same subscriber.
pub fn init(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .without_time()
        .try_init();
}
