use tracing_subscriber::{fmt, EnvFilter};

/// Installs the global `tracing` subscriber. `RUST_LOG` wins when set; otherwise
/// `verbose` selects debug output for this crate and info for everything else.
pub fn init(verbose: bool) {
    let default_directive = if verbose {
        "info,glucose_sim=debug"
    } else {
        "warn,glucose_sim=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    // A subscriber may already be installed (e.g. by a test harness); keep that one.
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
