//! Diagnostic tracing for the checker.
//!
//! Check results are printed to stdout by the CLI; tracing output goes to
//! stderr and is controlled only by `RUST_LOG`, so piping `check --json` stays
//! clean.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_FILTER: &str = "warn";

/// Install the global subscriber.
///
/// ```bash
/// RUST_LOG=stackcheck=debug stackcheck check cases/get.toml
/// ```
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .init();
}
