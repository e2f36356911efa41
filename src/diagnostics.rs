//! Diagnostic output on stderr.
//!
//! Per-file and per-line problems are logged through `tracing` and never stop
//! a run. Fatal errors are printed once by `main` right before exiting.

use std::io;
use tracing_subscriber::EnvFilter;

/// Verbosity used when `RUST_LOG` is not set.
const DEFAULT_FILTER: &str = "warn";

pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

/// Print a fatal error, including its cause chain.
pub fn fatal(err: &anyhow::Error) {
    eprintln!("Error: {:#}", err);
}
