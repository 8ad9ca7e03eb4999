//! `tracing` subscriber setup for hosts and tests.

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info";

fn filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Installs a fmt subscriber honoring `RUST_LOG` (default `info`).
///
/// Panics if a global subscriber is already installed; use [`try_init`]
/// when that can happen.
pub fn init() {
    tracing_subscriber::fmt().with_env_filter(filter()).init();
}

/// Like [`init`], but returns `false` instead of panicking when a subscriber
/// already exists.
pub fn try_init() -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(filter())
        .with_test_writer()
        .try_init()
        .is_ok()
}
