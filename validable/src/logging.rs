//! Tracing subscriber bootstrap.
//!
//! The library only emits `tracing` events; installing a subscriber is left to
//! binaries and tests. [`init_logging`] is the stock setup.

use crate::constants::{DEFAULT_LOG_FILTER, LOG_FILTER_ENV};
use tracing_subscriber::EnvFilter;

/// Install a fmt subscriber.
///
/// Filter precedence: `filter` argument, then `VALIDABLE_LOG`, then `info`.
/// Returns `false` if a global subscriber was already installed.
pub fn init_logging(filter: Option<&str>) -> bool {
    let filter = match filter {
        Some(directives) => EnvFilter::new(directives),
        None => EnvFilter::try_from_env(LOG_FILTER_ENV)
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .is_ok()
}
