//! Tracing subscriber bootstrap.

use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

/// Install a JSON subscriber filtered by `RUST_LOG`.
///
/// A subscriber that is already installed is left in place and the failure
/// is logged through it.
pub fn init_tracing() {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }
}
