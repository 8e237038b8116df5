//! Log subscriber setup

use camwall_core::{CamwallError, CamwallResult};
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "camwall=info,camwall_media=info,camwall_remote=info";

/// Install a fmt subscriber filtered by `RUST_LOG`.
///
/// Fails if a global subscriber is already set.
pub fn init_logging() -> CamwallResult<()> {
    init_logging_with(DEFAULT_LOG_FILTER)
}

/// Like [`init_logging`] with an explicit fallback filter
pub fn init_logging_with(default_filter: &str) -> CamwallResult<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|e| CamwallError::InvalidConfiguration {
            message: format!("Failed to install log subscriber: {}", e),
        })
}
