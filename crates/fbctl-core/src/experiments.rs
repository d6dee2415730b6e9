//! Opt-in experiments toggled through runtime config or `FBCTL_EXPERIMENTS`

use crate::types::RuntimeConfig;

/// Realtime Database management API instead of the legacy FireData listing
pub const RTDB_MANAGEMENT: &str = "rtdbmanagement";

/// Whether the named experiment is enabled
pub fn is_enabled(config: &RuntimeConfig, name: &str) -> bool {
    config.experiments.iter().any(|e| e == name)
}
