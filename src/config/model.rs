//! Config struct definition and default implementation.

use super::types::*;
use crate::engine::LockType;
use serde::{Deserialize, Serialize};

/// Configuration for an editlock workspace.
///
/// This struct represents the contents of `.editlock/config.yaml`.
/// Unknown fields in the YAML are ignored for forward compatibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // =========================================================================
    // Lock timing
    // =========================================================================
    /// Seconds until an unrenewed lock is considered stale.
    #[serde(default = "default_expiration_window_seconds")]
    pub expiration_window_seconds: u32,

    /// Seconds of lock age after which clients warn that the lock is about to
    /// expire. Advisory only; the engine never enforces it.
    #[serde(default = "default_warning_window_seconds")]
    pub warning_window_seconds: u32,

    // =========================================================================
    // Acquisition
    // =========================================================================
    /// Lock type used when a command does not ask for one explicitly.
    #[serde(default)]
    pub default_lock_type: LockType,

    /// Holder identity used when none is given (default: `user@HOST`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_holder: Option<String>,

    // =========================================================================
    // Audit
    // =========================================================================
    /// Whether lock lifecycle events are appended to `events.ndjson`.
    #[serde(default = "default_true")]
    pub audit_log: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            expiration_window_seconds: default_expiration_window_seconds(),
            warning_window_seconds: default_warning_window_seconds(),
            default_lock_type: LockType::default(),
            default_holder: None,
            audit_log: default_true(),
        }
    }
}
