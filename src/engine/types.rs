//! Lock state, snapshot and status types.

use crate::clock::truncate_to_seconds;
use crate::error::{EditLockError, Result};
use crate::store::ResourceKey;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Kind of an active lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LockType {
    /// Advisory only; saves are flagged, not blocked.
    #[default]
    Soft,
    /// Blocks every save until the holder releases it.
    Hard,
}

impl LockType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LockType::Soft => "soft",
            LockType::Hard => "hard",
        }
    }

    pub fn is_hard(&self) -> bool {
        matches!(self, LockType::Hard)
    }
}

impl fmt::Display for LockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-resource lock state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockState {
    /// No record, no timestamp, or an expired timestamp.
    Unlocked,
    LockedSoft,
    LockedHard,
}

impl LockState {
    pub fn is_locked(&self) -> bool {
        !matches!(self, LockState::Unlocked)
    }

    pub fn lock_type(&self) -> Option<LockType> {
        match self {
            LockState::Unlocked => None,
            LockState::LockedSoft => Some(LockType::Soft),
            LockState::LockedHard => Some(LockType::Hard),
        }
    }
}

/// Timestamps handed to a client when it acquires a lock, and handed back
/// when it saves.
///
/// Both values are truncated to whole seconds when issued so sub-second
/// jitter never produces a false conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockSnapshot {
    #[serde(alias = "original_locked_at")]
    pub locked_at: DateTime<Utc>,

    #[serde(alias = "original_modified_at")]
    pub modified_at: DateTime<Utc>,
}

impl LockSnapshot {
    pub fn new(locked_at: DateTime<Utc>, modified_at: DateTime<Utc>) -> Self {
        Self {
            locked_at: truncate_to_seconds(locked_at),
            modified_at: truncate_to_seconds(modified_at),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| EditLockError::UserError(format!("failed to serialize snapshot: {}", e)))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| EditLockError::UserError(format!("failed to parse snapshot: {}", e)))
    }

    /// Read a snapshot previously written with [`LockSnapshot::to_json`].
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            EditLockError::UserError(format!(
                "failed to read snapshot file '{}': {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_json(&content)
    }
}

/// Read-only view of a resource's lock, for presentation layers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LockStatus {
    #[serde(flatten)]
    pub resource: ResourceKey,

    pub is_locked: bool,

    /// Holder of the active lock; `None` when unlocked.
    pub locked_by: Option<String>,

    /// Whether the lock blocks the viewer. Never true for the holder.
    pub applies: bool,

    /// Seconds until expiry; negative once expired, `None` if never locked.
    pub seconds_remaining: Option<i64>,

    pub lock_type: Option<LockType>,

    /// The lock has been held past the warning window.
    pub expiring_soon: bool,
}

impl LockStatus {
    /// Whole minutes left on the lock, rounded up so a live lock never reads
    /// as zero. Zero when expired or without a timestamp.
    pub fn minutes_remaining(&self) -> i64 {
        match self.seconds_remaining {
            Some(s) if s > 0 => (s + 59) / 60,
            _ => 0,
        }
    }

    /// One-line description for the viewer.
    pub fn summary(&self) -> String {
        if !self.is_locked {
            return format!("{} is not locked", self.resource);
        }

        let minutes = self.minutes_remaining();
        let kind = self.lock_type.map(|t| t.as_str()).unwrap_or("soft");
        if self.applies {
            format!(
                "{} is still locked ({}) for {} minutes by {}",
                self.resource,
                kind,
                minutes,
                self.locked_by.as_deref().unwrap_or("an unknown holder")
            )
        } else {
            format!(
                "You have a {} lock on {} for {} more minutes",
                kind, self.resource, minutes
            )
        }
    }
}

/// Timer settings exported to clients so they can warn before expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSettings {
    pub time_until_expiration: i64,
    pub time_until_warning: i64,
}
