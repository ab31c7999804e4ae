//! Save outcomes and rejection reasons.

use crate::engine::LockSnapshot;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Why a save was refused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "error", rename_all = "snake_case")]
pub enum SaveRejection {
    /// The lock lapsed and someone saved the resource after the snapshot.
    StaleAndModified {
        modified_at: DateTime<Utc>,
        modified_by: Option<String>,
    },
    /// Someone else holds the active lock.
    LockedByOther { holder: String },
    /// The saver holds the lock, but from a newer editing session.
    SelfConflict { locked_at: DateTime<Utc> },
}

impl SaveRejection {
    /// Stable identifier for client-side message selection.
    pub fn code(&self) -> &'static str {
        match self {
            SaveRejection::StaleAndModified { .. } => "not_locked_and_modified",
            SaveRejection::LockedByOther { .. } => "locked_by_someone_else",
            SaveRejection::SelfConflict { .. } => "was_already_locked",
        }
    }
}

impl fmt::Display for SaveRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaveRejection::StaleAndModified {
                modified_at,
                modified_by,
            } => write!(
                f,
                "{} changed this at {} after you started editing",
                modified_by.as_deref().unwrap_or("someone else"),
                modified_at.to_rfc3339()
            ),
            SaveRejection::LockedByOther { holder } => {
                write!(f, "this is currently locked by {}", holder)
            }
            SaveRejection::SelfConflict { locked_at } => write!(
                f,
                "you are editing this in another session (locked at {})",
                locked_at.to_rfc3339()
            ),
        }
    }
}

/// Result of checking a save against the current lock state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The lock lapsed but nothing changed; it was re-acquired for the saver.
    ProceedAndRelock(LockSnapshot),
    /// The saver holds the lock from this session.
    ProceedAndUnlock,
    /// The save must not happen.
    Reject(SaveRejection),
}

impl SaveOutcome {
    pub fn may_proceed(&self) -> bool {
        !matches!(self, SaveOutcome::Reject(_))
    }
}

/// Result of opening a resource for editing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditSession {
    /// A fresh lock was taken; the snapshot goes to the client.
    Editable(LockSnapshot),
    /// The viewer already holds the lock, probably in another window. The
    /// lock is left untouched.
    AlreadyEditing { locked_at: DateTime<Utc> },
    /// Someone else holds the lock; the viewer gets a read-only view.
    LockedByOther { holder: String },
}
