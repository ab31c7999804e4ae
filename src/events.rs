//! Audit log of lock lifecycle events.
//!
//! Events are appended as NDJSON (one JSON object per line) to
//! `.editlock/events.ndjson`. The log is write-only from the engine's point of
//! view; nothing reads it back to decide lock state.
//!
//! # Event Format
//!
//! - `ts`: RFC3339 timestamp
//! - `action`: what happened (`acquire`, `release`, `save`, ...)
//! - `actor`: who did it (holder identity)
//! - `resource`: `type/id` of the affected resource, if any
//! - `details`: action-specific object
//!
//! ```no_run
//! use editlock::context::Workspace;
//! use editlock::events::{Event, EventAction, append_event};
//! use serde_json::json;
//!
//! let ws = Workspace::resolve()?;
//! let event = Event::new(EventAction::Acquire)
//!     .with_resource("file/notes.md")
//!     .with_details(json!({"hard": false}));
//! append_event(&ws, &event)?;
//! # Ok::<(), editlock::error::EditLockError>(())
//! ```

use crate::context::Workspace;
use crate::error::{EditLockError, Result};
use crate::identity::local_identity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};

/// Actions recorded in the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventAction {
    /// Workspace initialized
    Init,
    /// Lock taken or refreshed
    Acquire,
    /// Lock released by its holder
    Release,
    /// Lock removed administratively
    ForceRelease,
    /// Guarded save went through
    Save,
    /// Guarded save was refused
    SaveRejected,
}

impl std::fmt::Display for EventAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventAction::Init => write!(f, "init"),
            EventAction::Acquire => write!(f, "acquire"),
            EventAction::Release => write!(f, "release"),
            EventAction::ForceRelease => write!(f, "force_release"),
            EventAction::Save => write!(f, "save"),
            EventAction::SaveRejected => write!(f, "save_rejected"),
        }
    }
}

/// One line of the audit log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub ts: DateTime<Utc>,

    pub action: EventAction,

    pub actor: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,

    pub details: Value,
}

impl Event {
    /// New event stamped now, attributed to the local `user@HOST`.
    pub fn new(action: EventAction) -> Self {
        Self {
            ts: Utc::now(),
            action,
            actor: local_identity(),
            resource: None,
            details: Value::Object(serde_json::Map::new()),
        }
    }

    /// Attribute the event to a specific holder.
    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = actor.into();
        self
    }

    pub fn with_resource(mut self, resource: impl ToString) -> Self {
        self.resource = Some(resource.to_string());
        self
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = details;
        self
    }

    /// Serialize to a single-line JSON string.
    pub fn to_ndjson_line(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| {
            EditLockError::UserError(format!("failed to serialize event to JSON: {}", e))
        })
    }
}

/// Append an event to the workspace log, creating the file if needed.
///
/// Each call writes exactly one line and syncs it to disk.
pub fn append_event(ws: &Workspace, event: &Event) -> Result<()> {
    let events_file = ws.events_file();
    let json_line = event.to_ndjson_line()?;

    if !ws.state_dir.exists() {
        fs::create_dir_all(&ws.state_dir).map_err(|e| {
            EditLockError::UserError(format!(
                "failed to create state directory '{}': {}",
                ws.state_dir.display(),
                e
            ))
        })?;
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&events_file)
        .map_err(|e| {
            EditLockError::UserError(format!(
                "failed to open events file '{}': {}",
                events_file.display(),
                e
            ))
        })?;

    writeln!(file, "{}", json_line).map_err(|e| {
        EditLockError::UserError(format!(
            "failed to write event to '{}': {}",
            events_file.display(),
            e
        ))
    })?;

    file.sync_all().map_err(|e| {
        EditLockError::UserError(format!(
            "failed to sync events file '{}': {}",
            events_file.display(),
            e
        ))
    })?;

    Ok(())
}

/// Read every event in the log, oldest first. A missing log is empty.
pub fn read_events(ws: &Workspace) -> Result<Vec<Event>> {
    let events_file = ws.events_file();
    let content = match fs::read_to_string(&events_file) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(EditLockError::UserError(format!(
                "failed to read events file '{}': {}",
                events_file.display(),
                e
            )));
        }
    };

    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(n, line)| {
            serde_json::from_str(line).map_err(|e| {
                EditLockError::UserError(format!(
                    "malformed event on line {} of '{}': {}",
                    n + 1,
                    events_file.display(),
                    e
                ))
            })
        })
        .collect()
}
