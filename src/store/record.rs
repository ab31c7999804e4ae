//! Lock record and resource key types.

use crate::error::{EditLockError, Result};
use chrono::{DateTime, Duration, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

/// Resource types become directory names in file-backed stores.
static RESOURCE_TYPE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_.-]*$").expect("Invalid resource type regex")
});

/// Identity of a lockable resource: its type plus an id unique within that type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceKey {
    /// Opaque identifier for the resource's class or table.
    pub resource_type: String,

    /// Opaque identifier, unique within `resource_type`.
    pub resource_id: String,
}

impl ResourceKey {
    /// Create a key without validation.
    pub fn new(resource_type: impl Into<String>, resource_id: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            resource_id: resource_id.into(),
        }
    }

    /// Parse a `type/id` string. The id may itself contain slashes.
    pub fn parse(s: &str) -> Result<Self> {
        let (resource_type, resource_id) = s.split_once('/').ok_or_else(|| {
            EditLockError::UserError(format!(
                "invalid resource key '{}': expected 'type/id'",
                s
            ))
        })?;

        let key = Self::new(resource_type, resource_id);
        key.validate()?;
        Ok(key)
    }

    /// Check that the type is a safe identifier and the id is non-empty.
    pub fn validate(&self) -> Result<()> {
        validate_resource_type(&self.resource_type)?;
        if self.resource_id.is_empty() {
            return Err(EditLockError::UserError(format!(
                "resource id for type '{}' must not be empty",
                self.resource_type
            )));
        }
        Ok(())
    }
}

/// A resource type must be usable as a single directory name.
pub(crate) fn validate_resource_type(resource_type: &str) -> Result<()> {
    if !RESOURCE_TYPE_REGEX.is_match(resource_type) {
        return Err(EditLockError::UserError(format!(
            "invalid resource type '{}': use letters, digits, '_', '.' or '-'",
            resource_type
        )));
    }
    Ok(())
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.resource_type, self.resource_id)
    }
}

/// Persisted lock state for one resource.
///
/// There is no history: each acquisition overwrites the record in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockRecord {
    #[serde(flatten)]
    pub key: ResourceKey,

    /// When the lock was last acquired or renewed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locked_at: Option<DateTime<Utc>>,

    /// Identity of the holder.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locked_by: Option<String>,

    /// Hard locks block every save until released.
    #[serde(default)]
    pub hard: bool,
}

impl LockRecord {
    /// A record for `holder`, locked at `at`.
    pub fn locked(key: ResourceKey, holder: &str, at: DateTime<Utc>, hard: bool) -> Self {
        Self {
            key,
            locked_at: Some(at),
            locked_by: Some(holder.to_string()),
            hard,
        }
    }

    /// Whether the lock is still inside the expiration window at `now`.
    ///
    /// A record without a timestamp is never active.
    pub fn is_active(&self, now: DateTime<Utc>, window: Duration) -> bool {
        match self.locked_at {
            Some(at) => at > now - window,
            None => false,
        }
    }

    /// Whether `holder` is the recorded holder. Expiry is not considered.
    pub fn is_held_by(&self, holder: &str) -> bool {
        self.locked_by.as_deref() == Some(holder)
    }

    /// Holder name for messages.
    pub fn holder_display(&self) -> String {
        self.locked_by
            .clone()
            .unwrap_or_else(|| "an unknown holder".to_string())
    }

    /// Parse a record from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| EditLockError::StoreError(format!("failed to parse lock record: {}", e)))
    }

    /// Serialize the record to pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            EditLockError::StoreError(format!("failed to serialize lock record: {}", e))
        })
    }
}
