//! Lock persistence for editlock.
//!
//! The engine only ever talks to a [`LockStore`]. Implementations must keep at
//! most one record per [`ResourceKey`] and give read-your-writes within a
//! process.
//!
//! # Known race
//!
//! Acquisition is a read-then-[`LockStore::upsert`], so two holders racing on
//! an unlocked resource can both succeed and the last write wins. A store
//! backed by something with conditional writes can close that gap inside
//! `upsert` without the engine changing.
//!
//! Two implementations ship with the crate:
//! - [`MemoryLockStore`]: a map behind an `RwLock`
//! - [`FileLockStore`]: one JSON file per key, written atomically

mod file;
mod memory;
mod record;


pub use file::FileLockStore;
pub use memory::MemoryLockStore;
pub use record::{LockRecord, ResourceKey};

use crate::error::Result;
use std::sync::Arc;

/// Storage backend for lock records.
pub trait LockStore: Send + Sync {
    /// Fetch the record for `key`, if one exists.
    fn get(&self, key: &ResourceKey) -> Result<Option<LockRecord>>;

    /// Insert or overwrite the record for `record.key`.
    fn upsert(&self, record: &LockRecord) -> Result<()>;

    /// Remove the record for `key`. Returns whether a record existed.
    fn delete(&self, key: &ResourceKey) -> Result<bool>;

    /// All records, optionally restricted to one resource type, sorted by key.
    fn list(&self, resource_type: Option<&str>) -> Result<Vec<LockRecord>>;
}

impl<S: LockStore + ?Sized> LockStore for Arc<S> {
    fn get(&self, key: &ResourceKey) -> Result<Option<LockRecord>> {
        (**self).get(key)
    }

    fn upsert(&self, record: &LockRecord) -> Result<()> {
        (**self).upsert(record)
    }

    fn delete(&self, key: &ResourceKey) -> Result<bool> {
        (**self).delete(key)
    }

    fn list(&self, resource_type: Option<&str>) -> Result<Vec<LockRecord>> {
        (**self).list(resource_type)
    }
}
