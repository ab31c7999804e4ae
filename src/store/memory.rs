//! In-process lock store.

use super::{LockRecord, LockStore, ResourceKey};
use crate::error::{EditLockError, Result};
use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Lock store backed by an ordered map.
///
/// Each call takes the map lock once, so a single `upsert` or `delete` is
/// atomic, but the engine's read-then-write is not.
#[derive(Debug, Default)]
pub struct MemoryLockStore {
    records: RwLock<BTreeMap<ResourceKey, LockRecord>>,
}

impl MemoryLockStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, BTreeMap<ResourceKey, LockRecord>>> {
        self.records
            .read()
            .map_err(|_| EditLockError::StoreError("memory store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, BTreeMap<ResourceKey, LockRecord>>> {
        self.records
            .write()
            .map_err(|_| EditLockError::StoreError("memory store lock poisoned".to_string()))
    }
}

impl LockStore for MemoryLockStore {
    fn get(&self, key: &ResourceKey) -> Result<Option<LockRecord>> {
        Ok(self.read()?.get(key).cloned())
    }

    fn upsert(&self, record: &LockRecord) -> Result<()> {
        self.write()?.insert(record.key.clone(), record.clone());
        Ok(())
    }

    fn delete(&self, key: &ResourceKey) -> Result<bool> {
        Ok(self.write()?.remove(key).is_some())
    }

    fn list(&self, resource_type: Option<&str>) -> Result<Vec<LockRecord>> {
        Ok(self
            .read()?
            .values()
            .filter(|r| resource_type.is_none_or(|t| r.key.resource_type == t))
            .cloned()
            .collect())
    }
}
