//! Lock acquisition, release, and query operations.

use super::types::{ClientSettings, LockSnapshot, LockState, LockStatus, LockType};
use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::error::{EditLockError, Result};
use crate::resource::Lockable;
use crate::store::{LockRecord, LockStore, ResourceKey};
use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info};

/// The lock lifecycle state machine.
///
/// Holds no lock state of its own: every operation reads the record fresh
/// from the store and computes expiry against the clock at that moment.
#[derive(Debug)]
pub struct LockEngine<S, C = SystemClock> {
    store: S,
    clock: C,
    expiration_window: Duration,
    warning_window: Duration,
}

impl<S: LockStore> LockEngine<S, SystemClock> {
    /// Engine on wall-clock time.
    pub fn with_system_clock(store: S, config: &Config) -> Self {
        Self::new(store, SystemClock, config)
    }
}

impl<S: LockStore, C: Clock> LockEngine<S, C> {
    pub fn new(store: S, clock: C, config: &Config) -> Self {
        Self {
            store,
            clock,
            expiration_window: config.expiration_window(),
            warning_window: config.warning_window(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn expiration_window(&self) -> Duration {
        self.expiration_window
    }

    pub fn warning_window(&self) -> Duration {
        self.warning_window
    }

    /// Timer settings for clients.
    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            time_until_expiration: self.expiration_window.num_seconds(),
            time_until_warning: self.warning_window.num_seconds(),
        }
    }

    /// The record for `key` if it is currently active.
    pub fn active_lock(&self, key: &ResourceKey) -> Result<Option<LockRecord>> {
        let now = self.clock.now();
        Ok(self
            .store
            .get(key)?
            .filter(|r| r.is_active(now, self.expiration_window)))
    }

    /// Take or renew the lock on `resource` for `holder`.
    ///
    /// Fails with `AlreadyLocked` only when a different holder has an active
    /// lock. Renewal by the current holder overwrites the timestamp and lock
    /// type. Exactly one store write happens on success.
    pub fn acquire<R>(&self, resource: &R, holder: &str, hard: bool) -> Result<LockSnapshot>
    where
        R: Lockable + ?Sized,
    {
        check_holder(holder)?;
        let key = resource.resource_key();
        let now = self.clock.now();

        if let Some(current) = self.store.get(&key)?
            && current.is_active(now, self.expiration_window)
            && !current.is_held_by(holder)
        {
            debug!(resource = %key, holder, current = ?current.locked_by, "lock held by someone else");
            return Err(EditLockError::AlreadyLocked {
                key,
                holder: current.holder_display(),
            });
        }

        let record = LockRecord::locked(key.clone(), holder, now, hard);
        self.store.upsert(&record)?;

        let lock_type = if hard { LockType::Hard } else { LockType::Soft };
        info!(resource = %key, holder, lock_type = %lock_type, "lock acquired");

        Ok(LockSnapshot::new(now, resource.modified_at()))
    }

    /// Remove the lock regardless of holder. Returns whether a record existed.
    pub fn release(&self, key: &ResourceKey) -> Result<bool> {
        let removed = self.store.delete(key)?;
        if removed {
            info!(resource = %key, "lock released");
        }
        Ok(removed)
    }

    /// Remove the lock only if `holder` holds it and it has not expired.
    pub fn release_for(&self, key: &ResourceKey, holder: &str) -> Result<()> {
        check_holder(holder)?;

        match self.active_lock(key)? {
            Some(record) if record.is_held_by(holder) => {
                self.store.delete(key)?;
                info!(resource = %key, holder, "lock released by holder");
                Ok(())
            }
            other => {
                debug!(
                    resource = %key,
                    holder,
                    current = ?other.and_then(|r| r.locked_by),
                    "release refused"
                );
                Err(EditLockError::NotHolder {
                    key: key.clone(),
                    holder: holder.to_string(),
                })
            }
        }
    }

    /// Force-release a batch of resources. Returns how many locks existed.
    pub fn release_all<'a, I>(&self, keys: I) -> Result<usize>
    where
        I: IntoIterator<Item = &'a ResourceKey>,
    {
        let mut count = 0;
        for key in keys {
            if self.release(key)? {
                count += 1;
            }
        }
        Ok(count)
    }

    pub fn is_locked(&self, key: &ResourceKey) -> Result<bool> {
        Ok(self.active_lock(key)?.is_some())
    }

    /// A lock never applies to its own holder.
    pub fn applies_to(&self, key: &ResourceKey, holder: &str) -> Result<bool> {
        Ok(self
            .active_lock(key)?
            .is_some_and(|r| !r.is_held_by(holder)))
    }

    /// Seconds until the lock expires; negative once it has expired.
    ///
    /// Only useful for countdowns. Use [`LockEngine::is_locked`] to decide
    /// whether the resource is locked.
    pub fn seconds_remaining(&self, key: &ResourceKey) -> Result<Option<i64>> {
        let now = self.clock.now();
        Ok(self
            .store
            .get(key)?
            .and_then(|r| r.locked_at)
            .map(|at| self.remaining_seconds(at, now)))
    }

    /// Holder of the active lock.
    pub fn locked_by(&self, key: &ResourceKey) -> Result<Option<String>> {
        Ok(self.active_lock(key)?.and_then(|r| r.locked_by))
    }

    pub fn lock_type(&self, key: &ResourceKey) -> Result<Option<LockType>> {
        Ok(self.state(key)?.lock_type())
    }

    pub fn state(&self, key: &ResourceKey) -> Result<LockState> {
        Ok(match self.active_lock(key)? {
            None => LockState::Unlocked,
            Some(r) if r.hard => LockState::LockedHard,
            Some(_) => LockState::LockedSoft,
        })
    }

    /// Everything a presentation layer needs about `key`, from one read.
    ///
    /// With no `viewer`, an active lock always applies.
    pub fn status(&self, key: &ResourceKey, viewer: Option<&str>) -> Result<LockStatus> {
        let now = self.clock.now();
        let record = self.store.get(key)?;
        Ok(self.status_of(key.clone(), record.as_ref(), now, viewer))
    }

    /// Active locks, optionally for one resource type.
    pub fn list_locked(&self, resource_type: Option<&str>) -> Result<Vec<LockStatus>> {
        self.list_where(resource_type, true)
    }

    /// Stored records that have expired or carry no timestamp.
    pub fn list_unlocked(&self, resource_type: Option<&str>) -> Result<Vec<LockStatus>> {
        self.list_where(resource_type, false)
    }

    fn list_where(&self, resource_type: Option<&str>, active: bool) -> Result<Vec<LockStatus>> {
        let now = self.clock.now();
        Ok(self
            .store
            .list(resource_type)?
            .iter()
            .filter(|r| r.is_active(now, self.expiration_window) == active)
            .map(|r| self.status_of(r.key.clone(), Some(r), now, None))
            .collect())
    }

    fn status_of(
        &self,
        key: ResourceKey,
        record: Option<&LockRecord>,
        now: DateTime<Utc>,
        viewer: Option<&str>,
    ) -> LockStatus {
        let locked_at = record.and_then(|r| r.locked_at);
        let active = record.filter(|r| r.is_active(now, self.expiration_window));

        let applies = active.is_some_and(|r| viewer.is_none_or(|v| !r.is_held_by(v)));
        let expiring_soon = active
            .and_then(|r| r.locked_at)
            .is_some_and(|at| now - at >= self.warning_window);

        LockStatus {
            resource: key,
            is_locked: active.is_some(),
            locked_by: active.and_then(|r| r.locked_by.clone()),
            applies,
            seconds_remaining: locked_at.map(|at| self.remaining_seconds(at, now)),
            lock_type: active.map(|r| if r.hard { LockType::Hard } else { LockType::Soft }),
            expiring_soon,
        }
    }

    /// `window - elapsed`, truncated toward zero.
    fn remaining_seconds(&self, locked_at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
        let elapsed = now - locked_at;
        (self.expiration_window.num_milliseconds() - elapsed.num_milliseconds()) / 1000
    }
}

fn check_holder(holder: &str) -> Result<()> {
    if holder.trim().is_empty() {
        return Err(EditLockError::UserError(
            "lock holder must not be empty".to_string(),
        ));
    }
    Ok(())
}
