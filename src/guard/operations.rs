//! Save-time conflict detection and the guarded save flow.

use super::types::{EditSession, SaveOutcome, SaveRejection};
use crate::clock::{Clock, truncate_to_seconds};
use crate::engine::{LockEngine, LockSnapshot};
use crate::error::{EditLockError, Result};
use crate::resource::Lockable;
use crate::store::{LockStore, ResourceKey};
use tracing::{debug, info, warn};

/// Decides whether a client's save may go through.
///
/// Borrow one per request; it holds nothing but the engine reference.
#[derive(Debug)]
pub struct ConcurrencyGuard<'a, S, C> {
    engine: &'a LockEngine<S, C>,
}

impl<'a, S: LockStore, C: Clock> ConcurrencyGuard<'a, S, C> {
    pub fn new(engine: &'a LockEngine<S, C>) -> Self {
        Self { engine }
    }

    /// Open `resource` for editing by `holder`.
    ///
    /// Only an unlocked resource gets a new lock. A holder reopening their
    /// own lock is told so instead of being given a fresh snapshot, which
    /// would invalidate the session that is already open.
    pub fn begin_edit<R>(&self, resource: &R, holder: &str, hard: bool) -> Result<EditSession>
    where
        R: Lockable + ?Sized,
    {
        let key = resource.resource_key();
        match self.engine.active_lock(&key)? {
            None => Ok(EditSession::Editable(
                self.engine.acquire(resource, holder, hard)?,
            )),
            Some(record) if record.is_held_by(holder) => Ok(EditSession::AlreadyEditing {
                locked_at: record.locked_at.map(truncate_to_seconds).unwrap_or_default(),
            }),
            Some(record) => Ok(EditSession::LockedByOther {
                holder: record.holder_display(),
            }),
        }
    }

    /// Compare the client's snapshot against the current lock and resource.
    ///
    /// All comparisons are to the second. On `ProceedAndRelock` the lock has
    /// already been re-acquired (soft) for `holder`.
    pub fn check_before_save<R>(
        &self,
        resource: &R,
        holder: &str,
        snapshot: &LockSnapshot,
    ) -> Result<SaveOutcome>
    where
        R: Lockable + ?Sized,
    {
        let key = resource.resource_key();

        let outcome = match self.engine.active_lock(&key)? {
            None => {
                let current = truncate_to_seconds(resource.modified_at());
                if current == truncate_to_seconds(snapshot.modified_at) {
                    // Lapsed from inactivity only. An administrative release
                    // looks the same from here and is also relocked.
                    let renewed = self.engine.acquire(resource, holder, false)?;
                    SaveOutcome::ProceedAndRelock(renewed)
                } else {
                    SaveOutcome::Reject(SaveRejection::StaleAndModified {
                        modified_at: current,
                        modified_by: resource.modified_by(),
                    })
                }
            }
            Some(record) if !record.is_held_by(holder) => {
                SaveOutcome::Reject(SaveRejection::LockedByOther {
                    holder: record.holder_display(),
                })
            }
            Some(record) => {
                let locked_at = record.locked_at.map(truncate_to_seconds).unwrap_or_default();
                if locked_at == truncate_to_seconds(snapshot.locked_at) {
                    SaveOutcome::ProceedAndUnlock
                } else {
                    SaveOutcome::Reject(SaveRejection::SelfConflict { locked_at })
                }
            }
        };

        debug!(resource = %key, holder, outcome = ?outcome, "checked save");
        Ok(outcome)
    }

    /// Refuse any physical write while a hard lock is active, whoever asks.
    ///
    /// The holder gets past this only by releasing the lock first.
    pub fn ensure_writable(&self, key: &ResourceKey) -> Result<()> {
        match self.engine.active_lock(key)? {
            Some(record) if record.hard => Err(EditLockError::HardLocked {
                key: key.clone(),
                holder: record.holder_display(),
            }),
            _ => Ok(()),
        }
    }

    /// Check, write, and release in one step.
    ///
    /// `write` runs only if the check passes. A hard lock is released before
    /// the write (otherwise the write would be blocked); a soft lock is
    /// released after a successful write, so a failed write keeps the lock.
    pub fn save<R, T, F>(
        &self,
        resource: &R,
        holder: &str,
        snapshot: &LockSnapshot,
        write: F,
    ) -> Result<T>
    where
        R: Lockable + ?Sized,
        F: FnOnce() -> Result<T>,
    {
        let key = resource.resource_key();

        if let SaveOutcome::Reject(rejection) = self.check_before_save(resource, holder, snapshot)? {
            warn!(resource = %key, holder, reason = rejection.code(), "save rejected");
            return Err(EditLockError::SaveRejected(rejection));
        }

        let hard = self.engine.active_lock(&key)?.is_some_and(|r| r.hard);
        if hard {
            self.engine.release_for(&key, holder)?;
            self.ensure_writable(&key)?;
            let out = write()?;
            info!(resource = %key, holder, "saved after releasing hard lock");
            return Ok(out);
        }

        self.ensure_writable(&key)?;
        let out = write()?;
        match self.engine.release_for(&key, holder) {
            Ok(()) => {}
            // Lapsed between check and write; the content is saved either way.
            Err(EditLockError::NotHolder { .. }) => {
                warn!(resource = %key, holder, "lock was gone after save");
            }
            Err(e) => return Err(e),
        }
        info!(resource = %key, holder, "saved and released lock");
        Ok(out)
    }
}
