//! Tests for the concurrency guard.

use super::*;
use crate::clock::ManualClock;
use crate::config::Config;
use crate::engine::{LockEngine, LockState};
use crate::error::EditLockError;
use crate::resource::{Lockable, Resource};
use crate::store::{MemoryLockStore, ResourceKey};
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::cell::Cell;
use std::sync::Arc;

type TestEngine = LockEngine<MemoryLockStore, Arc<ManualClock>>;

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 3, 10, 0, 0).unwrap()
}

fn setup() -> (TestEngine, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(start()));
    let engine = LockEngine::new(MemoryLockStore::new(), Arc::clone(&clock), &Config::default());
    (engine, clock)
}

fn story() -> Resource {
    Resource::new(ResourceKey::new("story", "1"), start() - Duration::hours(2))
        .with_modified_by("stan")
}

#[test]
fn test_fresh_snapshot_proceeds_and_unlocks() {
    let (engine, _clock) = setup();
    let guard = ConcurrencyGuard::new(&engine);
    let r = story();

    let snapshot = engine.acquire(&r, "stan", false).unwrap();
    let outcome = guard.check_before_save(&r, "stan", &snapshot).unwrap();

    assert_eq!(outcome, SaveOutcome::ProceedAndUnlock);
    assert!(outcome.may_proceed());
}

#[test]
fn test_expired_but_unmodified_relocks() {
    let (engine, clock) = setup();
    let guard = ConcurrencyGuard::new(&engine);
    let r = story();

    let snapshot = engine.acquire(&r, "stan", false).unwrap();
    clock.advance(Duration::seconds(900));
    assert!(!engine.is_locked(&r.key).unwrap());

    let outcome = guard.check_before_save(&r, "stan", &snapshot).unwrap();

    match outcome {
        SaveOutcome::ProceedAndRelock(renewed) => {
            assert_eq!(renewed.locked_at, start() + Duration::seconds(900));
        }
        other => panic!("expected ProceedAndRelock, got {:?}", other),
    }
    assert_eq!(engine.locked_by(&r.key).unwrap().as_deref(), Some("stan"));
}

#[test]
fn test_subsecond_modification_jitter_is_ignored() {
    let (engine, clock) = setup();
    let guard = ConcurrencyGuard::new(&engine);
    let mut r = story();

    let snapshot = engine.acquire(&r, "stan", false).unwrap();
    r.modified_at += Duration::milliseconds(300);
    clock.advance(Duration::seconds(900));

    let outcome = guard.check_before_save(&r, "stan", &snapshot).unwrap();
    assert!(matches!(outcome, SaveOutcome::ProceedAndRelock(_)));
}

#[test]
fn test_expired_and_modified_elsewhere_is_rejected() {
    let (engine, clock) = setup();
    let guard = ConcurrencyGuard::new(&engine);
    let mut r = story();

    let snapshot = engine.acquire(&r, "stan", false).unwrap();
    // Someone saves outside the lock protocol.
    r.modified_at = start() + Duration::seconds(30);
    r.modified_by = Some("fred".to_string());
    clock.advance(Duration::seconds(900));

    let outcome = guard.check_before_save(&r, "stan", &snapshot).unwrap();

    assert_eq!(
        outcome,
        SaveOutcome::Reject(SaveRejection::StaleAndModified {
            modified_at: start() + Duration::seconds(30),
            modified_by: Some("fred".to_string()),
        })
    );
    assert!(!engine.is_locked(&r.key).unwrap());
}

#[test]
fn test_locked_by_other_is_rejected() {
    let (engine, clock) = setup();
    let guard = ConcurrencyGuard::new(&engine);
    let r = story();

    let snapshot = engine.acquire(&r, "stan", false).unwrap();
    clock.advance(Duration::seconds(700));
    engine.acquire(&r, "fred", false).unwrap();

    let outcome = guard.check_before_save(&r, "stan", &snapshot).unwrap();
    assert_eq!(
        outcome,
        SaveOutcome::Reject(SaveRejection::LockedByOther {
            holder: "fred".to_string()
        })
    );
}

#[test]
fn test_second_session_of_same_holder_is_rejected() {
    let (engine, clock) = setup();
    let guard = ConcurrencyGuard::new(&engine);
    let r = story();

    let first_tab = engine.acquire(&r, "stan", false).unwrap();
    clock.advance(Duration::seconds(45));
    let second_tab = engine.acquire(&r, "stan", false).unwrap();

    let outcome = guard.check_before_save(&r, "stan", &first_tab).unwrap();
    assert_eq!(
        outcome,
        SaveOutcome::Reject(SaveRejection::SelfConflict {
            locked_at: start() + Duration::seconds(45)
        })
    );

    let outcome = guard.check_before_save(&r, "stan", &second_tab).unwrap();
    assert_eq!(outcome, SaveOutcome::ProceedAndUnlock);
}

#[test]
fn test_rejection_codes_and_messages() {
    let stale = SaveRejection::StaleAndModified {
        modified_at: start(),
        modified_by: None,
    };
    assert_eq!(stale.code(), "not_locked_and_modified");
    assert!(stale.to_string().starts_with("someone else changed this"));

    let other = SaveRejection::LockedByOther {
        holder: "fred".to_string(),
    };
    assert_eq!(other.code(), "locked_by_someone_else");
    assert!(other.to_string().contains("fred"));

    let own = SaveRejection::SelfConflict { locked_at: start() };
    assert_eq!(own.code(), "was_already_locked");
}

#[test]
fn test_save_runs_write_and_releases() {
    let (engine, _clock) = setup();
    let guard = ConcurrencyGuard::new(&engine);
    let r = story();
    let snapshot = engine.acquire(&r, "stan", false).unwrap();

    let saved = guard.save(&r, "stan", &snapshot, || Ok("written")).unwrap();

    assert_eq!(saved, "written");
    assert!(!engine.is_locked(&r.key).unwrap());
}

#[test]
fn test_save_rejection_skips_write() {
    let (engine, _clock) = setup();
    let guard = ConcurrencyGuard::new(&engine);
    let r = story();
    let snapshot = engine.acquire(&r, "fred", false).unwrap();
    let wrote = Cell::new(false);

    let err = guard
        .save(&r, "stan", &snapshot, || {
            wrote.set(true);
            Ok(())
        })
        .unwrap_err();

    assert!(!wrote.get());
    match err {
        EditLockError::SaveRejected(SaveRejection::LockedByOther { holder }) => {
            assert_eq!(holder, "fred")
        }
        other => panic!("expected SaveRejected, got {:?}", other),
    }
    assert_eq!(engine.locked_by(&r.key).unwrap().as_deref(), Some("fred"));
}

#[test]
fn test_failed_soft_write_keeps_lock() {
    let (engine, _clock) = setup();
    let guard = ConcurrencyGuard::new(&engine);
    let r = story();
    let snapshot = engine.acquire(&r, "stan", false).unwrap();

    let err = guard
        .save(&r, "stan", &snapshot, || -> crate::error::Result<()> {
            Err(EditLockError::StoreError("disk full".to_string()))
        })
        .unwrap_err();

    assert!(matches!(err, EditLockError::StoreError(_)));
    assert_eq!(engine.locked_by(&r.key).unwrap().as_deref(), Some("stan"));
}

#[test]
fn test_relock_path_saves_and_releases() {
    let (engine, clock) = setup();
    let guard = ConcurrencyGuard::new(&engine);
    let r = story();
    let snapshot = engine.acquire(&r, "stan", false).unwrap();
    clock.advance(Duration::hours(1));

    guard.save(&r, "stan", &snapshot, || Ok(())).unwrap();
    assert!(!engine.is_locked(&r.key).unwrap());
}

#[test]
fn test_hard_lock_blocks_every_writer() {
    let (engine, _clock) = setup();
    let guard = ConcurrencyGuard::new(&engine);
    let r = story();
    engine.acquire(&r, "stan", true).unwrap();

    for who in ["fred", "stan"] {
        let err = guard.ensure_writable(&r.key).unwrap_err();
        assert!(
            matches!(err, EditLockError::HardLocked { ref holder, .. } if holder == "stan"),
            "write by {} should be blocked",
            who
        );
    }

    // A non-holder cannot get around it through the guarded save either.
    let bogus = crate::engine::LockSnapshot::new(start(), r.modified_at());
    let err = guard.save(&r, "fred", &bogus, || Ok(())).unwrap_err();
    assert!(matches!(err, EditLockError::SaveRejected(_)));
    assert_eq!(engine.state(&r.key).unwrap(), LockState::LockedHard);
}

#[test]
fn test_hard_lock_holder_must_release_before_writing() {
    let (engine, _clock) = setup();
    let guard = ConcurrencyGuard::new(&engine);
    let r = story();
    engine.acquire(&r, "stan", true).unwrap();

    assert!(guard.ensure_writable(&r.key).is_err());
    engine.release_for(&r.key, "stan").unwrap();
    assert!(guard.ensure_writable(&r.key).is_ok());
}

#[test]
fn test_guarded_save_by_hard_lock_holder_unlocks_first() {
    let (engine, _clock) = setup();
    let guard = ConcurrencyGuard::new(&engine);
    let r = story();
    let snapshot = engine.acquire(&r, "stan", true).unwrap();

    let state_during_write = Cell::new(None);
    guard
        .save(&r, "stan", &snapshot, || {
            state_during_write.set(Some(engine.state(&r.key)?));
            Ok(())
        })
        .unwrap();

    assert_eq!(state_during_write.get(), Some(LockState::Unlocked));
    assert!(!engine.is_locked(&r.key).unwrap());
}

#[test]
fn test_soft_lock_does_not_block_writes() {
    let (engine, _clock) = setup();
    let guard = ConcurrencyGuard::new(&engine);
    let r = story();
    engine.acquire(&r, "fred", false).unwrap();

    assert!(guard.ensure_writable(&r.key).is_ok());
}

#[test]
fn test_begin_edit_locks_unlocked_resource() {
    let (engine, _clock) = setup();
    let guard = ConcurrencyGuard::new(&engine);
    let r = story();

    let session = guard.begin_edit(&r, "stan", false).unwrap();

    match session {
        EditSession::Editable(snapshot) => {
            assert_eq!(snapshot.locked_at, start());
            assert_eq!(snapshot.modified_at, r.modified_at());
        }
        other => panic!("expected Editable, got {:?}", other),
    }
    assert!(engine.is_locked(&r.key).unwrap());
}

#[test]
fn test_begin_edit_twice_does_not_refresh() {
    let (engine, clock) = setup();
    let guard = ConcurrencyGuard::new(&engine);
    let r = story();
    guard.begin_edit(&r, "stan", false).unwrap();
    clock.advance(Duration::seconds(120));

    let session = guard.begin_edit(&r, "stan", false).unwrap();

    assert_eq!(session, EditSession::AlreadyEditing { locked_at: start() });
    assert_eq!(engine.seconds_remaining(&r.key).unwrap(), Some(480));
}

#[test]
fn test_begin_edit_on_foreign_lock_is_read_only() {
    let (engine, _clock) = setup();
    let guard = ConcurrencyGuard::new(&engine);
    let r = story();
    engine.acquire(&r, "fred", true).unwrap();

    let session = guard.begin_edit(&r, "stan", false).unwrap();
    assert_eq!(
        session,
        EditSession::LockedByOther {
            holder: "fred".to_string()
        }
    );
}
