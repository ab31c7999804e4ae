//! Implementation of `editlock acquire` and `editlock open`.
//!
//! Both print the snapshot as JSON on stdout so it can be redirected to a
//! file and handed back to `editlock save`. They differ on a lock the caller
//! already holds: `acquire` renews it, `open` leaves it alone.

use super::Session;
use crate::cli::{AcquireArgs, OpenArgs};
use crate::engine::LockSnapshot;
use crate::error::{EditLockError, Result};
use crate::events::{Event, EventAction};
use crate::guard::{ConcurrencyGuard, EditSession};
use crate::resource::Lockable;
use serde_json::json;
use std::path::Path;

pub fn cmd_acquire(args: AcquireArgs) -> Result<()> {
    let session = Session::open()?;
    let holder = session.holder(&args.holder)?;
    let hard = args.hard || (!args.soft && session.config.default_lock_type.is_hard());

    let snapshot = acquire(&session, &args.path, &holder, hard)?;
    println!("{}", snapshot.to_json()?);
    Ok(())
}

pub fn cmd_open(args: OpenArgs) -> Result<()> {
    let session = Session::open()?;
    let holder = session.holder(&args.holder)?;

    match open(&session, &args.path, &holder, args.hard)? {
        EditSession::Editable(snapshot) => {
            println!("{}", snapshot.to_json()?);
            Ok(())
        }
        EditSession::AlreadyEditing { locked_at } => {
            println!(
                "You are already editing {} (locked at {}). Use the snapshot from that session.",
                args.path.display(),
                locked_at.to_rfc3339()
            );
            Ok(())
        }
        EditSession::LockedByOther { holder } => Err(EditLockError::AlreadyLocked {
            key: session.key(&args.path)?,
            holder,
        }),
    }
}

pub(crate) fn acquire(
    session: &Session,
    path: &Path,
    holder: &str,
    hard: bool,
) -> Result<LockSnapshot> {
    let file = session.file(path)?;
    let snapshot = session.engine.acquire(&file, holder, hard)?;

    session.record(
        Event::new(EventAction::Acquire)
            .with_actor(holder)
            .with_resource(file.resource_key())
            .with_details(json!({
                "hard": hard,
                "locked_at": snapshot.locked_at,
            })),
    );

    Ok(snapshot)
}

pub(crate) fn open(session: &Session, path: &Path, holder: &str, hard: bool) -> Result<EditSession> {
    let file = session.file(path)?;
    let guard = ConcurrencyGuard::new(&session.engine);
    let outcome = guard.begin_edit(&file, holder, hard)?;

    if let EditSession::Editable(snapshot) = &outcome {
        session.record(
            Event::new(EventAction::Acquire)
                .with_actor(holder)
                .with_resource(file.resource_key())
                .with_details(json!({
                    "hard": hard,
                    "locked_at": snapshot.locked_at,
                    "via": "open",
                })),
        );
    }

    Ok(outcome)
}
