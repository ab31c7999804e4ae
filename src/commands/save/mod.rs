//! Implementation of the `editlock save` command.
//!
//! Runs the guarded save flow for a file: the snapshot from `acquire` or
//! `open` is checked against the current lock and the file's mtime, and the
//! new content is written atomically only if the check passes.
//!
//! # Outcomes
//!
//! - Snapshot still current: write, then release the lock.
//! - Lock lapsed but file untouched: relock, write, release.
//! - Anything else: nothing is written, exit code 2, reason on stderr.
//! - Hard lock held by the saver: released before the write.

use super::Session;
use crate::cli::SaveArgs;
use crate::engine::LockSnapshot;
use crate::error::{EditLockError, Result};
use crate::events::{Event, EventAction};
use crate::guard::ConcurrencyGuard;
use crate::resource::Lockable;
use crate::store::ResourceKey;
use serde_json::json;
use std::fs;
use std::path::Path;


pub fn cmd_save(args: SaveArgs) -> Result<()> {
    let session = Session::open()?;
    let holder = session.holder(&args.holder)?;
    let snapshot = LockSnapshot::from_file(&args.snapshot)?;
    let content = fs::read(&args.content).map_err(|e| {
        EditLockError::UserError(format!(
            "failed to read content file '{}': {}",
            args.content.display(),
            e
        ))
    })?;

    let key = save(&session, &args.path, &holder, &snapshot, &content)?;
    println!("Saved {} and released the lock.", key);
    Ok(())
}

/// Check `snapshot` and, if allowed, replace the file at `path` with `content`.
pub(crate) fn save(
    session: &Session,
    path: &Path,
    holder: &str,
    snapshot: &LockSnapshot,
    content: &[u8],
) -> Result<ResourceKey> {
    let file = session.file(path)?;
    let key = file.resource_key();
    let guard = ConcurrencyGuard::new(&session.engine);

    let mut target = file.clone();
    let result = guard.save(&file, holder, snapshot, || target.write(content));

    match result {
        Ok(()) => {
            session.record(
                Event::new(EventAction::Save)
                    .with_actor(holder)
                    .with_resource(&key)
                    .with_details(json!({
                        "bytes": content.len(),
                        "snapshot_locked_at": snapshot.locked_at,
                    })),
            );
            Ok(key)
        }
        Err(EditLockError::SaveRejected(rejection)) => {
            session.record(
                Event::new(EventAction::SaveRejected)
                    .with_actor(holder)
                    .with_resource(&key)
                    .with_details(json!({
                        "code": rejection.code(),
                        "rejection": rejection,
                    })),
            );
            Err(EditLockError::SaveRejected(rejection))
        }
        Err(e) => Err(e),
    }
}
