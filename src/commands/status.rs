//! Implementation of the `editlock status` command.
//!
//! Human output is the one-line summary plus warnings; `--json` prints the
//! status together with the client timer settings, for editors that want to
//! show their own countdown.

use super::Session;
use crate::cli::StatusArgs;
use crate::engine::{ClientSettings, LockStatus};
use crate::error::{EditLockError, Result};
use serde::Serialize;
use std::path::Path;

/// JSON shape of `status --json`.
#[derive(Debug, Serialize)]
pub(crate) struct StatusReport {
    #[serde(flatten)]
    pub status: LockStatus,
    pub settings: ClientSettings,
}

pub fn cmd_status(args: StatusArgs) -> Result<()> {
    let session = Session::open()?;
    let holder = session.holder(&args.holder)?;
    let report = status(&session, &args.path, &holder)?;

    if args.json {
        let json = serde_json::to_string_pretty(&report).map_err(|e| {
            EditLockError::UserError(format!("failed to serialize status: {}", e))
        })?;
        println!("{}", json);
        return Ok(());
    }

    println!("{}", report.status.summary());
    if report.status.is_locked && report.status.expiring_soon {
        println!("The lock expires soon.");
    }
    if report.status.applies {
        println!("Saving now would be rejected unless the lock is released or expires.");
    }
    Ok(())
}

pub(crate) fn status(session: &Session, path: &Path, viewer: &str) -> Result<StatusReport> {
    let key = session.key(path)?;
    Ok(StatusReport {
        status: session.engine.status(&key, Some(viewer))?,
        settings: session.engine.client_settings(),
    })
}
