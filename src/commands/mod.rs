//! Command implementations for editlock.
//!
//! Every command except `init` resolves the workspace from the working
//! directory, loads its config and builds a file-backed [`LockEngine`].

mod acquire;
mod init;
mod list;
mod release;
mod save;
mod status;

use crate::cli::{Command, HolderArg};
use crate::config::Config;
use crate::context::{Workspace, require_initialized_workspace};
use crate::engine::LockEngine;
use crate::error::Result;
use crate::events::{Event, append_event};
use crate::identity::resolve_holder;
use crate::resource::{FileResource, file_key};
use crate::store::{FileLockStore, ResourceKey};
use std::path::Path;
use tracing::warn;

/// Dispatch a command to its implementation.
pub fn dispatch(command: Command) -> Result<()> {
    match command {
        Command::Init => init::cmd_init(),
        Command::Acquire(args) => acquire::cmd_acquire(args),
        Command::Open(args) => acquire::cmd_open(args),
        Command::Release(args) => release::cmd_release(args),
        Command::ForceRelease(args) => release::cmd_force_release(args),
        Command::Status(args) => status::cmd_status(args),
        Command::List(args) => list::cmd_list(args),
        Command::Save(args) => save::cmd_save(args),
    }
}

/// Workspace, config and engine for one command invocation.
pub(crate) struct Session {
    pub ws: Workspace,
    pub config: Config,
    pub engine: LockEngine<FileLockStore>,
}

impl Session {
    pub fn open() -> Result<Self> {
        let ws = require_initialized_workspace()?;
        let config = ws.load_config()?;
        let engine = LockEngine::with_system_clock(ws.lock_store(), &config);
        Ok(Self { ws, config, engine })
    }

    pub fn holder(&self, arg: &HolderArg) -> Result<String> {
        resolve_holder(arg.holder.as_deref(), &self.config)
    }

    /// Open an existing file as a lockable resource.
    pub fn file(&self, path: &Path) -> Result<FileResource> {
        FileResource::open(&self.ws.root, path)
    }

    /// Key for `path`, which may no longer exist.
    pub fn key(&self, path: &Path) -> Result<ResourceKey> {
        file_key(&self.ws.root, path)
    }

    /// Append to the audit log when enabled.
    ///
    /// The lock change has already happened at this point, so a failed
    /// append is reported but does not fail the command.
    pub fn record(&self, event: Event) {
        if !self.config.audit_log {
            return;
        }
        if let Err(e) = append_event(&self.ws, &event) {
            warn!(action = %event.action, error = %e, "failed to append audit event");
        }
    }
}
