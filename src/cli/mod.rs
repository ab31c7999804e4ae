//! CLI argument parsing for editlock.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// editlock: advisory, time-bounded edit locks for files in a shared directory.
///
/// A lock tells other editors that someone is working on a file. It expires
/// on its own after the configured window. Soft locks only warn; hard locks
/// block every guarded save until released.
#[derive(Parser, Debug)]
#[command(name = "editlock")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands for editlock.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Initialize an editlock workspace in the current directory.
    ///
    /// Creates `.editlock/`, the locks directory and a default config.yaml.
    Init,

    /// Lock a file for editing, or refresh your own lock.
    ///
    /// Prints the snapshot to hand back to `save`.
    Acquire(AcquireArgs),

    /// Open a file for editing without refreshing an existing lock.
    ///
    /// Locks the file only if nobody holds it. Reports who does otherwise.
    Open(OpenArgs),

    /// Release your own lock on a file.
    Release(ReleaseArgs),

    /// Remove locks regardless of holder.
    #[command(name = "force-release")]
    ForceRelease(ForceReleaseArgs),

    /// Show the lock state of a file.
    Status(StatusArgs),

    /// List locks in the workspace.
    List(ListArgs),

    /// Write new content to a file if your snapshot is still valid.
    ///
    /// Releases the lock after a successful write.
    Save(SaveArgs),
}

/// Holder override shared by most commands.
#[derive(Parser, Debug, Default)]
pub struct HolderArg {
    /// Lock holder identity (default: config `default_holder`, then user@HOST).
    #[arg(long)]
    pub holder: Option<String>,
}

/// Arguments for the `acquire` command.
#[derive(Parser, Debug)]
pub struct AcquireArgs {
    /// File to lock.
    pub path: PathBuf,

    /// Take a hard lock (blocks all saves until released).
    #[arg(long)]
    pub hard: bool,

    /// Take a soft lock even if config defaults to hard.
    #[arg(long, conflicts_with = "hard")]
    pub soft: bool,

    #[command(flatten)]
    pub holder: HolderArg,
}

/// Arguments for the `open` command.
#[derive(Parser, Debug)]
pub struct OpenArgs {
    /// File to open.
    pub path: PathBuf,

    /// Take a hard lock if the file is free.
    #[arg(long)]
    pub hard: bool,

    #[command(flatten)]
    pub holder: HolderArg,
}

/// Arguments for the `release` command.
#[derive(Parser, Debug)]
pub struct ReleaseArgs {
    /// File to unlock.
    pub path: PathBuf,

    #[command(flatten)]
    pub holder: HolderArg,
}

/// Arguments for the `force-release` command.
#[derive(Parser, Debug)]
pub struct ForceReleaseArgs {
    /// Files to unlock.
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
}

/// Arguments for the `status` command.
#[derive(Parser, Debug)]
pub struct StatusArgs {
    /// File to inspect.
    pub path: PathBuf,

    /// Emit JSON (status plus client timer settings).
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub holder: HolderArg,
}

/// Arguments for the `list` command.
#[derive(Parser, Debug, Default)]
pub struct ListArgs {
    /// Include expired records.
    #[arg(long)]
    pub all: bool,

    /// Only this resource type.
    #[arg(long = "type", value_name = "TYPE")]
    pub resource_type: Option<String>,

    /// Only resource ids matching this glob (e.g. `docs/**/*.md`).
    #[arg(long)]
    pub glob: Option<String>,

    /// Emit JSON.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `save` command.
#[derive(Parser, Debug)]
pub struct SaveArgs {
    /// File to write.
    pub path: PathBuf,

    /// Snapshot JSON printed by `acquire` or `open`.
    #[arg(long)]
    pub snapshot: PathBuf,

    /// File holding the new content.
    #[arg(long)]
    pub content: PathBuf,

    #[command(flatten)]
    pub holder: HolderArg,
}

impl Cli {
    /// Parse command line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
