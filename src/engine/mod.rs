//! Lock lifecycle engine.
//!
//! Each resource is in one of three states: `Unlocked`, `LockedSoft` or
//! `LockedHard`. Transitions:
//!
//! - `acquire`: Unlocked -> Locked, or renewal by the current holder
//! - `release`: any -> Unlocked (administrative override)
//! - `release_for`: Locked -> Unlocked, only for the active holder
//! - time: Locked -> Unlocked once `expiration_window` elapses
//!
//! Expiry is computed whenever a record is read. Nothing sweeps expired
//! records; they linger until the next acquisition overwrites them or a
//! release deletes them.

mod operations;
mod types;


pub use operations::LockEngine;
pub use types::{ClientSettings, LockSnapshot, LockState, LockStatus, LockType};
