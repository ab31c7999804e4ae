//! Advisory, time-bounded edit locks.
//!
//! A [`LockEngine`](engine::LockEngine) hands out soft or hard locks on any
//! [`Lockable`](resource::Lockable) resource. Locks expire on their own after
//! a configurable window; nothing sweeps them, expiry is computed on read.
//! The [`ConcurrencyGuard`](guard::ConcurrencyGuard) checks a client's
//! [`LockSnapshot`](engine::LockSnapshot) at save time so a stale editor
//! cannot overwrite someone else's work.
//!
//! ```
//! use editlock::config::Config;
//! use editlock::engine::LockEngine;
//! use editlock::guard::{ConcurrencyGuard, SaveOutcome};
//! use editlock::resource::Resource;
//! use editlock::store::{MemoryLockStore, ResourceKey};
//! use chrono::Utc;
//!
//! let engine = LockEngine::with_system_clock(MemoryLockStore::new(), &Config::default());
//! let story = Resource::new(ResourceKey::new("story", "42"), Utc::now());
//!
//! let snapshot = engine.acquire(&story, "alice", false)?;
//! assert!(engine.applies_to(&story.key, "bob")?);
//!
//! let guard = ConcurrencyGuard::new(&engine);
//! let outcome = guard.check_before_save(&story, "alice", &snapshot)?;
//! assert_eq!(outcome, SaveOutcome::ProceedAndUnlock);
//! # Ok::<(), editlock::error::EditLockError>(())
//! ```

pub mod cli;
pub mod clock;
pub mod commands;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod events;
pub mod exit_codes;
pub mod fs;
pub mod guard;
pub mod identity;
pub mod resource;
pub mod store;

#[cfg(test)]
mod test_support;
