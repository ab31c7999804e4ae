//! Optimistic-concurrency guard for saves.
//!
//! A client that acquired a lock holds a [`LockSnapshot`](crate::engine::LockSnapshot).
//! When it saves, the guard compares that snapshot with the current lock and
//! the resource's modification time:
//!
//! | lock state              | snapshot matches      | outcome                   |
//! |-------------------------|-----------------------|---------------------------|
//! | unlocked                | `modified_at` equal   | `ProceedAndRelock`        |
//! | unlocked                | `modified_at` differs | reject: stale & modified  |
//! | locked by someone else  | n/a                   | reject: locked by other   |
//! | locked by saver         | `locked_at` differs   | reject: self conflict     |
//! | locked by saver         | `locked_at` equal     | `ProceedAndUnlock`        |
//!
//! Independently, [`ConcurrencyGuard::ensure_writable`] blocks every write
//! while a hard lock is active.

mod operations;
mod types;

#[cfg(test)]
mod tests;

pub use operations::ConcurrencyGuard;
pub use types::{EditSession, SaveOutcome, SaveRejection};
