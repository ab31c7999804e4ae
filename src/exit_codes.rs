//! Exit code constants for the editlock CLI.
//!
//! - 0: Success
//! - 1: User error (bad args, invalid config, missing workspace)
//! - 2: Save rejected by the concurrency guard
//! - 3: Lock store failure
//! - 4: Lock conflict (already locked, not the holder, hard lock in place)

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments, invalid configuration, or missing workspace.
pub const USER_ERROR: i32 = 1;

/// Save rejected: the client's snapshot no longer matches the lock state.
pub const SAVE_REJECTED: i32 = 2;

/// Lock store failure: the backing store could not be read or written.
pub const STORE_FAILURE: i32 = 3;

/// Lock conflict: another holder has the lock, or the caller does not hold it.
pub const LOCK_CONFLICT: i32 = 4;
