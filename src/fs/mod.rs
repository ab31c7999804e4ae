//! Filesystem utilities for editlock.
//!
//! Lock records and saved resource content are both written atomically so a
//! crash never leaves a half-written file behind.

pub mod atomic;

pub use atomic::atomic_write;
