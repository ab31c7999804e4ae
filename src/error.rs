//! Error types for editlock.
//!
//! Every domain condition is a distinct variant so callers can render a
//! specific message or map it onto their transport's status codes.

use crate::exit_codes;
use crate::guard::SaveRejection;
use crate::store::ResourceKey;
use thiserror::Error;

/// Main error type for editlock operations.
#[derive(Error, Debug)]
pub enum EditLockError {
    /// Acquisition attempted while a different holder has an active lock.
    #[error("{key} is already locked by {holder}")]
    AlreadyLocked { key: ResourceKey, holder: String },

    /// Release attempted by someone who does not hold the active lock.
    #[error("{key} is not locked by {holder}")]
    NotHolder { key: ResourceKey, holder: String },

    /// A physical write was attempted while a hard lock is active.
    #[error(
        "{key} has a hard lock held by {holder}; the holder must release it before saving"
    )]
    HardLocked { key: ResourceKey, holder: String },

    /// The concurrency guard refused the save.
    #[error("Save rejected: {0}")]
    SaveRejected(SaveRejection),

    /// The lock store could not be read or written.
    #[error("Lock store failure: {0}")]
    StoreError(String),

    /// Configuration could not be loaded or failed validation.
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// User provided invalid arguments or the workspace is in an invalid state.
    #[error("{0}")]
    UserError(String),
}

impl EditLockError {
    /// Returns the CLI exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            EditLockError::AlreadyLocked { .. }
            | EditLockError::NotHolder { .. }
            | EditLockError::HardLocked { .. } => exit_codes::LOCK_CONFLICT,
            EditLockError::SaveRejected(_) => exit_codes::SAVE_REJECTED,
            EditLockError::StoreError(_) => exit_codes::STORE_FAILURE,
            EditLockError::ConfigError(_) | EditLockError::UserError(_) => exit_codes::USER_ERROR,
        }
    }

    /// Returns the HTTP-equivalent status a transport layer should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            EditLockError::AlreadyLocked { .. } => 409,
            EditLockError::NotHolder { .. } => 403,
            EditLockError::HardLocked { .. } => 423,
            EditLockError::SaveRejected(_) => 409,
            EditLockError::StoreError(_) => 503,
            EditLockError::ConfigError(_) | EditLockError::UserError(_) => 400,
        }
    }
}

/// Result type alias for editlock operations.
pub type Result<T> = std::result::Result<T, EditLockError>;
