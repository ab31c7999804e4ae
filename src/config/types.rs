//! Default values for config fields.

/// Seconds after which an unrenewed lock is treated as absent.
pub const DEFAULT_EXPIRATION_WINDOW_SECONDS: u32 = 600;

/// Seconds of lock age after which clients should warn about expiry.
pub const DEFAULT_WARNING_WINDOW_SECONDS: u32 = 540;

// Default value functions for serde
pub(crate) fn default_expiration_window_seconds() -> u32 {
    DEFAULT_EXPIRATION_WINDOW_SECONDS
}
pub(crate) fn default_warning_window_seconds() -> u32 {
    DEFAULT_WARNING_WINDOW_SECONDS
}
pub(crate) fn default_true() -> bool {
    true
}
