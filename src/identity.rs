//! Holder identity.
//!
//! Locks are held by an opaque string. From the command line that string is
//! `user@HOST` unless overridden by `--holder` or `default_holder` in config.

use crate::config::Config;
use crate::error::{EditLockError, Result};

/// `user@HOST` for the current process, with `unknown` for missing parts.
pub fn local_identity() -> String {
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string());

    let host = hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    format!("{}@{}", user, host)
}

/// Pick the holder for a command: explicit flag, then config, then `user@HOST`.
pub fn resolve_holder(explicit: Option<&str>, config: &Config) -> Result<String> {
    match explicit {
        Some(h) if h.trim().is_empty() => Err(EditLockError::UserError(
            "holder must not be empty".to_string(),
        )),
        Some(h) => Ok(h.to_string()),
        None => Ok(config
            .default_holder
            .clone()
            .unwrap_or_else(local_identity)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_identity_has_user_and_host() {
        let id = local_identity();
        let (user, host) = id.split_once('@').unwrap();
        assert!(!user.is_empty());
        assert!(!host.is_empty());
    }

    #[test]
    fn test_explicit_holder_wins() {
        let config = Config {
            default_holder: Some("build-bot".to_string()),
            ..Config::default()
        };
        assert_eq!(resolve_holder(Some("alice"), &config).unwrap(), "alice");
    }

    #[test]
    fn test_config_default_holder() {
        let config = Config {
            default_holder: Some("build-bot".to_string()),
            ..Config::default()
        };
        assert_eq!(resolve_holder(None, &config).unwrap(), "build-bot");
    }

    #[test]
    fn test_falls_back_to_local_identity() {
        let holder = resolve_holder(None, &Config::default()).unwrap();
        assert_eq!(holder, local_identity());
    }

    #[test]
    fn test_blank_holder_rejected() {
        let err = resolve_holder(Some("  "), &Config::default()).unwrap_err();
        assert!(matches!(err, EditLockError::UserError(_)));
    }
}
