//! Implementation of the `editlock init` command.
//!
//! Creates `.editlock/`, `.editlock/locks/` and a default `config.yaml` in
//! the current directory. Idempotent: an existing config is left alone.

use crate::config::Config;
use crate::context::Workspace;
use crate::error::{EditLockError, Result};
use crate::events::{Event, EventAction, append_event};
use crate::fs::atomic_write;
use serde_json::json;
use std::fs;

pub fn cmd_init() -> Result<()> {
    let cwd = std::env::current_dir().map_err(|e| {
        EditLockError::UserError(format!("failed to get current working directory: {}", e))
    })?;
    let ws = Workspace::at(&cwd)?;
    let created = init_workspace(&ws)?;

    if created {
        println!("Initialized editlock workspace.");
    } else {
        println!("editlock workspace already initialized.");
    }
    println!();
    println!("State directory: {}", ws.state_dir.display());
    println!("Config:          {}", ws.config_path().display());

    Ok(())
}

/// Create the state layout. Returns whether the config file was new.
pub(crate) fn init_workspace(ws: &Workspace) -> Result<bool> {
    fs::create_dir_all(&ws.locks_dir).map_err(|e| {
        EditLockError::UserError(format!(
            "failed to create '{}': {}",
            ws.locks_dir.display(),
            e
        ))
    })?;

    let config_path = ws.config_path();
    if config_path.exists() {
        // Fail early on a config that later commands would reject.
        Config::load(&config_path)?;
        return Ok(false);
    }

    let config = Config::default();
    atomic_write(&config_path, config.to_yaml()?.as_bytes())?;

    if config.audit_log {
        append_event(
            ws,
            &Event::new(EventAction::Init).with_details(json!({
                "expiration_window_seconds": config.expiration_window_seconds,
            })),
        )?;
    }

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::read_events;
    use crate::test_support::DirGuard;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    fn test_init_creates_layout() {
        let temp_dir = TempDir::new().unwrap();
        let ws = Workspace::at(temp_dir.path()).unwrap();

        assert!(init_workspace(&ws).unwrap());

        assert!(ws.locks_dir.is_dir());
        assert_eq!(Config::load(ws.config_path()).unwrap(), Config::default());
        let events = read_events(&ws).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].action, EventAction::Init);
    }

    #[test]
    fn test_init_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let ws = Workspace::at(temp_dir.path()).unwrap();
        init_workspace(&ws).unwrap();
        fs::write(ws.config_path(), "expiration_window_seconds: 60\nwarning_window_seconds: 30\n")
            .unwrap();

        assert!(!init_workspace(&ws).unwrap());

        let config = Config::load(ws.config_path()).unwrap();
        assert_eq!(config.expiration_window_seconds, 60);
        assert_eq!(read_events(&ws).unwrap().len(), 1);
    }

    #[test]
    fn test_init_rejects_invalid_existing_config() {
        let temp_dir = TempDir::new().unwrap();
        let ws = Workspace::at(temp_dir.path()).unwrap();
        init_workspace(&ws).unwrap();
        fs::write(ws.config_path(), "expiration_window_seconds: 0\n").unwrap();

        let err = init_workspace(&ws).unwrap_err();
        assert!(matches!(err, EditLockError::ConfigError(_)));
    }

    #[test]
    #[serial]
    fn test_cmd_init_in_cwd() {
        let temp_dir = TempDir::new().unwrap();
        let _guard = DirGuard::new(temp_dir.path());

        cmd_init().unwrap();

        assert!(temp_dir.path().join(".editlock/locks").is_dir());
        assert!(Workspace::resolve_from(temp_dir.path()).is_ok());
    }
}
