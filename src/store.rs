//! Persistence seam for the automation settings.
//!
//! The scheduler writes its config through a [`StateStore`] so that an
//! enabled schedule survives a restart of the watch process. The file
//! store keeps a small TOML document next to the config file; the memory
//! store backs one-shot commands and tests.

use std::path::PathBuf;
use std::sync::Mutex;

use tracing::debug;

use crate::error::CopydeskError;
use crate::scheduler::AutomationConfig;

pub trait StateStore: Send + Sync {
    fn load(&self) -> Result<AutomationConfig, CopydeskError>;
    fn save(&self, config: &AutomationConfig) -> Result<(), CopydeskError>;
}

/// Keeps the automation config in a TOML file.
pub struct TomlStateStore {
    path: PathBuf,
}

impl TomlStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl StateStore for TomlStateStore {
    fn load(&self) -> Result<AutomationConfig, CopydeskError> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no saved automation state, using defaults");
            return Ok(AutomationConfig::default());
        }
        let content = std::fs::read_to_string(&self.path)?;
        let config: AutomationConfig = toml::from_str(&content)?;
        Ok(config)
    }

    fn save(&self, config: &AutomationConfig) -> Result<(), CopydeskError> {
        let content = toml::to_string_pretty(config)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

/// Keeps the automation config in memory only.
#[derive(Default)]
pub struct MemoryStateStore {
    inner: Mutex<AutomationConfig>,
}

impl MemoryStateStore {
    pub fn new(initial: AutomationConfig) -> Self {
        Self {
            inner: Mutex::new(initial),
        }
    }
}

impl StateStore for MemoryStateStore {
    fn load(&self) -> Result<AutomationConfig, CopydeskError> {
        // Recover the value even if a holder panicked.
        let guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        Ok(guard.clone())
    }

    fn save(&self, config: &AutomationConfig) -> Result<(), CopydeskError> {
        let mut guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        *guard = config.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::TempDir;

    #[test]
    fn missing_file_loads_defaults() {
        let dir = TempDir::new().unwrap();
        let store = TomlStateStore::new(dir.path().join("state.toml"));

        let config = store.load().unwrap();
        assert!(!config.enabled);
        assert_eq!(config.interval_minutes, 30);
    }

    #[test]
    fn saved_state_survives_a_new_store() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.toml");

        let config = AutomationConfig {
            enabled: true,
            interval_minutes: 15,
            last_run_at: Some(Utc::now()),
            next_run_at: None,
        };
        TomlStateStore::new(&path).save(&config).unwrap();

        // A fresh store, as after a process restart.
        let loaded = TomlStateStore::new(&path).load().unwrap();
        assert!(loaded.enabled);
        assert_eq!(loaded.interval_minutes, 15);
        assert_eq!(loaded.last_run_at, config.last_run_at);
    }

    #[test]
    fn corrupted_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.toml");
        std::fs::write(&path, "enabled = \"definitely\"").unwrap();

        let result = TomlStateStore::new(&path).load();
        assert!(matches!(result, Err(CopydeskError::Toml(_))));
    }

    #[test]
    fn memory_store_round_trips() {
        let store = MemoryStateStore::default();
        assert!(!store.load().unwrap().enabled);

        let config = AutomationConfig {
            enabled: true,
            interval_minutes: 5,
            ..Default::default()
        };
        store.save(&config).unwrap();

        let loaded = store.load().unwrap();
        assert!(loaded.enabled);
        assert_eq!(loaded.interval_minutes, 5);
    }
}
