//! Application configuration management.
//!
//! This module handles loading and saving the application configuration,
//! which includes the GraphQL endpoint, the session storage backend, route
//! paths and the last email used to sign in.
//!
//! Configuration is stored at `~/.config/relaytodo/config.json`.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::DEFAULT_REQUEST_TIMEOUT_SECS;
use crate::auth::{FileStore, KeyValueStore, KeyringStore, MemoryStore};
use crate::nav::Routes;

/// Application name used for config/cache directory paths
const APP_NAME: &str = "relaytodo";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// GraphQL endpoint used when none is configured
pub const DEFAULT_API_URL: &str = "http://localhost:5000/graphql";

pub const ENV_API_URL: &str = "RELAYTODO_API_URL";
pub const ENV_EMAIL: &str = "RELAYTODO_EMAIL";
pub const ENV_PASSWORD: &str = "RELAYTODO_PASSWORD";

/// Where the session is kept between runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    File,
    Keyring,
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_url: String,
    pub storage: StorageBackend,
    pub routes: Routes,
    pub request_timeout_secs: u64,
    pub last_email: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            storage: StorageBackend::default(),
            routes: Routes::default(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            last_email: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            Ok(serde_json::from_str(&contents)?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    /// Apply environment overrides. `lookup` is usually `std::env::var`.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.is_empty()) {
            debug!(%url, "API URL overridden from environment");
            self.api_url = url;
        }
    }

    /// Open the configured session storage backend.
    pub fn open_store(&self) -> Result<Box<dyn KeyValueStore>> {
        let store: Box<dyn KeyValueStore> = match self.storage {
            StorageBackend::File => Box::new(FileStore::new(&self.cache_dir()?)),
            StorageBackend::Keyring => Box::new(KeyringStore::new()),
            StorageBackend::Memory => Box::new(MemoryStore::new()),
        };
        debug!(backend = ?self.storage, "Session storage opened");
        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: Config = serde_json::from_str(r#"{"storage":"keyring"}"#).unwrap();
        assert_eq!(config.storage, StorageBackend::Keyring);
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.routes, Routes::default());
        assert_eq!(config.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
    }

    #[test]
    fn test_routes_are_configurable() {
        let config: Config = serde_json::from_str(r#"{"routes":{"home":"/todos"}}"#).unwrap();
        assert_eq!(config.routes.home, "/todos");
        assert_eq!(config.routes.login, "/");
    }

    #[test]
    fn test_env_override() {
        let mut config = Config::default();
        config.apply_overrides(|key| {
            (key == ENV_API_URL).then(|| "https://todo.example.com/graphql".to_string())
        });
        assert_eq!(config.api_url, "https://todo.example.com/graphql");

        // Empty values are ignored
        config.apply_overrides(|_| Some(String::new()));
        assert_eq!(config.api_url, "https://todo.example.com/graphql");
    }

    #[test]
    fn test_memory_backend_opens_empty() {
        let config = Config {
            storage: StorageBackend::Memory,
            ..Config::default()
        };
        let store = config.open_store().unwrap();
        assert_eq!(store.get_item("@relayTodo:token"), None);
    }
}
