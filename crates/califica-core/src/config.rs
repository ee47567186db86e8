//! Client configuration management.
//!
//! Holds the API base URL, where the session is stored, and the login
//! contract. Configuration is stored at `~/.config/califica/config.json`;
//! `CALIFICA_API_URL` overrides the stored base URL.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::auth::{DurableStorage, FileStorage, KeyringStorage, MemoryStorage};

/// Application name used for config/data directory paths
const APP_NAME: &str = "califica";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment variable overriding the API base URL
pub const API_URL_ENV: &str = "CALIFICA_API_URL";

pub const DEFAULT_API_URL: &str = "http://localhost:3000/api";

/// HTTP request timeout in seconds.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// What a login response must contain before the session is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoginPolicy {
    /// The response must carry a token and `emailVerified: true`.
    #[default]
    RequireVerifiedEmail,
    /// Any response carrying a token is accepted.
    AcceptToken,
}

/// Where the session snapshot and token key are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    #[default]
    File,
    Keyring,
    /// Nothing persists across runs.
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default)]
    pub login_policy: LoginPolicy,
    #[serde(default)]
    pub storage: StorageBackend,
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    #[serde(default)]
    pub last_email: Option<String>,
    /// Given on the command line for this run only; never saved.
    #[serde(skip)]
    pub api_url_override: Option<String>,
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

    pub fn data_dir(&self) -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }

    /// Base URL without a trailing slash: command line, env override, then
    /// config, then default.
    pub fn api_url(&self) -> String {
        self.api_url_override
            .clone()
            .or_else(|| std::env::var(API_URL_ENV).ok())
            .filter(|s| !s.trim().is_empty())
            .or_else(|| self.api_url.clone())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
            .trim_end_matches('/')
            .to_string()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS))
    }

    /// Open the storage backend selected in the config.
    pub fn open_storage(&self) -> Result<Arc<dyn DurableStorage>> {
        Ok(match self.storage {
            StorageBackend::File => Arc::new(FileStorage::new(self.data_dir()?)),
            StorageBackend::Keyring => Arc::new(KeyringStorage::new()),
            StorageBackend::Memory => Arc::new(MemoryStorage::new()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_file() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.login_policy, LoginPolicy::RequireVerifiedEmail);
        assert_eq!(config.storage, StorageBackend::File);
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_parse_settings() {
        let config: Config = serde_json::from_str(
            r#"{"api_url":"https://api.example.edu/api/","login_policy":"accept_token","storage":"keyring","request_timeout_secs":5}"#,
        )
        .unwrap();
        assert_eq!(config.login_policy, LoginPolicy::AcceptToken);
        assert_eq!(config.storage, StorageBackend::Keyring);
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
        if std::env::var(API_URL_ENV).is_err() {
            assert_eq!(config.api_url(), "https://api.example.edu/api");
        }
    }

    #[test]
    fn test_command_line_url_wins_and_is_not_saved() {
        let mut config: Config =
            serde_json::from_str(r#"{"api_url":"https://stored.example.edu/api"}"#).unwrap();
        config.api_url_override = Some("http://127.0.0.1:4000/api/".to_string());
        assert_eq!(config.api_url(), "http://127.0.0.1:4000/api");

        let saved = serde_json::to_value(&config).unwrap();
        assert_eq!(saved["api_url"], "https://stored.example.edu/api");
        assert!(saved.get("api_url_override").is_none());
    }
}
