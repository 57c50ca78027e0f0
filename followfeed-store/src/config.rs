//! Configuration management.

use crate::error::StoreError;
use crate::persistence::{DEFAULT_SETTINGS_FILE, default_config_dir};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Login username.
    #[serde(default)]
    pub username: Option<String>,
    /// Login password.
    #[serde(default, skip_serializing)]
    pub password: Option<String>,
    /// Where the cached session settings live.
    #[serde(default)]
    pub settings_path: Option<PathBuf>,
    /// Remote API settings.
    #[serde(default)]
    pub api: ApiConfig,
}

/// Remote API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the private API, ending in `/`.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// User agent sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://i.instagram.com/api/v1/".to_string()
}

fn default_user_agent() -> String {
    concat!("followfeed/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl AppConfig {
    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        default_config_dir().join("config.json")
    }

    /// Loads configuration from the default path.
    pub fn load() -> Result<Self, StoreError> {
        Self::load_from(&Self::default_path())
    }

    /// Loads configuration from a specific path.
    ///
    /// A missing file yields defaults; an unreadable or malformed one is an
    /// error.
    pub fn load_from(path: &Path) -> Result<Self, StoreError> {
        if !path.exists() {
            debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&content).map_err(|e| {
            StoreError::Config(format!("{}: {e}", path.display()))
        })?;

        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// The settings file to use, falling back to `./settings`.
    pub fn settings_path(&self) -> PathBuf {
        self.settings_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_FILE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.settings_path(), PathBuf::from("settings"));
        assert!(config.api.base_url.ends_with('/'));
        assert_eq!(config.api.timeout_secs, 30);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = AppConfig::load_from(Path::new("/nonexistent/followfeed/config.json")).unwrap();
        assert!(config.username.is_none());
    }

    #[test]
    fn test_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{ "username": "me", "password": "pw", "api": { "timeout_secs": 5 } }"#,
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.username.as_deref(), Some("me"));
        assert_eq!(config.password.as_deref(), Some("pw"));
        assert_eq!(config.api.timeout_secs, 5);
        assert_eq!(config.api.base_url, default_base_url());
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(AppConfig::load_from(&path), Err(StoreError::Config(_))));
    }

    #[test]
    fn test_password_never_serialized() {
        let config = AppConfig {
            password: Some("secret".into()),
            ..AppConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("secret"));
    }
}
