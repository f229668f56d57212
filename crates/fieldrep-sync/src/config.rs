//! # Local Configuration
//!
//! Local settings for the pull tools. The server path itself lives in the
//! settings row of the database; this file only bootstraps local concerns.
//!
//! Later sources win:
//! 1. built-in defaults
//! 2. `fieldrep.toml` in the platform config dir
//!    (`~/.config/fieldrep/fieldrep.toml` on Linux)
//! 3. `FIELDREP_DB_PATH`, `FIELDREP_BASE_URL`, `FIELDREP_CONNECT_TIMEOUT`,
//!    `FIELDREP_READ_TIMEOUT`, `FIELDREP_SALESREP`
//!
//! ## Configuration File Format
//! ```toml
//! [database]
//! path = "fieldrep.db"
//!
//! [http]
//! connect_timeout_secs = 5
//! read_timeout_secs = 15
//! base_url = "https://sync.example.com"   # optional, overrides settings.http
//!
//! [rep]
//! code = "R7"
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{SyncError, SyncResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("fieldrep.db")
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: default_db_path(),
        }
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpSettings {
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_read_timeout")]
    pub read_timeout_secs: u64,

    /// Replaces the server base from the settings row when set.
    #[serde(default)]
    pub base_url: Option<String>,
}

fn default_connect_timeout() -> u64 {
    5
}

fn default_read_timeout() -> u64 {
    15
}

impl Default for HttpSettings {
    fn default() -> Self {
        HttpSettings {
            connect_timeout_secs: default_connect_timeout(),
            read_timeout_secs: default_read_timeout(),
            base_url: None,
        }
    }
}

impl HttpSettings {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }
}

/// The sales rep this installation belongs to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepSettings {
    /// Rep code customer pulls are filtered by.
    #[serde(default)]
    pub code: Option<String>,
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete local configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub http: HttpSettings,

    #[serde(default)]
    pub rep: RepSettings,
}

impl SyncConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults, then the file (when present), then the environment; the
    /// result is validated.
    pub fn load(config_path: Option<PathBuf>) -> SyncResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load config: {}. Using defaults.", e);
            Self::default()
        })
    }

    pub fn save(&self, config_path: Option<PathBuf>) -> SyncResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| SyncError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Config saved");
        Ok(())
    }

    pub fn validate(&self) -> SyncResult<()> {
        if self.http.connect_timeout_secs == 0 || self.http.read_timeout_secs == 0 {
            return Err(SyncError::InvalidConfig(
                "HTTP timeouts must be greater than 0".into(),
            ));
        }

        if let Some(ref url) = self.http.base_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(SyncError::InvalidUrl(format!(
                    "Base URL must start with http:// or https://, got: {}",
                    url
                )));
            }
        }

        if self.database.path.as_os_str().is_empty() {
            return Err(SyncError::InvalidConfig("database path is empty".into()));
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var("FIELDREP_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = PathBuf::from(path);
        }

        if let Ok(url) = std::env::var("FIELDREP_BASE_URL") {
            debug!(url = %url, "Overriding base URL from environment");
            self.http.base_url = Some(url);
        }

        if let Ok(secs) = std::env::var("FIELDREP_CONNECT_TIMEOUT") {
            match secs.parse::<u64>() {
                Ok(s) => self.http.connect_timeout_secs = s,
                Err(_) => warn!(value = %secs, "Ignoring non-numeric FIELDREP_CONNECT_TIMEOUT"),
            }
        }

        if let Ok(secs) = std::env::var("FIELDREP_READ_TIMEOUT") {
            match secs.parse::<u64>() {
                Ok(s) => self.http.read_timeout_secs = s,
                Err(_) => warn!(value = %secs, "Ignoring non-numeric FIELDREP_READ_TIMEOUT"),
            }
        }

        if let Ok(code) = std::env::var("FIELDREP_SALESREP") {
            self.rep.code = Some(code);
        }
    }

    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "fieldrep", "fieldrep")
            .map(|dirs| dirs.config_dir().join("fieldrep.toml"))
    }

    pub fn salesrep(&self) -> Option<&str> {
        self.rep.code.as_deref().filter(|code| !code.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SyncConfig::default();
        assert_eq!(config.database.path, PathBuf::from("fieldrep.db"));
        assert_eq!(config.http.connect_timeout(), Duration::from_secs(5));
        assert_eq!(config.http.read_timeout(), Duration::from_secs(15));
        assert!(config.salesrep().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = SyncConfig::default();

        config.http.read_timeout_secs = 0;
        assert!(matches!(config.validate(), Err(SyncError::InvalidConfig(_))));

        config.http.read_timeout_secs = 15;
        config.http.base_url = Some("ftp://sync.example.com".to_string());
        assert!(matches!(config.validate(), Err(SyncError::InvalidUrl(_))));

        config.http.base_url = Some("https://sync.example.com".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: SyncConfig = toml::from_str("[rep]\ncode = \"R7\"\n").unwrap();
        assert_eq!(config.salesrep(), Some("R7"));
        assert_eq!(config.http, HttpSettings::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("fieldrep.toml");

        let mut config = SyncConfig::default();
        config.http.base_url = Some("https://sync.example.com".to_string());
        config.rep.code = Some("R7".to_string());
        config.save(Some(path.clone())).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("[http]"));

        let loaded: SyncConfig = toml::from_str(&contents).unwrap();
        assert_eq!(loaded.http.base_url.as_deref(), Some("https://sync.example.com"));
        assert_eq!(loaded.salesrep(), Some("R7"));
    }

    #[test]
    fn test_unreadable_file_is_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fieldrep.toml");
        std::fs::write(&path, "[http\nbroken").unwrap();

        assert!(matches!(
            SyncConfig::load(Some(path.clone())),
            Err(SyncError::ConfigLoadFailed(_))
        ));
        assert_eq!(SyncConfig::load_or_default(Some(path)).http, HttpSettings::default());
    }
}
