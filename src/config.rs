//! JSON configuration at ~/.config/creel/config.json.
//!
//! Holds the store connection string and the current user's name. A missing
//! or empty file yields `Config::default()`. The engine and dispatcher only
//! read this; `login` and `register` are the sole mutators.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("HOME environment variable not set")]
    NoHome,

    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON in config file: {0}")]
    Parse(#[from] serde_json::Error),
}

// ============================================================================
// Configuration
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Store connection string (a SQLite URL or path). Empty means the
    /// default database under the config directory.
    pub db_url: String,

    /// The identity used for authenticated commands. Empty when nobody has
    /// logged in yet; resolved against the store on each invocation.
    pub current_user_name: String,
}

/// The per-user config directory (~/.config/creel/).
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    let home = std::env::var("HOME").map_err(|_| ConfigError::NoHome)?;
    Ok(PathBuf::from(home).join(".config").join("creel"))
}

impl Config {
    /// Load configuration from a JSON file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid JSON → `Err(ConfigError::Parse)`
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Write the config back to disk, creating the parent directory if
    /// needed.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Record `name` as the current user and persist immediately.
    pub fn set_user(&mut self, name: &str, path: &Path) -> Result<(), ConfigError> {
        self.current_user_name = name.to_string();
        self.save(path)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_returns_default() {
        let path = Path::new("/tmp/creel_test_nonexistent_config.json");
        let config = Config::load(path).unwrap();
        assert!(config.db_url.is_empty());
        assert!(config.current_user_name.is_empty());
    }

    #[test]
    fn test_empty_file_returns_default() {
        let dir = std::env::temp_dir().join("creel_config_test_empty");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.json");
        std::fs::write(&path, "").unwrap();

        let config = Config::load(&path).unwrap();
        assert!(config.current_user_name.is_empty());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_round_trip() {
        let dir = std::env::temp_dir().join("creel_config_test_roundtrip");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.json");

        let config = Config {
            db_url: "sqlite:/tmp/creel.db".to_string(),
            current_user_name: "alice".to_string(),
        };
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.db_url, "sqlite:/tmp/creel.db");
        assert_eq!(loaded.current_user_name, "alice");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_set_user_persists() {
        let dir = std::env::temp_dir().join("creel_config_test_set_user");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.json");

        let mut config = Config::default();
        config.set_user("bob", &path).unwrap();
        assert_eq!(config.current_user_name, "bob");

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.current_user_name, "bob");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_save_creates_parent_dir() {
        let dir = std::env::temp_dir().join("creel_config_test_mkdir");
        std::fs::remove_dir_all(&dir).ok();
        let path = dir.join("nested").join("config.json");

        Config::default().save(&path).unwrap();
        assert!(path.exists());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_invalid_json_returns_error() {
        let dir = std::env::temp_dir().join("creel_config_test_invalid");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.json");
        std::fs::write(&path, "{not json").unwrap();

        let result = Config::load(&path);
        assert!(matches!(result.unwrap_err(), ConfigError::Parse(_)));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let dir = std::env::temp_dir().join("creel_config_test_unknown");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.json");
        std::fs::write(
            &path,
            r#"{"db_url": "x", "current_user_name": "alice", "extra": 42}"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.current_user_name, "alice");

        std::fs::remove_dir_all(&dir).ok();
    }
}
