//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Player defaults used for new and reset games
//! - Storage backend and namespace
//! - Dashboard sizing
//! - Log level
//!
//! Configuration is stored at `~/.config/levelup/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::{data_dir, DEFAULT_NAMESPACE};
use crate::error::ConfigError;
use crate::game::{PlayerDefaults, DEFAULT_MAX_HP, DEFAULT_USER_NAME};

const CONFIG_FILE_NAME: &str = "config.toml";

/// Player defaults applied by new games and `reset`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerConfig {
    #[serde(default = "default_user_name")]
    pub default_name: String,
    #[serde(default = "default_max_hp")]
    pub max_hp: u32,
}

/// Which [`StateStorage`](super::StateStorage) implementation to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Sqlite,
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_backend")]
    pub backend: StorageBackend,
    /// Key the state blob is stored under
    #[serde(default = "default_namespace")]
    pub namespace: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_active_quest_limit")]
    pub active_quest_limit: usize,
    /// Minimum radar chart scale
    #[serde(default = "default_chart_min_scale")]
    pub chart_min_scale: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    /// `tracing` filter directive used when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// Application configuration.
///
/// Serialized to/from TOML at `<data_dir>/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub player: PlayerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
    #[serde(default)]
    pub log: LogConfig,
}

// Default functions
fn default_user_name() -> String {
    DEFAULT_USER_NAME.to_string()
}
fn default_max_hp() -> u32 {
    DEFAULT_MAX_HP
}
fn default_backend() -> StorageBackend {
    StorageBackend::Sqlite
}
fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}
fn default_active_quest_limit() -> usize {
    3
}
fn default_chart_min_scale() -> u32 {
    10
}
fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            default_name: default_user_name(),
            max_hp: default_max_hp(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            namespace: default_namespace(),
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            active_quest_limit: default_active_quest_limit(),
            chart_min_scale: default_chart_min_scale(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value
                            .parse::<bool>()
                            .map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        let n = value
                            .parse::<u64>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?;
                        serde_json::Value::Number(n.into())
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        return Err(invalid("cannot set a whole section".to_string()));
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    /// Path of the config file inside `dir`.
    pub fn path_in(dir: &Path) -> PathBuf {
        dir.join(CONFIG_FILE_NAME)
    }

    /// Load from the default data directory, writing defaults if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory is unavailable or the file
    /// exists but cannot be parsed.
    pub fn load() -> Result<Self, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("<data dir>"),
            message: e.to_string(),
        })?;
        Self::load_from(&dir)
    }

    /// Load `config.toml` from `dir`, writing defaults if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed,
    /// or if the default config cannot be written.
    pub fn load_from(dir: &Path) -> Result<Self, ConfigError> {
        let path = Self::path_in(dir);
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content)?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(dir)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path,
                message: e.to_string(),
            }),
        }
    }

    /// Load from `dir`, falling back to defaults if the file is unreadable.
    ///
    /// Never fails; the broken file is left on disk untouched.
    pub fn load_or_default(dir: &Path) -> Self {
        Self::load_from(dir).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "ignoring unreadable config, using defaults");
            Self::default()
        })
    }

    /// Persist to `dir/config.toml`.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save_to(&self, dir: &Path) -> Result<(), ConfigError> {
        let path = Self::path_in(dir);
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, content).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Object(_) => None,
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key. Does not write to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value does not fit the
    /// field's type.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self)
            .map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config =
            serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Reject values that would break store invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.player.max_hp == 0 {
            return Err(ConfigError::InvalidValue {
                key: "player.max_hp".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.storage.namespace.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "storage.namespace".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Player defaults for the progression store.
    pub fn player_defaults(&self) -> PlayerDefaults {
        PlayerDefaults {
            user_name: self.player.default_name.clone(),
            max_hp: self.player.max_hp,
        }
    }
}
