//! TOML-based configuration.
//!
//! Stores reflow tuning:
//! - Compression floor for flexible blocks
//! - Overlap resolution priority
//!
//! Configuration is stored at `~/.config/magnetline/config.toml`. Set
//! `MAGNETLINE_CONFIG_DIR` to use another directory.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::timeline::{DAY_MINUTES, MIN_FLEXIBLE_MINUTES};

/// Order in which overlap resolution tries its remedies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlapPriority {
    /// Compress the earlier block, then push the later one, then trim the
    /// later block's head.
    #[default]
    CompressFirst,
    /// Push the later block first, then compress the earlier one, then trim
    /// the later block's head.
    ShiftFirst,
}

/// Reflow tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReflowConfig {
    /// Flexible blocks are never compressed below this many minutes
    #[serde(default = "default_min_flexible_minutes")]
    pub min_flexible_minutes: i64,
    #[serde(default)]
    pub overlap_priority: OverlapPriority,
}

fn default_min_flexible_minutes() -> i64 {
    MIN_FLEXIBLE_MINUTES
}

impl Default for ReflowConfig {
    fn default() -> Self {
        Self {
            min_flexible_minutes: default_min_flexible_minutes(),
            overlap_priority: OverlapPriority::default(),
        }
    }
}

impl ReflowConfig {
    /// Check that the floor leaves room for a block inside one day.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_flexible_minutes < 1 || self.min_flexible_minutes >= DAY_MINUTES {
            return Err(ConfigError::InvalidValue {
                key: "reflow.min_flexible_minutes".into(),
                message: format!(
                    "{} is outside 1..{}",
                    self.min_flexible_minutes, DAY_MINUTES
                ),
            });
        }
        Ok(())
    }
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/magnetline/config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub reflow: ReflowConfig,
}

/// Returns `~/.config/magnetline/`, or `MAGNETLINE_CONFIG_DIR` when set.
pub fn config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("MAGNETLINE_CONFIG_DIR") {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("magnetline")
}

impl Config {
    /// Location of the config file.
    pub fn path() -> PathBuf {
        config_dir().join("config.toml")
    }

    /// Load from the default location, falling back to defaults when the
    /// file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed, or
    /// holds out-of-range values.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path();
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let cfg: Config = toml::from_str(&content)?;
        cfg.reflow.validate()?;
        Ok(cfg)
    }

    /// Persist to the default location, creating the directory if needed.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path())
    }

    /// Persist to an explicit path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| save_failed(e.to_string()))?;
        }
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Load from disk, returning default on error.
    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(cfg) => cfg,
            Err(err) => {
                tracing::warn!(error = %err, "falling back to default configuration");
                Self::default()
            }
        }
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key. Does not persist.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value does not parse
    /// into the field's type or range.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };
        let mut json = serde_json::to_value(&*self).map_err(|e| invalid(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| invalid(e.to_string()))?;
        updated.reflow.validate()?;
        *self = updated;
        Ok(())
    }

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

        if key.is_empty() {
            return Err(unknown());
        }
        let parts: Vec<&str> = key.split('.').collect();
        let Some((leaf, path)) = parts.split_last() else {
            return Err(unknown());
        };

        let mut current = root;
        for part in path {
            current = current.get_mut(*part).ok_or_else(unknown)?;
        }
        let obj = current.as_object_mut().ok_or_else(unknown)?;

        let existing = obj.get(*leaf).ok_or_else(unknown)?;
        let new_value = match existing {
            serde_json::Value::Bool(_) => serde_json::Value::Bool(
                value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
            ),
            serde_json::Value::Number(_) => serde_json::Value::Number(
                value
                    .parse::<i64>()
                    .map_err(|_| invalid(format!("cannot parse '{value}' as integer")))?
                    .into(),
            ),
            serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
            }
            _ => serde_json::Value::String(value.into()),
        };
        obj.insert(leaf.to_string(), new_value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.reflow.min_flexible_minutes, 15);
        assert_eq!(parsed.reflow.overlap_priority, OverlapPriority::CompressFirst);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let parsed: Config =
            toml::from_str("[reflow]\noverlap_priority = \"shift_first\"\n").unwrap();
        assert_eq!(parsed.reflow.min_flexible_minutes, 15);
        assert_eq!(parsed.reflow.overlap_priority, OverlapPriority::ShiftFirst);

        let empty: Config = toml::from_str("").unwrap();
        assert_eq!(empty, Config::default());
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("reflow.min_flexible_minutes").as_deref(), Some("15"));
        assert_eq!(cfg.get("reflow.overlap_priority").as_deref(), Some("compress_first"));
        assert!(cfg.get("reflow.missing_key").is_none());
        assert!(cfg.get("").is_none());
    }

    #[test]
    fn set_updates_values() {
        let mut cfg = Config::default();
        cfg.set("reflow.min_flexible_minutes", "20").unwrap();
        cfg.set("reflow.overlap_priority", "shift_first").unwrap();
        assert_eq!(cfg.reflow.min_flexible_minutes, 20);
        assert_eq!(cfg.reflow.overlap_priority, OverlapPriority::ShiftFirst);
    }

    #[test]
    fn set_rejects_unknown_key_and_bad_values() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.set("reflow.nonexistent_key", "1"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(cfg.set("reflow.min_flexible_minutes", "abc").is_err());
        assert!(cfg.set("reflow.min_flexible_minutes", "0").is_err());
        assert!(cfg.set("reflow.overlap_priority", "sideways").is_err());
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn set_walks_nested_paths() {
        let mut cfg = Config::default();
        cfg.set("reflow", r#"{"min_flexible_minutes": 30}"#).unwrap();
        assert_eq!(cfg.reflow.min_flexible_minutes, 30);
        assert_eq!(cfg.reflow.overlap_priority, OverlapPriority::CompressFirst);

        for key in ["", "nope.min_flexible_minutes", "reflow.min_flexible_minutes.deeper"] {
            assert!(
                matches!(cfg.set(key, "1"), Err(ConfigError::UnknownKey(_))),
                "key {key:?} should be unknown"
            );
        }
        assert_eq!(cfg.reflow.min_flexible_minutes, 30);
    }

    #[test]
    fn save_and_load_from_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.reflow.min_flexible_minutes = 10;
        cfg.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn load_rejects_out_of_range_floor() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[reflow]\nmin_flexible_minutes = 1440\n").unwrap();

        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn load_reports_parse_errors() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[reflow\n").unwrap();

        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::ParseFailed(_))
        ));
    }
}
