//! TOML-based application configuration.
//!
//! Stores:
//! - The weekly class cadence (weekday, start time, length)
//! - Booking capacity and the no-show strike policy
//! - Workout level tiers, offered durations and the exercise pool source
//!
//! Configuration is stored at `~/.config/gymdesk/config.toml`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::data_dir;
use super::pool::PoolSource;
use crate::booking::{AttendanceCalculator, CadenceRule, StrikePolicy};
use crate::error::ConfigError;
use crate::workout::{LevelTable, WorkoutGenerator, ALLOWED_DURATIONS, DEFAULT_COUNTDOWN_SECS};

/// Booking configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingConfig {
    #[serde(default = "default_capacity")]
    pub capacity: u32,
    #[serde(default)]
    pub strikes: StrikePolicy,
}

/// Workout player configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutConfig {
    #[serde(default)]
    pub levels: LevelTable,
    #[serde(default = "default_durations")]
    pub durations: Vec<u32>,
    #[serde(default = "default_countdown_secs")]
    pub countdown_secs: u32,
    /// Where the exercise pool manifest lives. Defaults to
    /// `<data_dir>/exercises.json` when unset.
    #[serde(default)]
    pub pool: Option<PoolSource>,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/gymdesk/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub cadence: CadenceRule,
    #[serde(default)]
    pub booking: BookingConfig,
    #[serde(default)]
    pub workout: WorkoutConfig,
}

// Default functions
fn default_capacity() -> u32 {
    12
}
fn default_durations() -> Vec<u32> {
    ALLOWED_DURATIONS.to_vec()
}
fn default_countdown_secs() -> u32 {
    DEFAULT_COUNTDOWN_SECS
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            strikes: StrikePolicy::default(),
        }
    }
}

impl Default for WorkoutConfig {
    fn default() -> Self {
        Self {
            levels: LevelTable::default(),
            durations: default_durations(),
            countdown_secs: default_countdown_secs(),
            pool: None,
        }
    }
}

impl WorkoutConfig {
    pub fn generator(&self) -> WorkoutGenerator {
        WorkoutGenerator::new(self.levels, self.durations.clone())
    }

    /// Configured pool, or the manifest in the data directory.
    pub fn pool_source(&self) -> Result<PoolSource, ConfigError> {
        match &self.pool {
            Some(source) => Ok(source.clone()),
            None => {
                let dir = data_dir().map_err(|e| ConfigError::InvalidValue {
                    key: "workout.pool".into(),
                    message: e.to_string(),
                })?;
                Ok(PoolSource::Manifest {
                    path: dir.join("exercises.json"),
                })
            }
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
        if parts.peek().is_none() || key.is_empty() {
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
                        value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        if let Ok(n) = value.parse::<u64>() {
                            serde_json::Value::Number(n.into())
                        } else if let Ok(n) = value.parse::<f64>() {
                            serde_json::Number::from_f64(n)
                                .map(serde_json::Value::Number)
                                .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                        } else {
                            return Err(invalid(format!("cannot parse '{value}' as number")));
                        }
                    }
                    serde_json::Value::Object(_)
                    | serde_json::Value::Array(_)
                    | serde_json::Value::Null => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
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

    fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("config.toml"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load from disk or write and return the default.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                toml::from_str(&content).map_err(|e| ConfigError::ParseFailed(e.to_string()))
            }
            Err(_) => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_err = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_err(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_err(e.to_string()))
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

    /// Set a config value by key without saving. Returns error if the key
    /// is unknown or the value does not fit the field.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json =
            serde_json::to_value(&*self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Set a config value by key and save.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.apply(key, value)?;
        self.save()
    }

    pub fn attendance(&self) -> AttendanceCalculator {
        AttendanceCalculator::new(self.cadence, self.booking.strikes)
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }
}
