use crate::models::exercise::{ExerciseProfile, ExerciseType};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Could not determine home directory")]
    HomeDirUnavailable,
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Where finished sessions are persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Sqlite,
    Http,
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// SQLite file used by the local store
    pub database_path: PathBuf,
    pub store_backend: StoreBackend,
    /// Base URL of the REST backend, required for the http backend
    pub api_base_url: Option<String>,
    pub api_token: Option<String>,
    /// Joints at or below this confidence reject the frame (0.0-1.0)
    pub min_joint_confidence: f32,
    /// Elapsed-time tick period in milliseconds
    pub tick_interval_ms: u64,
    /// Number of sessions returned by history queries
    pub history_limit: u32,
    /// Fallback tracing filter when RUST_LOG is unset
    pub log_filter: String,
    /// Per-exercise thresholds, cooldowns and joint triples
    pub profiles: Vec<ExerciseProfile>,
}

impl Default for Config {
    fn default() -> Self {
        let mut database_path = home_dir().unwrap_or_else(|_| PathBuf::from("."));
        database_path.push(".rep_counter");
        database_path.push("sessions.db");

        Self {
            database_path,
            store_backend: StoreBackend::Sqlite,
            api_base_url: None,
            api_token: None,
            min_joint_confidence: 0.2,
            tick_interval_ms: 1000,
            history_limit: 10,
            log_filter: "info".to_string(),
            profiles: ExerciseType::all()
                .into_iter()
                .map(|exercise| exercise.default_profile())
                .collect(),
        }
    }
}

impl Config {
    /// Load configuration from file, creating with defaults if it doesn't exist
    pub fn load() -> ConfigResult<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&contents)?;
            config.validate()?;
            Ok(config)
        } else {
            let config = Self::default();
            config.save_to(path)?;
            tracing::info!(path = %path.display(), "wrote default configuration");
            Ok(config)
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> ConfigResult<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        self.validate()?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> ConfigResult<()> {
        if !(0.0..1.0).contains(&self.min_joint_confidence) {
            return Err(ConfigError::Invalid(format!(
                "min_joint_confidence {} must be in [0.0, 1.0)",
                self.min_joint_confidence
            )));
        }

        if self.tick_interval_ms == 0 || self.tick_interval_ms > 60_000 {
            return Err(ConfigError::Invalid(format!(
                "tick_interval_ms {} must be between 1 and 60000",
                self.tick_interval_ms
            )));
        }

        if self.history_limit == 0 || self.history_limit > 1000 {
            return Err(ConfigError::Invalid(format!(
                "history_limit {} must be between 1 and 1000",
                self.history_limit
            )));
        }

        if self.store_backend == StoreBackend::Http
            && self.api_base_url.as_deref().map_or(true, |url| url.trim().is_empty())
        {
            return Err(ConfigError::Invalid(
                "api_base_url is required for the http store backend".to_string(),
            ));
        }

        if self.log_filter.trim().is_empty() {
            return Err(ConfigError::Invalid("log_filter cannot be empty".to_string()));
        }

        for (i, profile) in self.profiles.iter().enumerate() {
            profile.validate().map_err(ConfigError::Invalid)?;
            if self.profiles[..i].iter().any(|p| p.exercise == profile.exercise) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate profile for {}",
                    profile.exercise
                )));
            }
        }

        Ok(())
    }

    /// Reset to default configuration
    pub fn reset() -> ConfigResult<Self> {
        let config = Self::default();
        config.save()?;
        Ok(config)
    }

    /// Configured profile for the exercise, or the built-in one
    pub fn profile_for(&self, exercise: ExerciseType) -> ExerciseProfile {
        self.profiles
            .iter()
            .find(|p| p.exercise == exercise)
            .cloned()
            .unwrap_or_else(|| exercise.default_profile())
    }

    fn get_config_path() -> ConfigResult<PathBuf> {
        let mut path = home_dir()?;
        path.push(".rep_counter");
        path.push("config");
        path.push("settings.json");
        Ok(path)
    }
}

fn home_dir() -> ConfigResult<PathBuf> {
    std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map(PathBuf::from)
        .map_err(|_| ConfigError::HomeDirUnavailable)
}
