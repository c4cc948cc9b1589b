//! Configuration file support for the coach tools.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/coach/config.toml`.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub generation: GenerationConfig,

    #[serde(default)]
    pub store: StoreConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Program generation parameters
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Load given to exercises recognised as kettlebell/dumbbell work
    #[serde(default = "default_weight_kg")]
    pub default_weight_kg: f32,

    /// Fixed session length reported on every generated program
    #[serde(default = "default_session_minutes")]
    pub session_minutes: u32,

    /// Name fragments that mark an exercise as loadable
    #[serde(default = "default_loadable_keywords")]
    pub loadable_keywords: Vec<String>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            default_weight_kg: default_weight_kg(),
            session_minutes: default_session_minutes(),
            loadable_keywords: default_loadable_keywords(),
        }
    }
}

/// Workout store configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Whether the store accepts sections as structured JSON. When false the
    /// sections are written as a serialized string.
    #[serde(default = "default_structured_sections")]
    pub structured_sections: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            structured_sections: default_structured_sections(),
        }
    }
}

// Default value functions
fn home_dir_or_cwd() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| home_dir_or_cwd().join(".local/share"));
    base.join("coach")
}

fn default_weight_kg() -> f32 {
    12.0
}

fn default_session_minutes() -> u32 {
    60
}

fn default_loadable_keywords() -> Vec<String> {
    vec![
        "kettlebell".into(),
        "kb".into(),
        "dumbbell".into(),
        "db".into(),
        "haltère".into(),
        "haltere".into(),
    ]
}

fn default_structured_sections() -> bool {
    true
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| home_dir_or_cwd().join(".config"));
        base.join("coach").join("config.toml")
    }

    /// Reject values generation cannot work with
    pub fn validate(&self) -> Result<()> {
        let weight = self.generation.default_weight_kg;
        if !weight.is_finite() || weight <= 0.0 {
            return Err(Error::Config(format!(
                "default_weight_kg must be a positive number, got {}",
                weight
            )));
        }
        if self.generation.session_minutes == 0 {
            return Err(Error::Config("session_minutes must be at least 1".into()));
        }
        if self.generation.loadable_keywords.iter().any(|k| k.trim().is_empty()) {
            return Err(Error::Config("loadable_keywords contains an empty entry".into()));
        }
        Ok(())
    }

    /// Save the current configuration to the default path
    pub fn save(&self) -> Result<()> {
        let config_path = Self::default_config_path();
        self.save_to(&config_path)
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}
