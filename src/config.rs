//! Configuration management (TOML)

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{DashboardError, Result};

/// Default location of the configuration file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "adclick.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub training: TrainingConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataConfig {
    /// ISO-8859-1 encoded CSV with the ad viewer records
    pub csv_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// JSON artifact written by `adclick train`
    pub artifact_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    pub learning_rate: f64,
    pub epochs: usize,
    pub l2_penalty: f64,
    pub tolerance: f64,
    /// Share of rows held out for the accuracy report, in `[0, 1)`
    pub test_fraction: f64,
    pub seed: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiConfig {
    pub window_title: String,
    pub preview_rows: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data: DataConfig::default(),
            model: ModelConfig::default(),
            training: TrainingConfig::default(),
            ui: UiConfig::default(),
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        DataConfig {
            csv_path: PathBuf::from("facebook_ads.csv"),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        ModelConfig {
            artifact_path: PathBuf::from("my_model.json"),
        }
    }
}

impl Default for TrainingConfig {
    fn default() -> Self {
        TrainingConfig {
            learning_rate: 0.5,
            epochs: 5_000,
            l2_penalty: 0.0,
            tolerance: 1e-6,
            test_fraction: 0.2,
            seed: 42,
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        UiConfig {
            window_title: "Facebook Ads Analytics".to_string(),
            preview_rows: 5,
        }
    }
}

impl Config {
    /// Reads a configuration file. Missing sections fall back to their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| DashboardError::io(path, e))?;
        let config: Config = toml::from_str(&content).map_err(|source| DashboardError::Config {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Like [`Config::load`], but a file that does not exist yields the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!(path = %path.display(), "no configuration file, using defaults");
            return Ok(Config::default());
        }
        Self::load(path)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).map_err(|e| DashboardError::io(path, e))
    }
}
