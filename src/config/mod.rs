//! Application Configuration
//!
//! Engine location, capture regions and polling cadence, stored in TOML format.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::capture::ScreenRegion;
use crate::vision::ENGLISH;

/// Application settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// OCR engine settings
    pub engine: EngineSettings,
    /// Screen regions to read
    pub regions: RegionSettings,
    /// Polling loop settings
    pub polling: PollingSettings,
}

impl AppConfig {
    /// Reject settings the capture loop cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.engine.engine_path.as_os_str().is_empty() {
            bail!("engine.engine_path must not be empty");
        }
        for (name, region) in [("console", &self.regions.console), ("name", &self.regions.name)] {
            if region.is_empty() {
                bail!("regions.{} must have a non-zero width and height (got {})", name, region);
            }
        }
        let secs = self.polling.interval_secs;
        if !secs.is_finite() || secs <= 0.0 {
            bail!("polling.interval_secs must be a positive number of seconds (got {})", secs);
        }
        Ok(())
    }
}

/// OCR engine settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Tesseract executable; a bare name is looked up on PATH
    pub engine_path: PathBuf,
    /// Model for the console region (engine default when unset)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub console_language: Option<String>,
    /// Model for the name region
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_language: Option<String>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            engine_path: PathBuf::from("tesseract"),
            console_language: None,
            name_language: Some(ENGLISH.to_string()),
        }
    }
}

/// Screen regions read by the tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionSettings {
    /// Game console line, polled continuously
    pub console: ScreenRegion,
    /// Character name plate, read on request
    pub name: ScreenRegion,
}

impl Default for RegionSettings {
    fn default() -> Self {
        Self {
            console: ScreenRegion::new(2, 125, 500, 20),
            name: ScreenRegion::new(500, 300, 200, 30),
        }
    }
}

/// Polling loop settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingSettings {
    /// Delay between two reads of the console region
    pub interval_secs: f64,
}

impl PollingSettings {
    pub fn interval(&self) -> Duration {
        Duration::from_secs_f64(self.interval_secs)
    }
}

impl Default for PollingSettings {
    fn default() -> Self {
        Self { interval_secs: 2.0 }
    }
}

/// Default location of the configuration file
pub fn default_config_path() -> Result<PathBuf> {
    let proj_dirs = directories::ProjectDirs::from("com", "consoleocr", "console-ocr")
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

    Ok(proj_dirs.config_dir().join("config.toml"))
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: AppConfig = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// Save configuration to file
pub fn save_config(config: &AppConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Load configuration from `path`, or fall back to defaults when it does not exist.
///
/// A missing file is an error when `required` is set (the user named it explicitly).
pub fn load_or_default(path: &Path, required: bool) -> Result<AppConfig> {
    if path.exists() {
        let config = load_config(path)
            .with_context(|| format!("Failed to load configuration from {:?}", path))?;
        info!("Loaded configuration from {:?}", path);
        return Ok(config);
    }
    if required {
        bail!("Configuration file {:?} does not exist", path);
    }
    info!("Using default configuration");
    Ok(AppConfig::default())
}
