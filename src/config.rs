// SPDX-License-Identifier: GPL-3.0-only

//! User configuration
//!
//! Loaded from (highest precedence first):
//! 1. Environment variables prefixed with `GEOSNAP_` (`__` separates sections,
//!    e.g. `GEOSNAP_LOCATION__TIMEOUT_MS=5000`)
//! 2. `~/.config/geosnap/config.toml` or the path given with `--config`
//! 3. Built-in defaults

use crate::backends::camera::FacingMode;
use crate::backends::location::PositionOptions;
use crate::constants::{self, camera, export, location};
use crate::errors::{AppError, AppResult};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub camera: CameraConfig,
    pub location: LocationConfig,
    pub export: ExportConfig,
}

/// Camera request settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Which camera to prefer
    pub facing: FacingMode,
    /// Preferred width, negotiated down if unavailable
    pub ideal_width: u32,
    /// Preferred height, negotiated down if unavailable
    pub ideal_height: u32,
    /// Explicit PipeWire device path (overrides facing)
    pub device: Option<String>,
    /// Warm-up before a headless snapshot
    pub warmup_ms: u64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            facing: FacingMode::User,
            ideal_width: camera::IDEAL_WIDTH,
            ideal_height: camera::IDEAL_HEIGHT,
            device: None,
            warmup_ms: camera::DEFAULT_WARMUP_MS,
        }
    }
}

/// Geolocation request settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    pub high_accuracy: bool,
    pub timeout_ms: u64,
    pub max_cache_age_ms: u64,
    /// Desktop id GeoClue uses to authorize the client
    pub desktop_id: String,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout_ms: location::TIMEOUT_MS,
            max_cache_age_ms: location::MAX_CACHE_AGE_MS,
            desktop_id: constants::APP_ID.to_string(),
        }
    }
}

impl LocationConfig {
    pub fn position_options(&self) -> PositionOptions {
        PositionOptions {
            high_accuracy: self.high_accuracy,
            timeout: Duration::from_millis(self.timeout_ms),
            max_cache_age: Duration::from_millis(self.max_cache_age_ms),
        }
    }
}

/// Report export settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Where reports and saved photos go (default: Downloads)
    pub directory: Option<PathBuf>,
    /// Map provider used for deep links
    pub map_base_url: String,
    /// chrono format string for the report's date line
    pub timestamp_format: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            directory: None,
            map_base_url: export::DEFAULT_MAP_BASE_URL.to_string(),
            timestamp_format: export::DEFAULT_TIMESTAMP_FORMAT.to_string(),
        }
    }
}

impl ExportConfig {
    /// Resolved export directory
    pub fn directory(&self) -> PathBuf {
        self.directory.clone().unwrap_or_else(|| {
            dirs::download_dir()
                .or_else(dirs::home_dir)
                .unwrap_or_else(|| PathBuf::from("."))
        })
    }
}

impl Config {
    /// Default config file location
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(constants::APP_ID)
            .join(CONFIG_FILE_NAME)
    }

    /// Load configuration with an optional explicit file path
    pub fn load_from(path: Option<PathBuf>) -> AppResult<Self> {
        let path = path.unwrap_or_else(Self::default_path);
        debug!(path = %path.display(), "Loading configuration");

        let config: Config = Self::figment(path).extract()?;
        config.validate()?;
        Ok(config)
    }

    fn figment(path: PathBuf) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("GEOSNAP_").split("__"))
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.camera.ideal_width == 0 || self.camera.ideal_height == 0 {
            return Err(AppError::Config(
                "camera.ideal_width and camera.ideal_height must be non-zero".to_string(),
            ));
        }
        if self.location.timeout_ms == 0 {
            return Err(AppError::Config(
                "location.timeout_ms must be non-zero".to_string(),
            ));
        }
        let url = &self.export.map_base_url;
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(AppError::Config(format!(
                "export.map_base_url must be an http(s) URL, got '{}'",
                url
            )));
        }
        Ok(())
    }
}
