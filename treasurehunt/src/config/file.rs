//! INI configuration file.
//!
//! ```ini
//! [hunt]
//! duration_secs = 3600
//! tick_ms = 1000
//! radius_m = 100
//! max_offset_deg = 1
//!
//! [heading]
//! animation_ms = 500
//!
//! [location]
//! interval_secs = 10
//! min_interval_secs = 5
//!
//! [logging]
//! directory = /var/log/treasurehunt
//! filter = treasurehunt=info
//! ```

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use ini::Ini;
use thiserror::Error;
use tracing::debug;

use super::HuntConfig;
use crate::logging::{LoggingConfig, DEFAULT_LOG_FILTER};
use crate::position::LocationRequest;

/// Errors loading, saving or editing configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to access config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("Unknown configuration key '{0}'")]
    UnknownKey(String),
}

/// Location of the user configuration file.
///
/// `<config dir>/treasurehunt/config.ini`, falling back to the working
/// directory when the platform has no config directory.
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("treasurehunt")
        .join("config.ini")
}

/// `[hunt]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct HuntSection {
    pub duration_secs: u64,
    pub tick_ms: u64,
    pub radius_m: f32,
    pub max_offset_deg: f64,
}

/// `[heading]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadingSection {
    pub animation_ms: u64,
}

/// `[location]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationSection {
    pub interval_secs: u64,
    pub min_interval_secs: u64,
}

/// Contents of `config.ini`.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    pub hunt: HuntSection,
    pub heading: HeadingSection,
    pub location: LocationSection,
    pub logging: LoggingConfig,
}

impl Default for ConfigFile {
    fn default() -> Self {
        let defaults = HuntConfig::default();
        Self {
            hunt: HuntSection {
                duration_secs: defaults.hunt_duration.as_secs(),
                tick_ms: defaults.tick_interval.as_millis() as u64,
                radius_m: defaults.region_radius_m,
                max_offset_deg: defaults.max_offset_deg,
            },
            heading: HeadingSection {
                animation_ms: defaults.animation_duration.as_millis() as u64,
            },
            location: LocationSection {
                interval_secs: defaults.location.interval.as_secs(),
                min_interval_secs: defaults.location.min_interval.as_secs(),
            },
            logging: LoggingConfig::default(),
        }
    }
}

impl ConfigFile {
    /// Load from [`config_file_path`]; a missing file yields defaults.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_file_path())
    }

    /// Load from `path`; a missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path).map_err(|e| match e {
            ini::Error::Io(source) => ConfigError::Io {
                path: path.to_path_buf(),
                source,
            },
            ini::Error::Parse(err) => ConfigError::Parse {
                path: path.to_path_buf(),
                message: err.to_string(),
            },
        })?;

        let defaults = Self::default();
        Ok(Self {
            hunt: HuntSection {
                duration_secs: parse_or(&ini, "hunt", "duration_secs", defaults.hunt.duration_secs)?,
                tick_ms: parse_or(&ini, "hunt", "tick_ms", defaults.hunt.tick_ms)?,
                radius_m: parse_or(&ini, "hunt", "radius_m", defaults.hunt.radius_m)?,
                max_offset_deg: parse_or(
                    &ini,
                    "hunt",
                    "max_offset_deg",
                    defaults.hunt.max_offset_deg,
                )?,
            },
            heading: HeadingSection {
                animation_ms: parse_or(
                    &ini,
                    "heading",
                    "animation_ms",
                    defaults.heading.animation_ms,
                )?,
            },
            location: LocationSection {
                interval_secs: parse_or(
                    &ini,
                    "location",
                    "interval_secs",
                    defaults.location.interval_secs,
                )?,
                min_interval_secs: parse_or(
                    &ini,
                    "location",
                    "min_interval_secs",
                    defaults.location.min_interval_secs,
                )?,
            },
            logging: LoggingConfig {
                directory: get(&ini, "logging", "directory")
                    .filter(|v| !v.is_empty())
                    .map(PathBuf::from),
                filter: get(&ini, "logging", "filter")
                    .filter(|v| !v.is_empty())
                    .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
            },
        })
    }

    /// Save to [`config_file_path`], creating the directory if needed.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&config_file_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let io_error = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_error)?;
        }

        let mut ini = Ini::new();
        ini.with_section(Some("hunt"))
            .set("duration_secs", self.hunt.duration_secs.to_string())
            .set("tick_ms", self.hunt.tick_ms.to_string())
            .set("radius_m", self.hunt.radius_m.to_string())
            .set("max_offset_deg", self.hunt.max_offset_deg.to_string());
        ini.with_section(Some("heading"))
            .set("animation_ms", self.heading.animation_ms.to_string());
        ini.with_section(Some("location"))
            .set("interval_secs", self.location.interval_secs.to_string())
            .set("min_interval_secs", self.location.min_interval_secs.to_string());

        let directory = self
            .logging
            .directory
            .as_ref()
            .map(|d| d.display().to_string())
            .unwrap_or_default();
        ini.with_section(Some("logging"))
            .set("directory", directory)
            .set("filter", self.logging.filter.clone());

        ini.write_to_file(path).map_err(io_error)
    }

    /// Runtime settings, validated.
    pub fn hunt_config(&self) -> Result<HuntConfig, ConfigError> {
        let config = HuntConfig::default()
            .with_hunt_duration(Duration::from_secs(self.hunt.duration_secs))
            .with_tick_interval(Duration::from_millis(self.hunt.tick_ms))
            .with_region_radius_m(self.hunt.radius_m)
            .with_max_offset_deg(self.hunt.max_offset_deg)
            .with_animation_duration(Duration::from_millis(self.heading.animation_ms))
            .with_location(
                LocationRequest::default()
                    .with_interval(Duration::from_secs(self.location.interval_secs))
                    .with_min_interval(Duration::from_secs(self.location.min_interval_secs)),
            );
        config.validate()?;
        Ok(config)
    }
}

fn get(ini: &Ini, section: &str, key: &str) -> Option<String> {
    ini.section(Some(section))
        .and_then(|s| s.get(key))
        .map(|v| v.trim().to_string())
}

fn parse_or<T: FromStr>(ini: &Ini, section: &str, key: &str, default: T) -> Result<T, ConfigError> {
    match get(ini, section, key) {
        None => Ok(default),
        Some(value) if value.is_empty() => Ok(default),
        Some(value) => parse_value(&format!("{}.{}", section, key), &value),
    }
}

/// Parse a single setting, naming the key on failure.
pub(super) fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        reason: "not a valid number".to_string(),
    })
}
