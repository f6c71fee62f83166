//! Addressable `section.key` settings for `config get` / `config set`.

use std::path::PathBuf;
use std::str::FromStr;

use super::file::{parse_value, ConfigError, ConfigFile};

/// A single setting in [`ConfigFile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    HuntDurationSecs,
    HuntTickMs,
    HuntRadiusM,
    HuntMaxOffsetDeg,
    HeadingAnimationMs,
    LocationIntervalSecs,
    LocationMinIntervalSecs,
    LoggingDirectory,
    LoggingFilter,
}

impl ConfigKey {
    /// Every key, grouped by section in file order.
    pub fn all() -> &'static [ConfigKey] {
        &[
            ConfigKey::HuntDurationSecs,
            ConfigKey::HuntTickMs,
            ConfigKey::HuntRadiusM,
            ConfigKey::HuntMaxOffsetDeg,
            ConfigKey::HeadingAnimationMs,
            ConfigKey::LocationIntervalSecs,
            ConfigKey::LocationMinIntervalSecs,
            ConfigKey::LoggingDirectory,
            ConfigKey::LoggingFilter,
        ]
    }

    pub fn section(&self) -> &'static str {
        match self {
            ConfigKey::HuntDurationSecs
            | ConfigKey::HuntTickMs
            | ConfigKey::HuntRadiusM
            | ConfigKey::HuntMaxOffsetDeg => "hunt",
            ConfigKey::HeadingAnimationMs => "heading",
            ConfigKey::LocationIntervalSecs | ConfigKey::LocationMinIntervalSecs => "location",
            ConfigKey::LoggingDirectory | ConfigKey::LoggingFilter => "logging",
        }
    }

    pub fn key_name(&self) -> &'static str {
        match self {
            ConfigKey::HuntDurationSecs => "duration_secs",
            ConfigKey::HuntTickMs => "tick_ms",
            ConfigKey::HuntRadiusM => "radius_m",
            ConfigKey::HuntMaxOffsetDeg => "max_offset_deg",
            ConfigKey::HeadingAnimationMs => "animation_ms",
            ConfigKey::LocationIntervalSecs => "interval_secs",
            ConfigKey::LocationMinIntervalSecs => "min_interval_secs",
            ConfigKey::LoggingDirectory => "directory",
            ConfigKey::LoggingFilter => "filter",
        }
    }

    /// Full `section.key` name.
    pub fn name(&self) -> String {
        format!("{}.{}", self.section(), self.key_name())
    }

    /// Current value as text; empty when unset.
    pub fn get(&self, config: &ConfigFile) -> String {
        match self {
            ConfigKey::HuntDurationSecs => config.hunt.duration_secs.to_string(),
            ConfigKey::HuntTickMs => config.hunt.tick_ms.to_string(),
            ConfigKey::HuntRadiusM => config.hunt.radius_m.to_string(),
            ConfigKey::HuntMaxOffsetDeg => config.hunt.max_offset_deg.to_string(),
            ConfigKey::HeadingAnimationMs => config.heading.animation_ms.to_string(),
            ConfigKey::LocationIntervalSecs => config.location.interval_secs.to_string(),
            ConfigKey::LocationMinIntervalSecs => config.location.min_interval_secs.to_string(),
            ConfigKey::LoggingDirectory => config
                .logging
                .directory
                .as_ref()
                .map(|d| d.display().to_string())
                .unwrap_or_default(),
            ConfigKey::LoggingFilter => config.logging.filter.clone(),
        }
    }

    /// Parse and store `value`, then check the result still validates.
    ///
    /// On error `config` is left unchanged.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigError> {
        let mut updated = config.clone();
        let name = self.name();
        match self {
            ConfigKey::HuntDurationSecs => updated.hunt.duration_secs = parse_value(&name, value)?,
            ConfigKey::HuntTickMs => updated.hunt.tick_ms = parse_value(&name, value)?,
            ConfigKey::HuntRadiusM => updated.hunt.radius_m = parse_value(&name, value)?,
            ConfigKey::HuntMaxOffsetDeg => updated.hunt.max_offset_deg = parse_value(&name, value)?,
            ConfigKey::HeadingAnimationMs => {
                updated.heading.animation_ms = parse_value(&name, value)?
            }
            ConfigKey::LocationIntervalSecs => {
                updated.location.interval_secs = parse_value(&name, value)?
            }
            ConfigKey::LocationMinIntervalSecs => {
                updated.location.min_interval_secs = parse_value(&name, value)?
            }
            ConfigKey::LoggingDirectory => {
                let value = value.trim();
                updated.logging.directory = (!value.is_empty()).then(|| PathBuf::from(value));
            }
            ConfigKey::LoggingFilter => updated.logging.filter = value.trim().to_string(),
        }
        updated.hunt_config()?;
        *config = updated;
        Ok(())
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        ConfigKey::all()
            .iter()
            .copied()
            .find(|key| key.name() == wanted)
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}
