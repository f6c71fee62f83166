//! Runtime configuration and the on-disk configuration file.
//!
//! [`HuntConfig`] is what the hunt service runs with. [`ConfigFile`] is the
//! INI representation at [`config_file_path`]; missing files and keys fall
//! back to the defaults below.

mod file;
mod keys;

use std::time::Duration;

pub use file::{config_file_path, ConfigError, ConfigFile};
pub use keys::ConfigKey;

use crate::coord::DEFAULT_MAX_OFFSET_DEG;
use crate::heading::DEFAULT_ANIMATION_DURATION;
use crate::hunt::{DEFAULT_HUNT_DURATION, DEFAULT_TICK_INTERVAL};
use crate::position::LocationRequest;
use crate::proximity::MINIMUM_RECOMMENDED_RADIUS_M;

/// Settings for one hunt service instance.
#[derive(Debug, Clone, PartialEq)]
pub struct HuntConfig {
    /// How long a hunt runs before timing out.
    pub hunt_duration: Duration,
    /// Countdown granularity.
    pub tick_interval: Duration,
    /// Maximum target offset per axis, in degrees.
    pub max_offset_deg: f64,
    /// Radius of the treasure region, in meters.
    pub region_radius_m: f32,
    /// Duration of one compass animation.
    pub animation_duration: Duration,
    /// Location update cadence.
    pub location: LocationRequest,
}

impl Default for HuntConfig {
    fn default() -> Self {
        Self {
            hunt_duration: DEFAULT_HUNT_DURATION,
            tick_interval: DEFAULT_TICK_INTERVAL,
            max_offset_deg: DEFAULT_MAX_OFFSET_DEG,
            region_radius_m: MINIMUM_RECOMMENDED_RADIUS_M,
            animation_duration: DEFAULT_ANIMATION_DURATION,
            location: LocationRequest::default(),
        }
    }
}

impl HuntConfig {
    pub fn with_hunt_duration(mut self, duration: Duration) -> Self {
        self.hunt_duration = duration;
        self
    }

    pub fn with_tick_interval(mut self, tick: Duration) -> Self {
        self.tick_interval = tick;
        self
    }

    pub fn with_max_offset_deg(mut self, degrees: f64) -> Self {
        self.max_offset_deg = degrees;
        self
    }

    pub fn with_region_radius_m(mut self, radius_m: f32) -> Self {
        self.region_radius_m = radius_m;
        self
    }

    pub fn with_animation_duration(mut self, duration: Duration) -> Self {
        self.animation_duration = duration;
        self
    }

    pub fn with_location(mut self, location: LocationRequest) -> Self {
        self.location = location;
        self
    }

    /// Reject settings the service cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval.is_zero() {
            return Err(invalid("hunt.tick_ms", "0", "must be greater than zero"));
        }
        if self.hunt_duration.is_zero() {
            return Err(invalid("hunt.duration_secs", "0", "must be greater than zero"));
        }
        if !(self.max_offset_deg.is_finite() && self.max_offset_deg > 0.0) {
            return Err(invalid(
                "hunt.max_offset_deg",
                &self.max_offset_deg.to_string(),
                "must be a positive number of degrees",
            ));
        }
        if !(self.region_radius_m.is_finite() && self.region_radius_m > 0.0) {
            return Err(invalid(
                "hunt.radius_m",
                &self.region_radius_m.to_string(),
                "must be a positive number of meters",
            ));
        }
        if self.location.min_interval > self.location.interval {
            return Err(invalid(
                "location.min_interval_secs",
                &self.location.min_interval.as_secs().to_string(),
                "must not exceed location.interval_secs",
            ));
        }
        Ok(())
    }
}

fn invalid(key: &str, value: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
