//! Position and target types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Approximate length of one degree of latitude in meters.
///
/// Only used for coarse coordinate-delta comparisons (simulated proximity
/// checks, display); not a geodesic distance.
pub const METERS_PER_DEGREE: f64 = 111_320.0;

/// A device position in floating point degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

impl Position {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Coarse planar distance to `other` in meters.
    ///
    /// Scales the longitude delta by the cosine of the mean latitude and
    /// treats the result as flat. Good enough for a 100 m trigger radius.
    pub fn approx_distance_m(&self, other: &Position) -> f64 {
        let mean_lat = ((self.latitude + other.latitude) / 2.0).to_radians();
        let d_lat = (other.latitude - self.latitude) * METERS_PER_DEGREE;
        let d_lon = (other.longitude - self.longitude) * METERS_PER_DEGREE * mean_lat.cos();
        d_lat.hypot(d_lon)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.5}, {:.5}", self.latitude, self.longitude)
    }
}

/// Location of the hidden treasure for one hunt.
///
/// Created once when a hunt starts and never mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetLocation(Position);

impl TargetLocation {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self(Position::new(latitude, longitude))
    }

    pub fn latitude(&self) -> f64 {
        self.0.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.0.longitude
    }

    /// The target as a plain position.
    pub fn position(&self) -> Position {
        self.0
    }
}

impl From<Position> for TargetLocation {
    fn from(position: Position) -> Self {
        Self(position)
    }
}

impl fmt::Display for TargetLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_one_degree_latitude() {
        let a = Position::new(0.0, 0.0);
        let b = Position::new(1.0, 0.0);
        let d = a.approx_distance_m(&b);
        assert!((d - METERS_PER_DEGREE).abs() < 1.0);
    }

    #[test]
    fn test_distance_longitude_shrinks_with_latitude() {
        let equator = Position::new(0.0, 0.0).approx_distance_m(&Position::new(0.0, 0.01));
        let north = Position::new(60.0, 0.0).approx_distance_m(&Position::new(60.0, 0.01));
        assert!(north < equator);
        // cos(60°) = 0.5
        assert!((north - equator / 2.0).abs() < 1.0);
    }

    #[test]
    fn test_distance_to_self_is_zero() {
        let p = Position::new(48.8566, 2.3522);
        assert_eq!(p.approx_distance_m(&p), 0.0);
    }

    #[test]
    fn test_target_exposes_position() {
        let target = TargetLocation::new(10.0, 20.0);
        assert_eq!(target.position(), Position::new(10.0, 20.0));
        assert_eq!(target.to_string(), "10.00000, 20.00000");
    }
}
