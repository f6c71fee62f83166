//! Directional hint calculation.
//!
//! A hint is a pure function of the target and current coordinates: one sign
//! comparison per axis, no distance or bearing magnitude.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::Position;

/// North/south half of a hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LatitudeDirection {
    North,
    South,
}

/// East/west half of a hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LongitudeDirection {
    East,
    West,
}

impl LatitudeDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            LatitudeDirection::North => "north",
            LatitudeDirection::South => "south",
        }
    }
}

impl LongitudeDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            LongitudeDirection::East => "east",
            LongitudeDirection::West => "west",
        }
    }
}

/// Two-word compass-quadrant hint, displayed as `"north, east"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hint {
    pub latitude: LatitudeDirection,
    pub longitude: LongitudeDirection,
}

impl fmt::Display for Hint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.latitude.as_str(), self.longitude.as_str())
    }
}

/// Computes the hint pointing from `current` towards `target`.
///
/// Ties go south and west: the target must be strictly greater on an axis to
/// read north or east.
pub fn hint(target: Position, current: Position) -> Hint {
    let latitude = if target.latitude > current.latitude {
        LatitudeDirection::North
    } else {
        LatitudeDirection::South
    };
    let longitude = if target.longitude > current.longitude {
        LongitudeDirection::East
    } else {
        LongitudeDirection::West
    };
    Hint {
        latitude,
        longitude,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hint_north_east() {
        let h = hint(Position::new(10.0, 20.0), Position::new(5.0, 15.0));
        assert_eq!(h.to_string(), "north, east");
    }

    #[test]
    fn test_hint_south_west() {
        let h = hint(Position::new(5.0, 15.0), Position::new(10.0, 20.0));
        assert_eq!(h.to_string(), "south, west");
    }

    #[test]
    fn test_hint_mixed_quadrants() {
        let h = hint(Position::new(10.0, 15.0), Position::new(5.0, 20.0));
        assert_eq!(h.latitude, LatitudeDirection::North);
        assert_eq!(h.longitude, LongitudeDirection::West);

        let h = hint(Position::new(-33.9, 151.3), Position::new(-33.8, 151.2));
        assert_eq!(h.to_string(), "south, east");
    }

    #[test]
    fn test_hint_ties_go_south_west() {
        let p = Position::new(1.0, 1.0);
        assert_eq!(hint(p, p).to_string(), "south, west");
    }
}
