//! Proximity region definition.

use std::time::Duration;

use serde::Serialize;

use crate::coord::{Position, TargetLocation};

/// Identifier of the treasure region. Only one region is ever armed.
pub const TREASURE_REGION_ID: &str = "TreasureLocation";

/// Smallest radius (meters) the trigger service reliably detects.
pub const MINIMUM_RECOMMENDED_RADIUS_M: f32 = 100.0;

/// Transition that fires a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Transition {
    /// The device moved from outside to inside the region.
    Enter,
}

/// A circular region watched by the proximity service.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProximityRegion {
    pub id: String,
    pub center: Position,
    pub radius_m: f32,
    pub transition: Transition,
    /// `None` means the region never expires.
    pub expires_after: Option<Duration>,
}

impl ProximityRegion {
    /// The treasure region around a hunt target.
    pub fn treasure(target: TargetLocation, radius_m: f32) -> Self {
        Self {
            id: TREASURE_REGION_ID.to_string(),
            center: target.position(),
            radius_m,
            transition: Transition::Enter,
            expires_after: None,
        }
    }

    /// Whether `position` lies inside the region (coarse planar check).
    pub fn contains(&self, position: &Position) -> bool {
        self.center.approx_distance_m(position) <= self.radius_m as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_treasure_region_defaults() {
        let region = ProximityRegion::treasure(
            TargetLocation::new(1.0, 2.0),
            MINIMUM_RECOMMENDED_RADIUS_M,
        );
        assert_eq!(region.id, "TreasureLocation");
        assert_eq!(region.center, Position::new(1.0, 2.0));
        assert_eq!(region.radius_m, 100.0);
        assert_eq!(region.transition, Transition::Enter);
        assert!(region.expires_after.is_none());
    }

    #[test]
    fn test_contains() {
        let region = ProximityRegion::treasure(TargetLocation::new(0.0, 0.0), 100.0);
        // ~55 m north
        assert!(region.contains(&Position::new(0.0005, 0.0)));
        // ~111 m north
        assert!(!region.contains(&Position::new(0.001, 0.0)));
    }
}
