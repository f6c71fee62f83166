//! Geographic primitives for the hunt.
//!
//! Provides the device [`Position`], the hidden [`TargetLocation`], target
//! generation around a fix, and the coarse directional [`Hint`].
//!
//! All comparisons here are plain coordinate deltas in degrees; nothing in
//! this module projects onto the ellipsoid.

mod hint;
mod types;

pub use hint::{hint, Hint, LatitudeDirection, LongitudeDirection};
pub use types::{Position, TargetLocation, METERS_PER_DEGREE};

use rand::Rng;

/// Default maximum offset between the fix and the generated target (degrees).
pub const DEFAULT_MAX_OFFSET_DEG: f64 = 1.0;

/// Generates a target by offsetting `origin` independently on each axis.
///
/// Each axis gets a magnitude drawn uniformly from `[0, max_offset_deg)` and a
/// sign chosen by an unbiased coin flip, so every component of the result
/// differs from the origin by strictly less than `max_offset_deg`.
pub fn generate_target<R: Rng + ?Sized>(
    origin: Position,
    max_offset_deg: f64,
    rng: &mut R,
) -> TargetLocation {
    let latitude = origin.latitude + signed_offset(max_offset_deg, rng);
    let longitude = origin.longitude + signed_offset(max_offset_deg, rng);
    TargetLocation::new(latitude, longitude)
}

#[inline]
fn signed_offset<R: Rng + ?Sized>(max_offset_deg: f64, rng: &mut R) -> f64 {
    let magnitude = rng.random::<f64>() * max_offset_deg;
    if rng.random_bool(0.5) {
        magnitude
    } else {
        -magnitude
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_target_stays_within_one_degree() {
        let mut rng = StdRng::seed_from_u64(7);
        let origin = Position::new(51.5074, -0.1278);

        for _ in 0..1000 {
            let target = generate_target(origin, DEFAULT_MAX_OFFSET_DEG, &mut rng);
            assert!((target.latitude() - origin.latitude).abs() < 1.0);
            assert!((target.longitude() - origin.longitude).abs() < 1.0);
        }
    }

    #[test]
    fn test_offset_signs_are_balanced() {
        let mut rng = StdRng::seed_from_u64(42);
        let origin = Position::new(0.0, 0.0);
        let trials = 10_000;

        let mut north = 0;
        let mut east = 0;
        let mut both = 0;
        for _ in 0..trials {
            let target = generate_target(origin, DEFAULT_MAX_OFFSET_DEG, &mut rng);
            let is_north = target.latitude() > 0.0;
            let is_east = target.longitude() > 0.0;
            north += is_north as u32;
            east += is_east as u32;
            both += (is_north && is_east) as u32;
        }

        // Expected 5000 each; 5σ is 250
        assert!((4750..=5250).contains(&north), "north = {}", north);
        assert!((4750..=5250).contains(&east), "east = {}", east);
        // Independent axes put a quarter of the draws in one quadrant
        assert!((2300..=2700).contains(&both), "north-east = {}", both);
    }

    #[test]
    fn test_custom_offset_bound() {
        let mut rng = StdRng::seed_from_u64(3);
        let origin = Position::new(10.0, 10.0);

        for _ in 0..500 {
            let target = generate_target(origin, 0.01, &mut rng);
            assert!((target.latitude() - 10.0).abs() < 0.01);
            assert!((target.longitude() - 10.0).abs() < 0.01);
        }
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_target_offset_bound_property(
                lat in -89.0..89.0_f64,
                lon in -179.0..179.0_f64,
                seed in any::<u64>()
            ) {
                let mut rng = StdRng::seed_from_u64(seed);
                let origin = Position::new(lat, lon);
                let target = generate_target(origin, DEFAULT_MAX_OFFSET_DEG, &mut rng);

                prop_assert!(
                    (target.latitude() - lat).abs() < 1.0,
                    "Latitude offset too large: {} -> {}", lat, target.latitude()
                );
                prop_assert!(
                    (target.longitude() - lon).abs() < 1.0,
                    "Longitude offset too large: {} -> {}", lon, target.longitude()
                );
            }
        }
    }
}
