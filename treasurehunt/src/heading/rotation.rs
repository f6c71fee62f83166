//! Rotation matrix and azimuth extraction.
//!
//! Device frame: x to the right of the screen, y towards the top of the
//! screen, z out of the screen. The accelerometer reports +g on z when the
//! device lies flat.

use nalgebra::{Matrix3, Vector3};

/// Standard gravity (m/s²).
const STANDARD_GRAVITY: f32 = 9.806_65;

/// Below this squared magnitude the device is treated as in free fall.
const FREE_FALL_GRAVITY_SQUARED: f32 = 0.01 * STANDARD_GRAVITY * STANDARD_GRAVITY;

/// Minimum horizontal field magnitude; below it the field is too close to
/// vertical (or absent) to give a direction.
const MIN_HORIZONTAL_FIELD: f32 = 0.1;

/// Derive the device-to-world rotation matrix from gravity and geomagnetic
/// vectors.
///
/// Rows are east, north and up expressed in device coordinates. Returns
/// `None` in free fall or when the geomagnetic vector is (anti)parallel to
/// gravity.
pub fn rotation_matrix(
    gravity: &Vector3<f32>,
    geomagnetic: &Vector3<f32>,
) -> Option<Matrix3<f32>> {
    let gravity_sq = gravity.norm_squared();
    if gravity_sq < FREE_FALL_GRAVITY_SQUARED {
        return None;
    }

    let east = geomagnetic.cross(gravity);
    let east_norm = east.norm();
    if east_norm < MIN_HORIZONTAL_FIELD {
        return None;
    }

    let east = east / east_norm;
    let up = gravity.scale(1.0 / gravity_sq.sqrt());
    let north = up.cross(&east);

    Some(Matrix3::from_rows(&[
        east.transpose(),
        north.transpose(),
        up.transpose(),
    ]))
}

/// Azimuth (radians) of the device's y axis, clockwise from magnetic north.
///
/// Range is `(-π, π]`.
pub fn azimuth(rotation: &Matrix3<f32>) -> f32 {
    rotation[(0, 1)].atan2(rotation[(1, 1)])
}

/// Synthesize a flat-lying accelerometer/magnetometer pair for a heading.
///
/// Useful for simulation and tests: the returned pair yields `heading_deg`
/// back through [`rotation_matrix`] and [`azimuth`].
pub fn sensor_pair_for_heading(heading_deg: f32) -> ([f32; 3], [f32; 3]) {
    let (sin, cos) = heading_deg.to_radians().sin_cos();
    // ~20 µT horizontal, ~40 µT downward (mid-latitude field)
    let magnetometer = [-20.0 * sin, 20.0 * cos, -40.0];
    let accelerometer = [0.0, 0.0, STANDARD_GRAVITY];
    (accelerometer, magnetometer)
}
