//! Compass heading from accelerometer + magnetometer fusion.
//!
//! The estimator keeps the latest reading of each sensor and, when no heading
//! animation is running, derives a rotation matrix, extracts the azimuth and
//! asks the display to rotate towards it over a bounded duration.
//!
//! # Animation Gate
//!
//! ```text
//! Idle --[sample, both readings valid]--> Animating
//! Animating --[sample]--> Animating (reading stored, recompute deferred)
//! Animating --[finished, no samples]--> Idle
//! Animating --[finished, samples arrived]--> Animating (one recompute)
//! ```
//!
//! There is never more than one outstanding heading transition and no queue
//! of pending ones: any number of samples arriving during an animation
//! collapse into a single recomputation when it completes.
//!
//! The heading has no hunt-session boundary. The estimator keeps running
//! whether or not a hunt is active.

mod estimator;
mod rotation;

pub use estimator::{
    AnimationStatus, HeadingEstimator, HeadingState, HeadingUpdate, DEFAULT_ANIMATION_DURATION,
};
pub use rotation::{azimuth, rotation_matrix, sensor_pair_for_heading};
