//! Heading estimator with a single-outstanding-animation gate.

use std::time::Duration;

use nalgebra::Vector3;
use serde::Serialize;
use tracing::{debug, trace};

use super::rotation::{azimuth, rotation_matrix};

/// Default duration of one heading animation.
pub const DEFAULT_ANIMATION_DURATION: Duration = Duration::from_millis(500);

/// Whether a heading animation is currently running.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnimationStatus {
    /// No animation running; the next sample may trigger a recompute.
    Idle,
    /// An animation towards `target_rotation` is running.
    Animating {
        /// Display rotation (degrees) the animation ends at.
        target_rotation: f32,
        /// A sample arrived while animating; recompute on completion.
        samples_pending: bool,
    },
}

/// A request to rotate the compass display.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HeadingUpdate {
    /// Display rotation before the animation (degrees).
    pub from_rotation: f32,
    /// Display rotation after the animation (degrees).
    pub to_rotation: f32,
    /// Signed rotation to apply (degrees).
    pub rotate_by: f32,
    /// Compass heading the display now reflects (degrees, 0-360).
    pub heading: f32,
    /// How long the animation should take.
    pub duration: Duration,
}

/// Point-in-time view of the estimator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadingState {
    pub accelerometer: Option<[f32; 3]>,
    pub magnetometer: Option<[f32; 3]>,
    /// Last derived compass heading (degrees, 0-360).
    pub heading: Option<f32>,
    pub animating: bool,
}

/// Fuses accelerometer and magnetometer readings into a compass heading.
///
/// Single-threaded: owned by the hunt service event loop and fed one sample
/// at a time. The caller is responsible for reporting animation completion
/// through [`HeadingEstimator::on_animation_complete`].
#[derive(Debug)]
pub struct HeadingEstimator {
    accelerometer: Option<Vector3<f32>>,
    magnetometer: Option<Vector3<f32>>,
    /// Rotation the display shows once the current animation (if any) ends.
    displayed_rotation: f32,
    heading: Option<f32>,
    animation: AnimationStatus,
    animation_duration: Duration,
    recomputations: u64,
}

impl Default for HeadingEstimator {
    fn default() -> Self {
        Self::new(DEFAULT_ANIMATION_DURATION)
    }
}

impl HeadingEstimator {
    pub fn new(animation_duration: Duration) -> Self {
        Self {
            accelerometer: None,
            magnetometer: None,
            displayed_rotation: 0.0,
            heading: None,
            animation: AnimationStatus::Idle,
            animation_duration,
            recomputations: 0,
        }
    }

    /// Store an accelerometer reading; may start a heading animation.
    pub fn on_accelerometer_sample(&mut self, reading: [f32; 3]) -> Option<HeadingUpdate> {
        self.accelerometer = Some(Vector3::from(reading));
        self.on_sample()
    }

    /// Store a magnetometer reading; may start a heading animation.
    pub fn on_magnetometer_sample(&mut self, reading: [f32; 3]) -> Option<HeadingUpdate> {
        self.magnetometer = Some(Vector3::from(reading));
        self.on_sample()
    }

    /// Report that the running animation finished.
    ///
    /// If samples arrived while it ran, exactly one recomputation happens now.
    pub fn on_animation_complete(&mut self) -> Option<HeadingUpdate> {
        match std::mem::replace(&mut self.animation, AnimationStatus::Idle) {
            AnimationStatus::Animating {
                target_rotation,
                samples_pending,
            } => {
                self.displayed_rotation = target_rotation;
                if samples_pending {
                    self.recompute()
                } else {
                    None
                }
            }
            AnimationStatus::Idle => {
                debug!("Animation completion without a running animation");
                None
            }
        }
    }

    pub fn is_animating(&self) -> bool {
        matches!(self.animation, AnimationStatus::Animating { .. })
    }

    pub fn animation(&self) -> AnimationStatus {
        self.animation
    }

    /// Last derived compass heading in degrees (0-360).
    pub fn heading(&self) -> Option<f32> {
        self.heading
    }

    /// Number of heading recomputations performed.
    pub fn recomputations(&self) -> u64 {
        self.recomputations
    }

    pub fn state(&self) -> HeadingState {
        HeadingState {
            accelerometer: self.accelerometer.map(|v| [v.x, v.y, v.z]),
            magnetometer: self.magnetometer.map(|v| [v.x, v.y, v.z]),
            heading: self.heading,
            animating: self.is_animating(),
        }
    }

    fn on_sample(&mut self) -> Option<HeadingUpdate> {
        if let AnimationStatus::Animating {
            samples_pending, ..
        } = &mut self.animation
        {
            *samples_pending = true;
            return None;
        }
        self.recompute()
    }

    fn recompute(&mut self) -> Option<HeadingUpdate> {
        let gravity = self.accelerometer?;
        let geomagnetic = self.magnetometer?;
        let rotation = rotation_matrix(&gravity, &geomagnetic)?;

        self.recomputations += 1;

        let azimuth_deg = azimuth(&rotation).to_degrees();
        // The compass rose turns opposite to the device
        let to_rotation = -azimuth_deg;
        let from_rotation = self.displayed_rotation;
        let heading = azimuth_deg.rem_euclid(360.0);
        self.heading = Some(heading);

        self.animation = AnimationStatus::Animating {
            target_rotation: to_rotation,
            samples_pending: false,
        };

        trace!(heading, rotate_by = to_rotation - from_rotation, "Heading recomputed");

        Some(HeadingUpdate {
            from_rotation,
            to_rotation,
            rotate_by: to_rotation - from_rotation,
            heading,
            duration: self.animation_duration,
        })
    }
}
