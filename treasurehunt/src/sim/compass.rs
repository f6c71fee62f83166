//! Simulated accelerometer + magnetometer source.

use std::time::Duration;

use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::heading::sensor_pair_for_heading;
use crate::hunt::HuntHandle;

/// Sensor sampling period (roughly the platform's UI rate).
pub const DEFAULT_SENSOR_PERIOD: Duration = Duration::from_millis(60);

/// A device lying flat and turning at a constant rate.
#[derive(Debug, Clone, Copy)]
pub struct SimulatedCompass {
    initial_heading: f32,
    turn_rate_deg_per_sec: f32,
    period: Duration,
}

impl SimulatedCompass {
    pub fn new(initial_heading: f32, turn_rate_deg_per_sec: f32) -> Self {
        Self {
            initial_heading,
            turn_rate_deg_per_sec,
            period: DEFAULT_SENSOR_PERIOD,
        }
    }

    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    /// True heading in degrees (0-360) after `elapsed`.
    pub fn heading_at(&self, elapsed: Duration) -> f32 {
        (self.initial_heading + self.turn_rate_deg_per_sec * elapsed.as_secs_f32()).rem_euclid(360.0)
    }

    /// Accelerometer and magnetometer readings after `elapsed`.
    pub fn sample_at(&self, elapsed: Duration) -> ([f32; 3], [f32; 3]) {
        sensor_pair_for_heading(self.heading_at(elapsed))
    }

    /// Stream readings into the hunt service until cancelled.
    pub async fn run(self, handle: HuntHandle, shutdown: CancellationToken) {
        let started = Instant::now();
        let mut interval = tokio::time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => break,

                _ = interval.tick() => {
                    let (accelerometer, magnetometer) = self.sample_at(started.elapsed());
                    if handle.accelerometer(accelerometer).is_err()
                        || handle.magnetometer(magnetometer).is_err()
                    {
                        break;
                    }
                }
            }
        }
        debug!("Simulated compass stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hunt::{HuntEvent, SensorSample};

    #[test]
    fn test_heading_wraps() {
        let compass = SimulatedCompass::new(350.0, 20.0);
        assert!((compass.heading_at(Duration::from_secs(1)) - 10.0).abs() < 1e-3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_sends_sensor_pairs() {
        let (handle, mut events) = HuntHandle::channel();
        let shutdown = CancellationToken::new();
        let task = tokio::spawn(SimulatedCompass::new(0.0, 0.0).run(handle, shutdown.clone()));

        assert!(matches!(
            events.recv().await,
            Some(HuntEvent::Sensor(SensorSample::Accelerometer(_)))
        ));
        assert!(matches!(
            events.recv().await,
            Some(HuntEvent::Sensor(SensorSample::Magnetometer(_)))
        ));

        shutdown.cancel();
        task.await.unwrap();
    }
}
