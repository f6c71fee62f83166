//! Hint-following simulated location provider.

use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use super::SimulatedProximityService;
use crate::coord::{Hint, LatitudeDirection, LongitudeDirection, Position};
use crate::position::{LocationError, LocationProvider, LocationRequest};

/// Initial stride per axis, in degrees (about 1.1 km of latitude).
pub const DEFAULT_STEP_DEG: f64 = 0.01;

/// Stride never shrinks below this (about 1 m).
pub const MIN_STEP_DEG: f64 = 0.00001;

#[derive(Debug)]
struct WalkerState {
    position: Position,
    step_lat: f64,
    step_lon: f64,
    hint: Option<Hint>,
}

impl WalkerState {
    fn advance(&mut self) -> Position {
        let Some(hint) = self.hint else {
            return self.position;
        };

        let dlat = match hint.latitude {
            LatitudeDirection::North => self.step_lat,
            LatitudeDirection::South => -self.step_lat,
        };
        let dlon = match hint.longitude {
            LongitudeDirection::East => self.step_lon,
            LongitudeDirection::West => -self.step_lon,
        };
        self.position = Position::new(self.position.latitude + dlat, self.position.longitude + dlon);
        self.position
    }

    fn steer(&mut self, hint: Hint) {
        if let Some(previous) = self.hint {
            if previous.latitude != hint.latitude {
                self.step_lat = (self.step_lat / 2.0).max(MIN_STEP_DEG);
            }
            if previous.longitude != hint.longitude {
                self.step_lon = (self.step_lon / 2.0).max(MIN_STEP_DEG);
            }
        }
        self.hint = Some(hint);
    }
}

/// A walker that produces a fix every `period`, moving one stride in the
/// direction of the last hint it was given.
///
/// Stands still until the first [`SimulatedWalker::steer`].
pub struct SimulatedWalker {
    state: Arc<Mutex<WalkerState>>,
    period: Option<Duration>,
    proximity: Option<Arc<SimulatedProximityService>>,
    subscription: Mutex<Option<CancellationToken>>,
}

impl SimulatedWalker {
    pub fn new(start: Position, step_deg: f64) -> Self {
        let step = step_deg.max(MIN_STEP_DEG);
        Self {
            state: Arc::new(Mutex::new(WalkerState {
                position: start,
                step_lat: step,
                step_lon: step,
                hint: None,
            })),
            period: None,
            proximity: None,
            subscription: Mutex::new(None),
        }
    }

    /// Emit fixes at this period instead of the requested interval.
    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = Some(period);
        self
    }

    /// Report every new position to a simulated proximity service.
    pub fn with_proximity(mut self, proximity: Arc<SimulatedProximityService>) -> Self {
        self.proximity = Some(proximity);
        self
    }

    pub fn position(&self) -> Position {
        self.state.lock().position
    }

    /// Current stride (latitude, longitude) in degrees.
    pub fn stride(&self) -> (f64, f64) {
        let state = self.state.lock();
        (state.step_lat, state.step_lon)
    }

    /// Head towards the hinted quadrant.
    pub fn steer(&self, hint: Hint) {
        self.state.lock().steer(hint);
        trace!(hint = %hint, "Walker steered");
    }

    /// Take one stride and return the new position.
    pub fn step(&self) -> Position {
        step(&self.state, self.proximity.as_deref())
    }
}

fn step(state: &Mutex<WalkerState>, proximity: Option<&SimulatedProximityService>) -> Position {
    let position = state.lock().advance();
    if let Some(proximity) = proximity {
        proximity.observe(position);
    }
    position
}

impl LocationProvider for SimulatedWalker {
    fn last_known(&self) -> BoxFuture<'_, Result<Option<Position>, LocationError>> {
        let position = self.position();
        Box::pin(async move { Ok(Some(position)) })
    }

    fn subscribe(
        &self,
        request: &LocationRequest,
        sink: mpsc::UnboundedSender<Position>,
    ) -> Result<(), LocationError> {
        let period = self.period.unwrap_or(request.interval);
        if period.is_zero() {
            return Err(LocationError::Provider("update period must be non-zero".into()));
        }

        let token = CancellationToken::new();
        if let Some(previous) = self.subscription.lock().replace(token.clone()) {
            previous.cancel();
        }

        let state = Arc::clone(&self.state);
        let proximity = self.proximity.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately; the seed fix covers it
            interval.tick().await;

            loop {
                tokio::select! {
                    biased;

                    _ = token.cancelled() => break,

                    _ = interval.tick() => {
                        let position = step(&state, proximity.as_deref());
                        if sink.send(position).is_err() {
                            break;
                        }
                    }
                }
            }
            debug!("Simulated walker stopped");
        });
        Ok(())
    }

    fn unsubscribe(&self) {
        if let Some(token) = self.subscription.lock().take() {
            token.cancel();
        }
    }
}
