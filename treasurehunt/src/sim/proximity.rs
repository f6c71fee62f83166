//! In-process proximity service driven by observed positions.

use futures::future::BoxFuture;
use parking_lot::Mutex;
use tracing::debug;

use crate::coord::Position;
use crate::proximity::{EnterCallback, ProximityError, ProximityRegion, ProximityService};

struct WatchedRegion {
    region: ProximityRegion,
    on_enter: EnterCallback,
    inside: bool,
}

/// Fires "entered" callbacks when an observed position moves into a
/// registered region.
///
/// Registering while the last observed position is already inside fires the
/// callback immediately (initial trigger), before the registration result.
#[derive(Default)]
pub struct SimulatedProximityService {
    regions: Mutex<Vec<WatchedRegion>>,
    last_position: Mutex<Option<Position>>,
    reject_with: Option<String>,
}

impl SimulatedProximityService {
    pub fn new() -> Self {
        Self::default()
    }

    /// A service that refuses every registration.
    pub fn rejecting(reason: impl Into<String>) -> Self {
        Self {
            reject_with: Some(reason.into()),
            ..Self::default()
        }
    }

    /// Ids of currently registered regions.
    pub fn registered(&self) -> Vec<String> {
        self.regions
            .lock()
            .iter()
            .map(|w| w.region.id.clone())
            .collect()
    }

    /// Feed a device position; fires callbacks for regions just entered.
    pub fn observe(&self, position: Position) {
        *self.last_position.lock() = Some(position);

        let mut fired = Vec::new();
        for watched in self.regions.lock().iter_mut() {
            let inside = watched.region.contains(&position);
            if inside && !watched.inside {
                fired.push((watched.region.id.clone(), watched.on_enter.clone()));
            }
            watched.inside = inside;
        }

        // Callbacks run without the lock held
        for (region_id, on_enter) in fired {
            debug!(region_id, position = %position, "Simulated region entered");
            on_enter(region_id);
        }
    }
}

impl ProximityService for SimulatedProximityService {
    fn register(
        &self,
        region: ProximityRegion,
        on_enter: EnterCallback,
    ) -> BoxFuture<'_, Result<(), ProximityError>> {
        if let Some(reason) = &self.reject_with {
            let err = ProximityError::Rejected(reason.clone());
            return Box::pin(async move { Err(err) });
        }

        let last_position = *self.last_position.lock();
        let inside = last_position.is_some_and(|p| region.contains(&p));
        let region_id = region.id.clone();

        {
            let mut regions = self.regions.lock();
            regions.retain(|w| w.region.id != region.id);
            regions.push(WatchedRegion {
                region,
                on_enter: on_enter.clone(),
                inside,
            });
        }

        if inside {
            debug!(region_id, "Initial trigger: already inside region");
            on_enter(region_id);
        }
        Box::pin(async { Ok(()) })
    }

    fn deregister(&self, region_id: &str) -> BoxFuture<'_, Result<(), ProximityError>> {
        self.regions.lock().retain(|w| w.region.id != region_id);
        Box::pin(async { Ok(()) })
    }
}
