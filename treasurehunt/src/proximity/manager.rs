//! Bookkeeping for the single armed treasure region.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::{ProximityCommand, ProximityError, ProximityRegion};
use crate::auth::{require, Authorization, Capability};
use crate::coord::TargetLocation;
use crate::error::HuntError;
use crate::hunt::HuntId;

/// The region currently armed and the hunt it belongs to.
#[derive(Debug, Clone)]
struct ArmedRegion {
    hunt: HuntId,
    region: ProximityRegion,
}

/// Translates hunt start/stop into proximity service requests.
///
/// At most one region is armed at a time: arming always replaces the
/// previous region. Removal is fire-and-forget; failures are logged and never
/// reach the player.
pub struct ProximityTriggerManager {
    commands: mpsc::UnboundedSender<ProximityCommand>,
    authorization: Arc<dyn Authorization>,
    radius_m: f32,
    armed: Option<ArmedRegion>,
    /// Region whose removal has been requested but not yet confirmed.
    releasing: Option<String>,
}

impl std::fmt::Debug for ProximityTriggerManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProximityTriggerManager")
            .field("radius_m", &self.radius_m)
            .field("armed", &self.armed)
            .field("releasing", &self.releasing)
            .finish_non_exhaustive()
    }
}

impl ProximityTriggerManager {
    pub fn new(
        commands: mpsc::UnboundedSender<ProximityCommand>,
        authorization: Arc<dyn Authorization>,
        radius_m: f32,
    ) -> Self {
        Self {
            commands,
            authorization,
            radius_m,
            armed: None,
            releasing: None,
        }
    }

    /// Arm the treasure region for `hunt` around `target`.
    ///
    /// Any previously armed region is released first. The registration result
    /// arrives later as a hunt event.
    pub fn arm(&mut self, hunt: HuntId, target: TargetLocation) -> Result<(), HuntError> {
        require(&*self.authorization, Capability::Proximity)?;

        if let Some(previous) = self.armed.take() {
            debug!(hunt = %previous.hunt, "Replacing armed region");
            self.release(previous.region);
        }

        let region = ProximityRegion::treasure(target, self.radius_m);
        self.commands
            .send(ProximityCommand::Register {
                hunt,
                region: region.clone(),
            })
            .map_err(|_| HuntError::RegistrationFailed("proximity worker stopped".to_string()))?;

        info!(
            hunt = %hunt,
            center = %region.center,
            radius_m = region.radius_m,
            "Arming treasure region"
        );
        self.armed = Some(ArmedRegion { hunt, region });
        Ok(())
    }

    /// Request removal of the armed region, if any. Never fails.
    pub fn disarm(&mut self) {
        match self.armed.take() {
            Some(armed) => {
                debug!(hunt = %armed.hunt, "Disarming treasure region");
                self.release(armed.region);
            }
            None => debug!("Disarm with no armed region"),
        }
    }

    /// Apply the outcome of a registration request.
    ///
    /// A failed registration leaves nothing armed.
    pub fn on_registered(&mut self, hunt: HuntId, result: &Result<(), HuntError>) {
        if result.is_err() && self.armed_hunt() == Some(hunt) {
            self.armed = None;
        }
    }

    /// Apply the outcome of a deregistration request.
    pub fn on_deregistered(&mut self, result: Result<(), ProximityError>) {
        match result {
            Ok(()) => debug!("Treasure region removed"),
            Err(e) => {
                let err = HuntError::DeregistrationFailed(e.to_string());
                warn!(error = %err, "Proximity cleanup failed");
            }
        }
        self.releasing = None;
    }

    /// Accept an "entered" notification only if it comes from the
    /// registration that is armed now.
    ///
    /// Every hunt uses the same region id, so the hunt carried by the
    /// notification is what separates a late entry for an earlier hunt from
    /// a real one.
    pub fn on_region_entered(&self, hunt: HuntId, region_id: &str) -> Option<HuntId> {
        match &self.armed {
            Some(armed) if armed.hunt == hunt && armed.region.id == region_id => Some(hunt),
            Some(armed) if armed.region.id == region_id => {
                debug!(
                    hunt = %hunt,
                    armed_hunt = %armed.hunt,
                    "Entered notification from an earlier registration"
                );
                None
            }
            _ => {
                debug!(
                    hunt = %hunt,
                    region_id,
                    "Entered notification for a region that is not armed"
                );
                None
            }
        }
    }

    pub fn armed_hunt(&self) -> Option<HuntId> {
        self.armed.as_ref().map(|a| a.hunt)
    }

    pub fn armed_region(&self) -> Option<&ProximityRegion> {
        self.armed.as_ref().map(|a| &a.region)
    }

    /// Number of armed regions (0 or 1).
    pub fn armed_count(&self) -> usize {
        self.armed.iter().count()
    }

    /// Whether a removal is still awaiting confirmation.
    pub fn is_releasing(&self) -> bool {
        self.releasing.is_some()
    }

    fn release(&mut self, region: ProximityRegion) {
        if !self.authorization.is_authorized(Capability::Proximity) {
            debug!(region_id = %region.id, "Proximity authorization missing, removal dropped");
            return;
        }

        let region_id = region.id;
        if self
            .commands
            .send(ProximityCommand::Deregister {
                region_id: region_id.clone(),
            })
            .is_err()
        {
            let err = HuntError::DeregistrationFailed("proximity worker stopped".to_string());
            warn!(error = %err, "Proximity cleanup failed");
            return;
        }
        self.releasing = Some(region_id);
    }
}
