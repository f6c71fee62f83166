//! FIFO executor for proximity service requests.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::{EnterCallback, ProximityRegion, ProximityService};
use crate::error::HuntError;
use crate::hunt::{HuntEvent, HuntId};

/// A request for the proximity service.
#[derive(Debug, Clone)]
pub enum ProximityCommand {
    Register {
        hunt: HuntId,
        region: ProximityRegion,
    },
    Deregister {
        region_id: String,
    },
}

/// Executes proximity commands one at a time, in submission order.
///
/// Results and "entered" notifications are posted back onto the hunt event
/// queue. The worker exits once every command sender is dropped and the
/// queue is drained, so removals issued during shutdown still go out.
pub struct ProximityWorker {
    service: Arc<dyn ProximityService>,
    commands: mpsc::UnboundedReceiver<ProximityCommand>,
    events: mpsc::UnboundedSender<HuntEvent>,
}

impl ProximityWorker {
    /// Creates a worker and the sender used to submit commands to it.
    pub fn new(
        service: Arc<dyn ProximityService>,
        events: mpsc::UnboundedSender<HuntEvent>,
    ) -> (Self, mpsc::UnboundedSender<ProximityCommand>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                service,
                commands: rx,
                events,
            },
            tx,
        )
    }

    pub async fn run(mut self) {
        debug!("Proximity worker started");
        while let Some(command) = self.commands.recv().await {
            self.execute(command).await;
        }
        debug!("Proximity worker stopped");
    }

    async fn execute(&self, command: ProximityCommand) {
        match command {
            ProximityCommand::Register { hunt, region } => {
                let region_id = region.id.clone();
                let result = self
                    .service
                    .register(region, self.enter_callback(hunt))
                    .await
                    .map_err(|e| HuntError::RegistrationFailed(e.to_string()));

                match &result {
                    Ok(()) => info!(hunt = %hunt, region_id, "Treasure region registered"),
                    Err(e) => warn!(hunt = %hunt, region_id, error = %e, "Registration failed"),
                }
                self.post(HuntEvent::RegistrationFinished { hunt, result });
            }
            ProximityCommand::Deregister { region_id } => {
                let result = self.service.deregister(&region_id).await;
                self.post(HuntEvent::DeregistrationFinished { region_id, result });
            }
        }
    }

    /// Callback bound to the hunt that registered the region, so entries
    /// reported late for an old registration can be told apart.
    fn enter_callback(&self, hunt: HuntId) -> EnterCallback {
        let events = self.events.clone();
        Arc::new(move |region_id: String| {
            if events
                .send(HuntEvent::RegionEntered { hunt, region_id })
                .is_err()
            {
                debug!("Hunt service gone, dropping entered notification");
            }
        })
    }

    fn post(&self, event: HuntEvent) {
        if self.events.send(event).is_err() {
            debug!("Hunt service gone, dropping proximity result");
        }
    }
}
