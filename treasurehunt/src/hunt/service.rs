//! Single-owner event loop hosting the hunt controller.
//!
//! [`HuntService::run`] owns every piece of mutable hunt state. Producers
//! (location feed, sensors, proximity callbacks, the UI) talk to it only
//! through a cloneable [`HuntHandle`]; timers and collaborator calls run as
//! spawned tasks whose results re-enter the same queue.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::controller::{Effect, HuntController, Plan};
use super::events::{HuntCommand, HuntEvent, SensorSample, UiOutput};
use super::state::HuntId;
use crate::auth::Authorization;
use crate::config::HuntConfig;
use crate::coord::{Position, TargetLocation};
use crate::error::HuntError;
use crate::geocode::{resolve_label, Geocoder};
use crate::heading::{HeadingEstimator, HeadingUpdate};
use crate::position::PositionTracker;
use crate::proximity::{ProximityService, ProximityTriggerManager, ProximityWorker};

/// How long shutdown waits for queued proximity removals.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// External capabilities the hunt service depends on.
#[derive(Clone)]
pub struct Collaborators {
    pub proximity: Arc<dyn ProximityService>,
    pub geocoder: Arc<dyn Geocoder>,
    pub authorization: Arc<dyn Authorization>,
}

/// Sending side of the hunt event queue.
///
/// Every method fails with [`HuntError::ServiceStopped`] once the service
/// has shut down.
#[derive(Debug, Clone)]
pub struct HuntHandle {
    events: mpsc::UnboundedSender<HuntEvent>,
}

impl HuntHandle {
    /// A handle and the receiving end of its queue, without a service.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<HuntEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { events: tx }, rx)
    }

    pub fn send(&self, event: HuntEvent) -> Result<(), HuntError> {
        self.events
            .send(event)
            .map_err(|_| HuntError::ServiceStopped)
    }

    pub fn start_hunt(&self) -> Result<(), HuntError> {
        self.send(HuntEvent::Command(HuntCommand::Start))
    }

    pub fn stop_hunt(&self) -> Result<(), HuntError> {
        self.send(HuntEvent::Command(HuntCommand::Stop))
    }

    pub fn toggle_hunt(&self) -> Result<(), HuntError> {
        self.send(HuntEvent::Command(HuntCommand::Toggle))
    }

    pub fn request_hint(&self) -> Result<(), HuntError> {
        self.send(HuntEvent::Command(HuntCommand::RequestHint))
    }

    pub fn update_position(&self, position: Position) -> Result<(), HuntError> {
        self.send(HuntEvent::PositionUpdated(position))
    }

    pub fn accelerometer(&self, reading: [f32; 3]) -> Result<(), HuntError> {
        self.send(HuntEvent::Sensor(SensorSample::Accelerometer(reading)))
    }

    pub fn magnetometer(&self, reading: [f32; 3]) -> Result<(), HuntError> {
        self.send(HuntEvent::Sensor(SensorSample::Magnetometer(reading)))
    }

    /// Report that the device entered the region registered for `hunt`
    /// (proximity callback path).
    pub fn region_entered(
        &self,
        hunt: HuntId,
        region_id: impl Into<String>,
    ) -> Result<(), HuntError> {
        self.send(HuntEvent::RegionEntered {
            hunt,
            region_id: region_id.into(),
        })
    }

    /// Whether the service has gone away.
    pub fn is_closed(&self) -> bool {
        self.events.is_closed()
    }
}

/// The hunt event loop.
pub struct HuntService {
    controller: HuntController,
    tracker: PositionTracker,
    heading: HeadingEstimator,
    proximity: ProximityTriggerManager,
    worker: Option<ProximityWorker>,
    geocoder: Arc<dyn Geocoder>,
    events_tx: mpsc::UnboundedSender<HuntEvent>,
    events_rx: mpsc::UnboundedReceiver<HuntEvent>,
    outputs: mpsc::UnboundedSender<UiOutput>,
    ticker: Option<CancellationToken>,
}

impl HuntService {
    /// Create the service, a handle into it and the UI output stream.
    pub fn new(
        config: &HuntConfig,
        collaborators: Collaborators,
    ) -> (Self, HuntHandle, mpsc::UnboundedReceiver<UiOutput>) {
        Self::with_controller(config, collaborators, HuntController::new(config))
    }

    /// Like [`HuntService::new`] with a preconfigured controller (seeded
    /// target generation).
    pub fn with_controller(
        config: &HuntConfig,
        collaborators: Collaborators,
        controller: HuntController,
    ) -> (Self, HuntHandle, mpsc::UnboundedReceiver<UiOutput>) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (outputs_tx, outputs_rx) = mpsc::unbounded_channel();

        let (worker, commands) = ProximityWorker::new(collaborators.proximity, events_tx.clone());
        let proximity = ProximityTriggerManager::new(
            commands,
            collaborators.authorization,
            config.region_radius_m,
        );

        let service = Self {
            controller,
            tracker: PositionTracker::new(),
            heading: HeadingEstimator::new(config.animation_duration),
            proximity,
            worker: Some(worker),
            geocoder: collaborators.geocoder,
            events_tx: events_tx.clone(),
            events_rx,
            outputs: outputs_tx,
            ticker: None,
        };

        (service, HuntHandle { events: events_tx }, outputs_rx)
    }

    /// Another handle into this service's queue.
    pub fn handle(&self) -> HuntHandle {
        HuntHandle {
            events: self.events_tx.clone(),
        }
    }

    /// Process events until `shutdown` is cancelled.
    ///
    /// On shutdown the countdown stops and any armed region is removed
    /// best-effort before the proximity worker is drained.
    pub async fn run(mut self, shutdown: CancellationToken) {
        info!("Hunt service started");

        let worker_handle: Option<JoinHandle<()>> =
            self.worker.take().map(|worker| tokio::spawn(worker.run()));

        loop {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    info!("Hunt service shutting down");
                    break;
                }

                event = self.events_rx.recv() => {
                    let Some(event) = event else { break };
                    self.dispatch(event);
                }
            }
        }

        self.cancel_ticker();
        self.proximity.disarm();
        // Dropping the manager closes the command queue; the worker drains it
        drop(self);

        if let Some(handle) = worker_handle {
            if tokio::time::timeout(SHUTDOWN_GRACE, handle).await.is_err() {
                warn!("Proximity worker did not finish before shutdown grace period");
            }
        }
        info!("Hunt service stopped");
    }

    fn dispatch(&mut self, event: HuntEvent) {
        let plan = match event {
            HuntEvent::Command(command) => {
                debug!(command = ?command, "Hunt command");
                self.controller.handle_command(command, &self.tracker)
            }
            HuntEvent::PositionUpdated(position) => {
                self.tracker.update(position);
                Plan::default()
            }
            HuntEvent::Sensor(SensorSample::Accelerometer(reading)) => {
                let update = self.heading.on_accelerometer_sample(reading);
                self.animate(update)
            }
            HuntEvent::Sensor(SensorSample::Magnetometer(reading)) => {
                let update = self.heading.on_magnetometer_sample(reading);
                self.animate(update)
            }
            HuntEvent::AnimationFinished => {
                let update = self.heading.on_animation_complete();
                self.animate(update)
            }
            HuntEvent::RegionEntered { hunt, region_id } => {
                match self.proximity.on_region_entered(hunt, &region_id) {
                    Some(hunt) => self.controller.on_region_entered(hunt),
                    None => Plan::default(),
                }
            }
            HuntEvent::RegistrationFinished { hunt, result } => {
                self.proximity.on_registered(hunt, &result);
                self.controller.on_registration(hunt, result, &self.tracker)
            }
            HuntEvent::DeregistrationFinished { region_id, result } => {
                debug!(region_id, "Deregistration finished");
                self.proximity.on_deregistered(result);
                Plan::default()
            }
            HuntEvent::CountdownTick { hunt } => self.controller.on_tick(hunt),
            HuntEvent::PlaceResolved { hunt, target, label } => {
                self.controller.on_place_resolved(hunt, target, label)
            }
        };
        self.execute(plan);
    }

    fn execute(&mut self, plan: Plan) {
        for effect in plan {
            match effect {
                Effect::Arm { hunt, target } => {
                    if let Err(err) = self.proximity.arm(hunt, target) {
                        // Surfaced through the same path as a service rejection
                        self.post(HuntEvent::RegistrationFinished {
                            hunt,
                            result: Err(err),
                        });
                    }
                }
                Effect::Disarm => self.proximity.disarm(),
                Effect::StartCountdown { hunt, tick } => self.start_ticker(hunt, tick),
                Effect::CancelCountdown => self.cancel_ticker(),
                Effect::ResolvePlace { hunt, target } => self.resolve_place(hunt, target),
                Effect::Emit(output) => self.emit(output),
            }
        }
    }

    /// Show a heading update and schedule its completion.
    fn animate(&self, update: Option<HeadingUpdate>) -> Plan {
        let mut plan = Plan::default();
        let Some(update) = update else {
            return plan;
        };

        let events = self.events_tx.clone();
        let duration = update.duration;
        tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            if events.send(HuntEvent::AnimationFinished).is_err() {
                debug!("Hunt service gone, dropping animation completion");
            }
        });

        plan.emit(UiOutput::Heading(update));
        plan
    }

    fn start_ticker(&mut self, hunt: HuntId, tick: Duration) {
        self.cancel_ticker();

        let token = CancellationToken::new();
        let cancelled = token.clone();
        let events = self.events_tx.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + tick, tick);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;

                    _ = cancelled.cancelled() => break,

                    _ = interval.tick() => {
                        if events.send(HuntEvent::CountdownTick { hunt }).is_err() {
                            break;
                        }
                    }
                }
            }
            debug!(hunt = %hunt, "Countdown ticker stopped");
        });
        self.ticker = Some(token);
    }

    fn cancel_ticker(&mut self) {
        if let Some(token) = self.ticker.take() {
            token.cancel();
        }
    }

    fn resolve_place(&self, hunt: HuntId, target: TargetLocation) {
        let geocoder = Arc::clone(&self.geocoder);
        let events = self.events_tx.clone();
        tokio::spawn(async move {
            let label = resolve_label(&*geocoder, target.position()).await;
            if events
                .send(HuntEvent::PlaceResolved {
                    hunt,
                    target,
                    label,
                })
                .is_err()
            {
                debug!(hunt = %hunt, "Hunt service gone, dropping place lookup");
            }
        });
    }

    fn emit(&self, output: UiOutput) {
        if self.outputs.send(output).is_err() {
            debug!("UI output receiver dropped");
        }
    }

    fn post(&self, event: HuntEvent) {
        if self.events_tx.send(event).is_err() {
            debug!("Hunt service gone, dropping event");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Capability, StaticAuthorization};
    use crate::geocode::GeocodeError;
    use crate::heading::sensor_pair_for_heading;
    use crate::hunt::{Affordance, HuntOutcome, HuntStatus};
    use crate::proximity::{EnterCallback, ProximityError, ProximityRegion, TREASURE_REGION_ID};
    use futures::future::BoxFuture;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct FakeProximity {
        calls: Mutex<Vec<String>>,
        callbacks: Mutex<Vec<(String, EnterCallback)>>,
        /// Every callback ever handed over, including deregistered ones.
        registrations: Mutex<Vec<EnterCallback>>,
    }

    impl FakeProximity {
        fn enter(&self) {
            for (region_id, callback) in self.callbacks.lock().iter() {
                callback(region_id.clone());
            }
        }

        /// Fire the callback of the `index`th registration, live or not.
        fn replay(&self, index: usize) {
            let callback = self.registrations.lock()[index].clone();
            callback(TREASURE_REGION_ID.to_string());
        }
    }

    impl ProximityService for FakeProximity {
        fn register(
            &self,
            region: ProximityRegion,
            on_enter: EnterCallback,
        ) -> BoxFuture<'_, Result<(), ProximityError>> {
            self.calls.lock().push(format!("register {}", region.id));
            self.registrations.lock().push(on_enter.clone());
            self.callbacks.lock().push((region.id, on_enter));
            Box::pin(async { Ok(()) })
        }

        fn deregister(&self, region_id: &str) -> BoxFuture<'_, Result<(), ProximityError>> {
            self.calls.lock().push(format!("deregister {}", region_id));
            self.callbacks.lock().retain(|(id, _)| id != region_id);
            Box::pin(async { Ok(()) })
        }
    }

    struct FixedGeocoder(Result<Option<String>, GeocodeError>);

    impl Geocoder for FixedGeocoder {
        fn reverse_geocode(
            &self,
            _position: Position,
        ) -> BoxFuture<'_, Result<Option<String>, GeocodeError>> {
            let result = self.0.clone();
            Box::pin(async move { result })
        }
    }

    struct Harness {
        handle: HuntHandle,
        outputs: mpsc::UnboundedReceiver<UiOutput>,
        proximity: Arc<FakeProximity>,
        shutdown: CancellationToken,
        task: JoinHandle<()>,
    }

    fn spawn_service(config: HuntConfig, authorization: Arc<StaticAuthorization>) -> Harness {
        let proximity = Arc::new(FakeProximity::default());
        let collaborators = Collaborators {
            proximity: proximity.clone(),
            geocoder: Arc::new(FixedGeocoder(Ok(Some("1 Main St".into())))),
            authorization,
        };
        let controller = HuntController::with_seed(&config, 7);
        let (service, handle, outputs) =
            HuntService::with_controller(&config, collaborators, controller);
        let shutdown = CancellationToken::new();
        let task = tokio::spawn(service.run(shutdown.clone()));
        Harness {
            handle,
            outputs,
            proximity,
            shutdown,
            task,
        }
    }

    fn short_config() -> HuntConfig {
        HuntConfig::default().with_hunt_duration(Duration::from_secs(3))
    }

    async fn next_matching(
        outputs: &mut mpsc::UnboundedReceiver<UiOutput>,
        mut wanted: impl FnMut(&UiOutput) -> bool,
    ) -> Vec<UiOutput> {
        let mut seen = Vec::new();
        while let Some(output) = outputs.recv().await {
            let done = wanted(&output);
            seen.push(output);
            if done {
                return seen;
            }
        }
        panic!("output stream closed before match; saw {:?}", seen);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_without_fix_reports_error() {
        let mut h = spawn_service(short_config(), Arc::new(StaticAuthorization::granted()));

        h.handle.start_hunt().unwrap();
        assert_eq!(
            h.outputs.recv().await,
            Some(UiOutput::Error(HuntError::NoPositionFix))
        );
        assert!(h.proximity.calls.lock().is_empty());

        h.shutdown.cancel();
        h.task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_found_flow_places_marker_once() {
        let mut h = spawn_service(short_config(), Arc::new(StaticAuthorization::granted()));

        h.handle.update_position(Position::new(40.0, -74.0)).unwrap();
        h.handle.start_hunt().unwrap();
        let started = next_matching(&mut h.outputs, |o| {
            matches!(o, UiOutput::Status(HuntStatus::BeginSearch))
        })
        .await;
        assert!(started.iter().all(|o| !matches!(o, UiOutput::Error(_))));

        h.proximity.enter();
        h.proximity.enter();

        let ended = next_matching(&mut h.outputs, |o| matches!(o, UiOutput::PlaceMarker { .. })).await;
        assert_eq!(
            ended
                .iter()
                .filter(|o| **o == UiOutput::Status(HuntStatus::Found))
                .count(),
            1
        );
        assert!(ended.contains(&UiOutput::Affordance(Affordance::StartHunt)));
        match ended.last() {
            Some(UiOutput::PlaceMarker { label, .. }) => assert_eq!(label, "1 Main St"),
            other => panic!("expected marker, got {:?}", other),
        }

        h.shutdown.cancel();
        h.task.await.unwrap();
        assert_eq!(
            *h.proximity.calls.lock(),
            vec!["register TreasureLocation", "deregister TreasureLocation"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_entry_from_previous_hunt_is_ignored() {
        let config = HuntConfig::default().with_hunt_duration(Duration::from_secs(30));
        let mut h = spawn_service(config, Arc::new(StaticAuthorization::granted()));

        h.handle.update_position(Position::new(40.0, -74.0)).unwrap();
        h.handle.start_hunt().unwrap();
        next_matching(&mut h.outputs, |o| {
            matches!(o, UiOutput::Status(HuntStatus::BeginSearch))
        })
        .await;
        h.proximity.replay(0);
        next_matching(&mut h.outputs, |o| matches!(o, UiOutput::PlaceMarker { .. })).await;

        h.handle.start_hunt().unwrap();
        next_matching(&mut h.outputs, |o| {
            matches!(o, UiOutput::Status(HuntStatus::BeginSearch))
        })
        .await;

        // Duplicate entry from the first hunt's registration
        h.proximity.replay(0);
        tokio::time::sleep(Duration::from_millis(100)).await;
        while let Ok(output) = h.outputs.try_recv() {
            assert!(
                !matches!(output, UiOutput::Status(HuntStatus::Found) | UiOutput::Finished(_)),
                "second hunt ended by a stale entry: {:?}",
                output
            );
        }

        // The second hunt's own registration still wins it
        h.proximity.replay(1);
        let ended = next_matching(&mut h.outputs, |o| matches!(o, UiOutput::Finished(_))).await;
        match ended.last() {
            Some(UiOutput::Finished(summary)) => {
                assert_eq!(summary.hunt, HuntId::new(2));
                assert_eq!(summary.outcome, HuntOutcome::Found);
            }
            other => panic!("expected summary, got {:?}", other),
        }

        h.shutdown.cancel();
        h.task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_countdown_times_out() {
        let mut h = spawn_service(short_config(), Arc::new(StaticAuthorization::granted()));

        h.handle.update_position(Position::new(1.0, 1.0)).unwrap();
        h.handle.start_hunt().unwrap();

        let seen = next_matching(&mut h.outputs, |o| {
            matches!(o, UiOutput::Status(HuntStatus::TimesUp))
        })
        .await;
        let remaining: Vec<u64> = seen
            .iter()
            .filter_map(|o| match o {
                UiOutput::RemainingTime(d) => Some(d.as_secs()),
                _ => None,
            })
            .collect();
        assert_eq!(remaining, vec![3, 2, 1]);

        next_matching(&mut h.outputs, |o| matches!(o, UiOutput::Finished(_))).await;

        h.shutdown.cancel();
        h.task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_denied_proximity_authorization_blocks_start() {
        let authorization = Arc::new(StaticAuthorization::granted());
        authorization.set(Capability::Proximity, false);
        let mut h = spawn_service(short_config(), authorization);

        h.handle.update_position(Position::new(1.0, 1.0)).unwrap();
        h.handle.start_hunt().unwrap();

        let seen = next_matching(&mut h.outputs, |o| matches!(o, UiOutput::Error(_))).await;
        assert_eq!(
            seen.last(),
            Some(&UiOutput::Error(HuntError::AuthorizationDenied(
                Capability::Proximity
            )))
        );

        // Back to idle: a second start is not rejected as in progress
        h.handle.start_hunt().unwrap();
        let seen = next_matching(&mut h.outputs, |o| matches!(o, UiOutput::Error(_))).await;
        assert_ne!(seen.last(), Some(&UiOutput::Error(HuntError::HuntInProgress)));

        h.shutdown.cancel();
        h.task.await.unwrap();
        assert!(h.proximity.calls.lock().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_heading_samples_coalesce_during_animation() {
        let mut h = spawn_service(short_config(), Arc::new(StaticAuthorization::granted()));

        let (a, m) = sensor_pair_for_heading(10.0);
        h.handle.accelerometer(a).unwrap();
        h.handle.magnetometer(m).unwrap();
        for heading in [20.0, 30.0, 40.0] {
            let (a, m) = sensor_pair_for_heading(heading);
            h.handle.accelerometer(a).unwrap();
            h.handle.magnetometer(m).unwrap();
        }

        let first = h.outputs.recv().await;
        assert!(matches!(first, Some(UiOutput::Heading(u)) if (u.heading - 10.0).abs() < 0.1));

        // Exactly one deferred update after the 500 ms animation
        let second = h.outputs.recv().await;
        assert!(matches!(second, Some(UiOutput::Heading(u)) if (u.heading - 40.0).abs() < 0.1));

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(h.outputs.try_recv().is_err());

        h.shutdown.cancel();
        h.task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_handle_reports_stopped_service() {
        let h = spawn_service(short_config(), Arc::new(StaticAuthorization::granted()));
        let handle = h.handle.clone();
        drop(h.handle);

        h.shutdown.cancel();
        h.task.await.unwrap();

        assert!(handle.is_closed());
        assert_eq!(handle.start_hunt(), Err(HuntError::ServiceStopped));
    }
}
