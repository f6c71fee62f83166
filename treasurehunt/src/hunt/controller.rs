//! The hunt session state machine.
//!
//! [`HuntController`] is synchronous and performs no I/O. Each input returns a
//! [`Plan`]: the ordered list of effects (arm, countdown, marker lookup, UI
//! output) that the hunt service executes afterwards.

use std::time::Duration;

use chrono::Local;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use super::countdown::{Countdown, CountdownStep};
use super::events::{Affordance, HuntCommand, HuntStatus, HuntSummary, UiOutput};
use super::state::{HuntId, HuntOutcome, HuntPhase, HuntState, MarkerState};
use crate::config::HuntConfig;
use crate::coord::{generate_target, hint, TargetLocation};
use crate::error::HuntError;
use crate::position::PositionTracker;

/// A side effect requested by the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Arm the treasure region for `hunt`.
    Arm { hunt: HuntId, target: TargetLocation },
    /// Request removal of the armed region (best-effort).
    Disarm,
    /// Start ticking the countdown for `hunt`.
    StartCountdown { hunt: HuntId, tick: Duration },
    /// Cancel any pending countdown tick.
    CancelCountdown,
    /// Reverse geocode the target and report back for the marker.
    ResolvePlace { hunt: HuntId, target: TargetLocation },
    /// Send an output to the user-facing surface.
    Emit(UiOutput),
}

/// Ordered effects produced by one controller step.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Plan {
    effects: Vec<Effect>,
}

impl Plan {
    pub fn push(&mut self, effect: Effect) {
        self.effects.push(effect);
    }

    pub fn emit(&mut self, output: UiOutput) {
        self.effects.push(Effect::Emit(output));
    }

    pub fn extend(&mut self, other: Plan) {
        self.effects.extend(other.effects);
    }

    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }

    /// UI outputs in this plan, in order.
    pub fn outputs(&self) -> impl Iterator<Item = &UiOutput> {
        self.effects.iter().filter_map(|e| match e {
            Effect::Emit(output) => Some(output),
            _ => None,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }
}

impl IntoIterator for Plan {
    type Item = Effect;
    type IntoIter = std::vec::IntoIter<Effect>;

    fn into_iter(self) -> Self::IntoIter {
        self.effects.into_iter()
    }
}

/// Owns hunt lifecycle, target generation, countdown and hint computation.
///
/// Starting while a hunt is arming or active is rejected with
/// [`HuntError::HuntInProgress`]; use [`HuntCommand::Toggle`] or
/// [`HuntCommand::Stop`] to end it first.
#[derive(Debug)]
pub struct HuntController {
    state: HuntState,
    marker: MarkerState,
    last_hunt: u64,
    rng: StdRng,
    hunt_duration: Duration,
    tick_interval: Duration,
    max_offset_deg: f64,
}

impl HuntController {
    pub fn new(config: &HuntConfig) -> Self {
        Self::with_rng(config, StdRng::from_os_rng())
    }

    /// Deterministic target generation (simulation, tests).
    pub fn with_seed(config: &HuntConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: &HuntConfig, rng: StdRng) -> Self {
        Self {
            state: HuntState::Idle,
            marker: MarkerState::Absent,
            last_hunt: 0,
            rng,
            hunt_duration: config.hunt_duration,
            tick_interval: config.tick_interval,
            max_offset_deg: config.max_offset_deg,
        }
    }

    pub fn state(&self) -> &HuntState {
        &self.state
    }

    pub fn phase(&self) -> HuntPhase {
        self.state.phase()
    }

    pub fn marker(&self) -> MarkerState {
        self.marker
    }

    /// Dispatch a user command. Rejections become [`UiOutput::Error`].
    pub fn handle_command(&mut self, command: HuntCommand, tracker: &PositionTracker) -> Plan {
        match command {
            HuntCommand::Start => self.start(tracker).unwrap_or_else(Self::rejected),
            HuntCommand::Stop => self.stop(),
            HuntCommand::Toggle if self.state.is_running() => self.stop(),
            HuntCommand::Toggle => self.start(tracker).unwrap_or_else(Self::rejected),
            HuntCommand::RequestHint => self.request_hint(tracker),
        }
    }

    /// Begin a hunt around the current fix.
    ///
    /// Generates the target, clears any previous marker and asks for the
    /// region to be armed. The hunt becomes active once registration is
    /// confirmed through [`HuntController::on_registration`].
    pub fn start(&mut self, tracker: &PositionTracker) -> Result<Plan, HuntError> {
        if self.state.is_running() {
            return Err(HuntError::HuntInProgress);
        }
        let origin = tracker.current()?;

        let target = generate_target(origin, self.max_offset_deg, &mut self.rng);
        self.last_hunt += 1;
        let hunt = HuntId::new(self.last_hunt);

        let mut plan = Plan::default();
        if self.marker != MarkerState::Absent {
            self.marker = MarkerState::Absent;
            plan.emit(UiOutput::RemoveMarker);
        }
        plan.push(Effect::Arm { hunt, target });

        info!(hunt = %hunt, origin = %origin, "Hunt arming");
        self.state = HuntState::Arming {
            hunt,
            target,
            entered_early: false,
        };
        Ok(plan)
    }

    /// Apply the proximity service's answer to an arm request.
    pub fn on_registration(
        &mut self,
        hunt: HuntId,
        result: Result<(), HuntError>,
        tracker: &PositionTracker,
    ) -> Plan {
        let (target, entered_early) = match &self.state {
            HuntState::Arming {
                hunt: current,
                target,
                entered_early,
            } if *current == hunt => (*target, *entered_early),
            _ => {
                debug!(hunt = %hunt, "Registration result for a superseded hunt");
                return Plan::default();
            }
        };

        let mut plan = Plan::default();
        match result {
            Err(err) => {
                warn!(hunt = %hunt, error = %err, "Hunt could not start");
                self.state = HuntState::Idle;
                plan.emit(UiOutput::Error(err));
                plan.emit(UiOutput::Affordance(Affordance::StartHunt));
            }
            Ok(()) => {
                let countdown = Countdown::new(self.hunt_duration, self.tick_interval);
                plan.push(Effect::StartCountdown {
                    hunt,
                    tick: self.tick_interval,
                });
                plan.emit(UiOutput::Status(HuntStatus::BeginSearch));
                plan.emit(UiOutput::Affordance(Affordance::EndHunt));
                plan.emit(UiOutput::RemainingTime(countdown.remaining()));
                if let Ok(current) = tracker.current() {
                    plan.emit(UiOutput::Hint(hint(target.position(), current)));
                }

                info!(
                    hunt = %hunt,
                    duration_secs = countdown.total().as_secs(),
                    "Hunt started"
                );
                self.state = HuntState::Active {
                    hunt,
                    target,
                    countdown,
                    started_at: Local::now(),
                };

                if entered_early {
                    debug!(hunt = %hunt, "Applying entry reported before registration");
                    plan.extend(self.finish(HuntOutcome::Found));
                }
            }
        }
        plan
    }

    /// The region armed for `hunt` was entered.
    ///
    /// Only the first notification for an active hunt ends it; repeats are
    /// no-ops against the ended session.
    pub fn on_region_entered(&mut self, hunt: HuntId) -> Plan {
        if self.state.hunt() != Some(hunt) {
            debug!(hunt = %hunt, "Entered notification for another hunt");
            return Plan::default();
        }

        match self.state.phase() {
            HuntPhase::Active => self.finish(HuntOutcome::Found),
            HuntPhase::Arming => {
                if let HuntState::Arming { entered_early, .. } = &mut self.state {
                    *entered_early = true;
                }
                Plan::default()
            }
            phase => {
                debug!(hunt = %hunt, phase = %phase, "Entered notification ignored");
                Plan::default()
            }
        }
    }

    /// One countdown tick for `hunt`.
    pub fn on_tick(&mut self, hunt: HuntId) -> Plan {
        let HuntState::Active {
            hunt: current,
            countdown,
            ..
        } = &mut self.state
        else {
            return Plan::default();
        };
        if *current != hunt {
            return Plan::default();
        }

        match countdown.tick() {
            CountdownStep::Running(remaining) => {
                let mut plan = Plan::default();
                plan.emit(UiOutput::RemainingTime(remaining));
                plan
            }
            CountdownStep::Expired => self.finish(HuntOutcome::TimedOut),
            CountdownStep::Finished => Plan::default(),
        }
    }

    /// Explicit stop from the player.
    pub fn stop(&mut self) -> Plan {
        match &self.state {
            HuntState::Active { .. } => self.finish(HuntOutcome::Stopped),
            HuntState::Arming { hunt, .. } => {
                info!(hunt = %hunt, "Hunt cancelled before it was armed");
                self.state = HuntState::Idle;

                let mut plan = Plan::default();
                plan.push(Effect::Disarm);
                plan.emit(UiOutput::Status(HuntStatus::Ended));
                plan.emit(UiOutput::Affordance(Affordance::StartHunt));
                plan
            }
            _ => {
                debug!("Stop with no running hunt");
                Plan::default()
            }
        }
    }

    /// Surface the current hint, if a target and a fix exist.
    pub fn request_hint(&self, tracker: &PositionTracker) -> Plan {
        let mut plan = Plan::default();
        match (self.state.target(), tracker.current()) {
            (Some(target), Ok(current)) => {
                plan.emit(UiOutput::Hint(hint(target.position(), current)));
            }
            _ => debug!("Hint requested without a target and a fix"),
        }
        plan
    }

    /// A place description for the marker of `hunt` is available.
    pub fn on_place_resolved(&mut self, hunt: HuntId, target: TargetLocation, label: String) -> Plan {
        let mut plan = Plan::default();
        if self.marker != MarkerState::Resolving(hunt) {
            debug!(hunt = %hunt, "Dropping place lookup for a superseded hunt");
            return plan;
        }

        self.marker = MarkerState::Placed(hunt);
        plan.emit(UiOutput::PlaceMarker {
            position: target.position(),
            label,
        });
        plan
    }

    fn rejected(err: HuntError) -> Plan {
        info!(error = %err, "Hunt start rejected");
        let mut plan = Plan::default();
        plan.emit(UiOutput::Error(err));
        plan
    }

    /// Shared cleanup for every terminal transition out of `Active`.
    fn finish(&mut self, outcome: HuntOutcome) -> Plan {
        let (hunt, target, countdown, started_at) =
            match std::mem::replace(&mut self.state, HuntState::Idle) {
                HuntState::Active {
                    hunt,
                    target,
                    countdown,
                    started_at,
                } => (hunt, target, countdown, started_at),
                other => {
                    self.state = other;
                    return Plan::default();
                }
            };

        let mut plan = Plan::default();
        plan.push(Effect::Disarm);
        plan.push(Effect::CancelCountdown);
        if self.marker == MarkerState::Absent {
            self.marker = MarkerState::Resolving(hunt);
            plan.push(Effect::ResolvePlace { hunt, target });
        }
        plan.emit(UiOutput::Status(outcome.status()));
        plan.emit(UiOutput::Affordance(Affordance::StartHunt));

        let elapsed_secs = countdown.elapsed().as_secs();
        plan.emit(UiOutput::Finished(HuntSummary {
            hunt,
            outcome,
            target,
            started_at,
            ended_at: Local::now(),
            elapsed_secs,
        }));

        info!(hunt = %hunt, outcome = %outcome, target = %target, elapsed_secs, "Hunt ended");
        self.state = HuntState::Ended {
            hunt,
            target,
            outcome,
        };
        plan
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::Position;

    fn config() -> HuntConfig {
        HuntConfig::default()
            .with_hunt_duration(Duration::from_secs(3))
            .with_tick_interval(Duration::from_secs(1))
    }

    fn tracker_at(lat: f64, lon: f64) -> PositionTracker {
        let mut tracker = PositionTracker::new();
        tracker.update(Position::new(lat, lon));
        tracker
    }

    fn armed_hunt(plan: &Plan) -> (HuntId, TargetLocation) {
        plan.effects()
            .iter()
            .find_map(|e| match e {
                Effect::Arm { hunt, target } => Some((*hunt, *target)),
                _ => None,
            })
            .expect("plan should arm a region")
    }

    /// Start and confirm registration.
    fn active_controller() -> (HuntController, PositionTracker, HuntId, TargetLocation) {
        let tracker = tracker_at(40.0, -74.0);
        let mut controller = HuntController::with_seed(&config(), 1);
        let plan = controller.start(&tracker).unwrap();
        let (hunt, target) = armed_hunt(&plan);
        controller.on_registration(hunt, Ok(()), &tracker);
        assert_eq!(controller.phase(), HuntPhase::Active);
        (controller, tracker, hunt, target)
    }

    fn count_markers(plan: &Plan) -> usize {
        plan.effects()
            .iter()
            .filter(|e| matches!(e, Effect::ResolvePlace { .. }))
            .count()
    }

    #[test]
    fn test_start_without_fix_is_rejected() {
        let mut controller = HuntController::with_seed(&config(), 1);
        let tracker = PositionTracker::new();

        assert_eq!(controller.start(&tracker), Err(HuntError::NoPositionFix));
        assert_eq!(controller.phase(), HuntPhase::Idle);

        let plan = controller.handle_command(HuntCommand::Start, &tracker);
        assert_eq!(
            plan.outputs().collect::<Vec<_>>(),
            vec![&UiOutput::Error(HuntError::NoPositionFix)]
        );
        assert_eq!(controller.phase(), HuntPhase::Idle);
    }

    #[test]
    fn test_start_arms_near_fix() {
        let tracker = tracker_at(40.0, -74.0);
        let mut controller = HuntController::with_seed(&config(), 1);

        let plan = controller.start(&tracker).unwrap();
        let (hunt, target) = armed_hunt(&plan);

        assert_eq!(hunt, HuntId::new(1));
        assert!((target.latitude() - 40.0).abs() < 1.0);
        assert!((target.longitude() + 74.0).abs() < 1.0);
        assert_eq!(controller.phase(), HuntPhase::Arming);
        assert!(plan.outputs().next().is_none(), "nothing shown until armed");
    }

    #[test]
    fn test_registration_success_activates() {
        let tracker = tracker_at(40.0, -74.0);
        let mut controller = HuntController::with_seed(&config(), 1);
        let (hunt, target) = armed_hunt(&controller.start(&tracker).unwrap());

        let plan = controller.on_registration(hunt, Ok(()), &tracker);

        assert!(plan
            .effects()
            .contains(&Effect::StartCountdown { hunt, tick: Duration::from_secs(1) }));
        let outputs: Vec<_> = plan.outputs().cloned().collect();
        assert!(outputs.contains(&UiOutput::Status(HuntStatus::BeginSearch)));
        assert!(outputs.contains(&UiOutput::Affordance(Affordance::EndHunt)));
        assert!(outputs.contains(&UiOutput::RemainingTime(Duration::from_secs(3))));
        assert!(outputs.contains(&UiOutput::Hint(hint(
            target.position(),
            Position::new(40.0, -74.0)
        ))));
        assert_eq!(controller.phase(), HuntPhase::Active);
    }

    #[test]
    fn test_registration_failure_returns_to_idle() {
        let tracker = tracker_at(40.0, -74.0);
        let mut controller = HuntController::with_seed(&config(), 1);
        let (hunt, _) = armed_hunt(&controller.start(&tracker).unwrap());

        let err = HuntError::RegistrationFailed("service busy".into());
        let plan = controller.on_registration(hunt, Err(err.clone()), &tracker);

        assert_eq!(controller.phase(), HuntPhase::Idle);
        assert!(plan.outputs().any(|o| *o == UiOutput::Error(err.clone())));
        assert!(!plan
            .effects()
            .iter()
            .any(|e| matches!(e, Effect::StartCountdown { .. })));
    }

    #[test]
    fn test_second_start_while_active_is_rejected() {
        let (mut controller, tracker, hunt, target) = active_controller();

        assert_eq!(controller.start(&tracker), Err(HuntError::HuntInProgress));
        assert_eq!(controller.state().hunt(), Some(hunt));
        assert_eq!(controller.state().target(), Some(target));
    }

    #[test]
    fn test_second_start_while_arming_is_rejected() {
        let tracker = tracker_at(1.0, 1.0);
        let mut controller = HuntController::with_seed(&config(), 1);
        controller.start(&tracker).unwrap();
        assert_eq!(controller.start(&tracker), Err(HuntError::HuntInProgress));
    }

    #[test]
    fn test_target_reached_is_idempotent() {
        let (mut controller, _tracker, hunt, _) = active_controller();

        let first = controller.on_region_entered(hunt);
        assert_eq!(controller.phase(), HuntPhase::Ended);
        assert!(first.outputs().any(|o| *o == UiOutput::Status(HuntStatus::Found)));
        assert!(first.effects().contains(&Effect::Disarm));
        assert!(first.effects().contains(&Effect::CancelCountdown));

        let second = controller.on_region_entered(hunt);
        assert!(second.is_empty());
        assert_eq!(controller.phase(), HuntPhase::Ended);
    }

    #[test]
    fn test_found_then_timeout_resolves_once() {
        let (mut controller, _tracker, hunt, _) = active_controller();

        let found = controller.on_region_entered(hunt);
        let timeout = controller.on_tick(hunt);

        assert!(!found.is_empty());
        assert!(timeout.is_empty());
        assert!(matches!(
            controller.state(),
            HuntState::Ended { outcome: HuntOutcome::Found, .. }
        ));
    }

    #[test]
    fn test_countdown_expiry_times_out_once() {
        let (mut controller, _tracker, hunt, target) = active_controller();

        let first = controller.on_tick(hunt);
        assert_eq!(
            first.outputs().collect::<Vec<_>>(),
            vec![&UiOutput::RemainingTime(Duration::from_secs(2))]
        );
        controller.on_tick(hunt);

        let expiry = controller.on_tick(hunt);
        assert!(expiry.outputs().any(|o| *o == UiOutput::Status(HuntStatus::TimesUp)));
        assert!(expiry
            .effects()
            .contains(&Effect::ResolvePlace { hunt, target }));
        assert!(matches!(
            controller.state(),
            HuntState::Ended { outcome: HuntOutcome::TimedOut, .. }
        ));

        // A late tick that slipped past cancellation changes nothing
        assert!(controller.on_tick(hunt).is_empty());
    }

    #[test]
    fn test_stop_places_marker_at_target() {
        let (mut controller, _tracker, hunt, target) = active_controller();

        let plan = controller.stop();
        assert_eq!(count_markers(&plan), 1);
        assert!(plan.effects().contains(&Effect::ResolvePlace { hunt, target }));
        assert!(plan.outputs().any(|o| *o == UiOutput::Status(HuntStatus::Ended)));
        assert_eq!(controller.marker(), MarkerState::Resolving(hunt));

        let placed = controller.on_place_resolved(hunt, target, "Main St".into());
        assert_eq!(
            placed.outputs().collect::<Vec<_>>(),
            vec![&UiOutput::PlaceMarker {
                position: target.position(),
                label: "Main St".into()
            }]
        );
        assert_eq!(controller.marker(), MarkerState::Placed(hunt));

        // Duplicate resolution never places a second marker
        assert!(controller
            .on_place_resolved(hunt, target, "Main St".into())
            .is_empty());
    }

    #[test]
    fn test_stop_is_noop_when_idle_or_ended() {
        let mut controller = HuntController::with_seed(&config(), 1);
        assert!(controller.stop().is_empty());

        let (mut controller, _, _, _) = active_controller();
        controller.stop();
        assert!(controller.stop().is_empty());
    }

    #[test]
    fn test_stop_while_arming_disarms_without_marker() {
        let tracker = tracker_at(1.0, 1.0);
        let mut controller = HuntController::with_seed(&config(), 1);
        let (hunt, _) = armed_hunt(&controller.start(&tracker).unwrap());

        let plan = controller.stop();
        assert!(plan.effects().contains(&Effect::Disarm));
        assert_eq!(count_markers(&plan), 0);
        assert_eq!(controller.phase(), HuntPhase::Idle);

        // Late confirmation for the cancelled hunt is ignored
        assert!(controller.on_registration(hunt, Ok(()), &tracker).is_empty());
        assert_eq!(controller.phase(), HuntPhase::Idle);
    }

    #[test]
    fn test_entry_before_registration_wins_on_activation() {
        let tracker = tracker_at(1.0, 1.0);
        let mut controller = HuntController::with_seed(&config(), 1);
        let (hunt, _) = armed_hunt(&controller.start(&tracker).unwrap());

        assert!(controller.on_region_entered(hunt).is_empty());
        let plan = controller.on_registration(hunt, Ok(()), &tracker);

        assert!(plan.outputs().any(|o| *o == UiOutput::Status(HuntStatus::Found)));
        assert_eq!(controller.phase(), HuntPhase::Ended);
    }

    #[test]
    fn test_restart_after_end_replaces_target_and_clears_marker() {
        let (mut controller, tracker, hunt, target) = active_controller();
        controller.stop();
        controller.on_place_resolved(hunt, target, "label".into());

        let plan = controller.start(&tracker).unwrap();
        assert_eq!(plan.outputs().next(), Some(&UiOutput::RemoveMarker));
        let (next_hunt, next_target) = armed_hunt(&plan);
        assert_eq!(next_hunt, HuntId::new(2));
        assert_ne!(next_target, target);
        assert_eq!(controller.marker(), MarkerState::Absent);

        controller.on_registration(next_hunt, Ok(()), &tracker);
        match controller.state() {
            HuntState::Active { countdown, .. } => {
                assert_eq!(countdown.remaining(), Duration::from_secs(3))
            }
            other => panic!("expected active, got {:?}", other),
        }
    }

    #[test]
    fn test_stale_place_after_restart_is_dropped() {
        let (mut controller, tracker, hunt, target) = active_controller();
        controller.stop();
        controller.start(&tracker).unwrap();

        assert!(controller
            .on_place_resolved(hunt, target, "late".into())
            .is_empty());
    }

    #[test]
    fn test_toggle_starts_and_stops() {
        let tracker = tracker_at(5.0, 5.0);
        let mut controller = HuntController::with_seed(&config(), 1);

        let plan = controller.handle_command(HuntCommand::Toggle, &tracker);
        let (hunt, _) = armed_hunt(&plan);
        controller.on_registration(hunt, Ok(()), &tracker);

        controller.handle_command(HuntCommand::Toggle, &tracker);
        assert!(matches!(
            controller.state(),
            HuntState::Ended { outcome: HuntOutcome::Stopped, .. }
        ));
    }

    #[test]
    fn test_hint_request() {
        let idle = HuntController::with_seed(&config(), 1);
        assert!(idle.request_hint(&tracker_at(0.0, 0.0)).is_empty());

        let (controller, tracker, _, target) = active_controller();
        let plan = controller.request_hint(&tracker);
        assert_eq!(
            plan.outputs().collect::<Vec<_>>(),
            vec![&UiOutput::Hint(hint(target.position(), tracker.current().unwrap()))]
        );
    }

    #[test]
    fn test_ticks_for_other_hunts_are_ignored() {
        let (mut controller, _, hunt, _) = active_controller();
        assert!(controller.on_tick(HuntId::new(hunt.value() + 1)).is_empty());
        assert!(controller
            .on_region_entered(HuntId::new(hunt.value() + 1))
            .is_empty());
        assert_eq!(controller.phase(), HuntPhase::Active);
    }
}
