//! Hunt session state types.

use std::fmt;

use chrono::{DateTime, Local};
use serde::Serialize;

use super::countdown::Countdown;
use super::events::HuntStatus;
use crate::coord::TargetLocation;

/// Identifies one hunt attempt. Strictly increasing per controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct HuntId(u64);

impl HuntId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for HuntId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// How a hunt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HuntOutcome {
    /// The device entered the treasure region.
    Found,
    /// The countdown reached zero.
    TimedOut,
    /// The player stopped the hunt.
    Stopped,
}

impl HuntOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            HuntOutcome::Found => "found",
            HuntOutcome::TimedOut => "timed-out",
            HuntOutcome::Stopped => "stopped",
        }
    }

    /// Status surfaced to the player for this outcome.
    pub fn status(&self) -> HuntStatus {
        match self {
            HuntOutcome::Found => HuntStatus::Found,
            HuntOutcome::TimedOut => HuntStatus::TimesUp,
            HuntOutcome::Stopped => HuntStatus::Ended,
        }
    }
}

impl fmt::Display for HuntOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Coarse lifecycle phase, for display and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HuntPhase {
    Idle,
    Arming,
    Active,
    Ended,
}

impl HuntPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            HuntPhase::Idle => "Idle",
            HuntPhase::Arming => "Arming",
            HuntPhase::Active => "Active",
            HuntPhase::Ended => "Ended",
        }
    }
}

impl fmt::Display for HuntPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Hunt session state.
///
/// A region is armed exactly while the state is `Arming` or `Active`.
#[derive(Debug, Clone)]
pub enum HuntState {
    /// No hunt has run yet (or the last attempt never armed).
    Idle,
    /// Waiting for the proximity service to confirm the region.
    Arming {
        hunt: HuntId,
        target: TargetLocation,
        /// The service reported "entered" before confirming registration.
        entered_early: bool,
    },
    /// Hunt running: region armed, countdown ticking.
    Active {
        hunt: HuntId,
        target: TargetLocation,
        countdown: Countdown,
        started_at: DateTime<Local>,
    },
    /// Last hunt finished; a new start is allowed.
    Ended {
        hunt: HuntId,
        target: TargetLocation,
        outcome: HuntOutcome,
    },
}

impl HuntState {
    pub fn phase(&self) -> HuntPhase {
        match self {
            HuntState::Idle => HuntPhase::Idle,
            HuntState::Arming { .. } => HuntPhase::Arming,
            HuntState::Active { .. } => HuntPhase::Active,
            HuntState::Ended { .. } => HuntPhase::Ended,
        }
    }

    pub fn hunt(&self) -> Option<HuntId> {
        match self {
            HuntState::Idle => None,
            HuntState::Arming { hunt, .. }
            | HuntState::Active { hunt, .. }
            | HuntState::Ended { hunt, .. } => Some(*hunt),
        }
    }

    pub fn target(&self) -> Option<TargetLocation> {
        match self {
            HuntState::Idle => None,
            HuntState::Arming { target, .. }
            | HuntState::Active { target, .. }
            | HuntState::Ended { target, .. } => Some(*target),
        }
    }

    /// Whether a hunt is arming or active (start is not eligible).
    pub fn is_running(&self) -> bool {
        matches!(self, HuntState::Arming { .. } | HuntState::Active { .. })
    }
}

/// Result marker bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerState {
    /// No marker on the surface.
    Absent,
    /// Place lookup in flight for this hunt.
    Resolving(HuntId),
    /// Marker placed for this hunt.
    Placed(HuntId),
}
