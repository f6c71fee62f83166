//! Events entering the hunt service and outputs leaving it.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Local};
use serde::Serialize;

use super::state::{HuntId, HuntOutcome};
use crate::coord::{Hint, Position, TargetLocation};
use crate::error::HuntError;
use crate::heading::HeadingUpdate;
use crate::proximity::ProximityError;

/// User-initiated commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HuntCommand {
    Start,
    Stop,
    /// Stop if a hunt is running, start otherwise.
    Toggle,
    RequestHint,
}

/// Raw motion-sensor reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SensorSample {
    Accelerometer([f32; 3]),
    Magnetometer([f32; 3]),
}

/// Everything the hunt service reacts to, in arrival order.
#[derive(Debug)]
pub enum HuntEvent {
    Command(HuntCommand),
    PositionUpdated(Position),
    Sensor(SensorSample),
    /// The heading animation started earlier has finished.
    AnimationFinished,
    /// The region registered for `hunt` reported an entry.
    RegionEntered {
        hunt: HuntId,
        region_id: String,
    },
    RegistrationFinished {
        hunt: HuntId,
        result: Result<(), HuntError>,
    },
    DeregistrationFinished {
        region_id: String,
        result: Result<(), ProximityError>,
    },
    CountdownTick {
        hunt: HuntId,
    },
    PlaceResolved {
        hunt: HuntId,
        target: TargetLocation,
        label: String,
    },
}

/// Status line shown to the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HuntStatus {
    BeginSearch,
    Found,
    TimesUp,
    Ended,
}

impl HuntStatus {
    pub fn message(&self) -> &'static str {
        match self {
            HuntStatus::BeginSearch => "Begin searching!",
            HuntStatus::Found => "You found the treasure!",
            HuntStatus::TimesUp => "Time's up!",
            HuntStatus::Ended => "Hunt ended",
        }
    }
}

impl fmt::Display for HuntStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

/// Which control the surface should offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Affordance {
    /// "Start the treasure hunt"; hint control hidden.
    StartHunt,
    /// "End the treasure hunt"; hint control visible.
    EndHunt,
}

/// Record of one finished hunt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HuntSummary {
    pub hunt: HuntId,
    pub outcome: HuntOutcome,
    pub target: TargetLocation,
    pub started_at: DateTime<Local>,
    pub ended_at: DateTime<Local>,
    pub elapsed_secs: u64,
}

/// Outputs for the user-facing surface.
#[derive(Debug, Clone, PartialEq)]
pub enum UiOutput {
    Status(HuntStatus),
    Hint(Hint),
    /// Time left in the running hunt.
    RemainingTime(Duration),
    PlaceMarker {
        position: Position,
        label: String,
    },
    RemoveMarker,
    Affordance(Affordance),
    Heading(HeadingUpdate),
    Finished(HuntSummary),
    Error(HuntError),
}

impl fmt::Display for UiOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UiOutput::Status(status) => write!(f, "{}", status),
            UiOutput::Hint(hint) => write!(f, "Head {}", hint),
            UiOutput::RemainingTime(remaining) => {
                write!(f, "{} seconds remaining", remaining.as_secs())
            }
            UiOutput::PlaceMarker { position, label } => {
                write!(f, "Treasure was at {} ({})", position, label)
            }
            UiOutput::RemoveMarker => write!(f, "Marker cleared"),
            UiOutput::Affordance(Affordance::StartHunt) => write!(f, "Ready to start a hunt"),
            UiOutput::Affordance(Affordance::EndHunt) => write!(f, "Hunt in progress"),
            UiOutput::Heading(update) => write!(f, "Heading {:.0}°", update.heading),
            UiOutput::Finished(summary) => write!(
                f,
                "Hunt {} {} after {}s",
                summary.hunt, summary.outcome, summary.elapsed_secs
            ),
            UiOutput::Error(err) => write!(f, "{}", err),
        }
    }
}
