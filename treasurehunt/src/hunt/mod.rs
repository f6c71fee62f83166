//! Hunt session state machine and its event loop.
//!
//! # State Machine
//!
//! ```text
//! Idle/Ended --[start, fix known]--> Arming --[registered]--> Active
//! Arming --[registration failed]--> Idle
//! Arming --[stop]--> Idle
//! Active --[region entered]--> Ended(Found)
//! Active --[countdown zero]--> Ended(TimedOut)
//! Active --[stop]--> Ended(Stopped)
//! ```
//!
//! Every terminal transition disarms the region, cancels the countdown and
//! places the result marker exactly once. A second terminal event for the same
//! hunt is a no-op against the already-ended session.
//!
//! # Architecture
//!
//! ```text
//!  HuntHandle (clone per producer)
//!      │ HuntEvent
//!      ▼
//!  ┌──────────────────────── HuntService (one task) ────────────────────────┐
//!  │ PositionTracker   HeadingEstimator   ProximityTriggerManager            │
//!  │            \            │                  /                           │
//!  │             HuntController ──► Plan [Effect…] ──► execute              │
//!  └───────────────────────────────────────────────────────────────────────┘
//!      │ UiOutput                    spawned tasks re-enter as HuntEvent
//!      ▼
//!  user-facing surface
//! ```
//!
//! # Example
//!
//! ```ignore
//! use treasurehunt::hunt::{HuntService, Collaborators};
//!
//! let (service, handle, mut outputs) = HuntService::new(&config, collaborators);
//! let shutdown = CancellationToken::new();
//! tokio::spawn(service.run(shutdown.clone()));
//!
//! handle.update_position(Position::new(51.5, -0.12))?;
//! handle.start_hunt()?;
//! while let Some(output) = outputs.recv().await {
//!     println!("{:?}", output);
//! }
//! ```

mod controller;
mod countdown;
mod events;
mod service;
mod state;

pub use controller::{Effect, HuntController, Plan};
pub use countdown::{Countdown, CountdownStep, DEFAULT_HUNT_DURATION, DEFAULT_TICK_INTERVAL};
pub use events::{
    Affordance, HuntCommand, HuntEvent, HuntStatus, HuntSummary, SensorSample, UiOutput,
};
pub use service::{Collaborators, HuntHandle, HuntService};
pub use state::{HuntId, HuntOutcome, HuntPhase, HuntState, MarkerState};
