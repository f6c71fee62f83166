//! Proximity trigger management.
//!
//! The [`ProximityTriggerManager`] owns the bookkeeping for the single armed
//! treasure region and turns hunt start/stop into register/deregister
//! requests. Requests are executed by a [`ProximityWorker`] that talks to the
//! external [`ProximityService`] strictly in submission order, so a
//! deregistration issued at hunt end always reaches the service before the
//! registration of the next hunt.
//!
//! # Architecture
//!
//! ```text
//! HuntService ──arm/disarm──► ProximityTriggerManager
//!                                   │ ProximityCommand (FIFO)
//!                                   ▼
//!                             ProximityWorker ──► ProximityService
//!                                   │                   │ on_enter
//!                                   ▼                   ▼
//!                         HuntEvent::Registration/Deregistration/RegionEntered
//!                                   └────────► hunt event queue
//! ```
//!
//! The manager holds no hunt-outcome logic. An "entered" notification carries
//! the hunt whose registration produced it and is dropped unless that hunt
//! is the one armed now.

mod manager;
mod region;
mod service;
mod worker;

pub use manager::ProximityTriggerManager;
pub use region::{ProximityRegion, Transition, MINIMUM_RECOMMENDED_RADIUS_M, TREASURE_REGION_ID};
pub use service::{EnterCallback, ProximityError, ProximityService};
pub use worker::{ProximityCommand, ProximityWorker};
