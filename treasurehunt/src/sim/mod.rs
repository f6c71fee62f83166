//! Simulated collaborators.
//!
//! Stand-ins for the platform location, proximity, geocoding and sensor
//! services, used by the terminal front-end and the integration tests.
//!
//! The walker follows hints the way a player would: it keeps walking in the
//! hinted quadrant and halves its stride on an axis whenever the hint for
//! that axis flips, so it closes in on the target instead of oscillating.

mod compass;
mod geocoder;
mod proximity;
mod walker;

pub use compass::{SimulatedCompass, DEFAULT_SENSOR_PERIOD};
pub use geocoder::SimulatedGeocoder;
pub use proximity::SimulatedProximityService;
pub use walker::{SimulatedWalker, DEFAULT_STEP_DEG, MIN_STEP_DEG};
