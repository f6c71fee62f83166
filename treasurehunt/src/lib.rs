//! TreasureHunt - location-based treasure hunt controller
//!
//! This library picks a hidden target near the device's position, arms a
//! proximity trigger around it, runs a countdown and gives directional hints
//! until the player walks into the trigger radius or time runs out.
//!
//! All inputs (position fixes, trigger notifications, countdown ticks, sensor
//! samples and user commands) are funnelled into one event queue owned by
//! [`hunt::HuntService`], so hunt state changes are applied one at a time.

pub mod auth;
pub mod config;
pub mod coord;
pub mod error;
pub mod geocode;
pub mod heading;
pub mod hunt;
pub mod logging;
pub mod position;
pub mod proximity;
pub mod sim;

pub use error::HuntError;

/// Library version, taken from the crate manifest.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
