//! Device position tracking.
//!
//! The [`PositionTracker`] holds the most recent fix and nothing else: no
//! history, no staleness check. The [`LocationFeed`] bridges an external
//! [`LocationProvider`] onto the hunt event queue.
//!
//! # Example
//!
//! ```ignore
//! use treasurehunt::position::{LocationFeed, LocationRequest};
//!
//! let feed = LocationFeed::start(provider, &*authorization, LocationRequest::default(), handle).await?;
//! // ... fixes now arrive on the hunt event queue ...
//! feed.stop();
//! ```

mod provider;
mod tracker;

pub use provider::{LocationError, LocationFeed, LocationProvider, LocationRequest};
pub use tracker::PositionTracker;
