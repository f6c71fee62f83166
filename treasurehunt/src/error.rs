//! Error taxonomy for the hunt core.
//!
//! Failures that would leave the hunt ill-defined (`NoPositionFix`,
//! `RegistrationFailed`, `AuthorizationDenied`, `HuntInProgress`) abort the
//! transition they belong to. Cleanup and enrichment failures
//! (`DeregistrationFailed`, `GeocodingFailed`) are logged and never block the
//! transition they are attached to.

use thiserror::Error;

use crate::auth::Capability;

/// Errors surfaced by the hunt core.
///
/// The `Display` text of each variant is what the player sees.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HuntError {
    /// A hunt was requested before any position fix arrived.
    #[error("Your location could not be determined")]
    NoPositionFix,

    /// The proximity service refused to arm the treasure region.
    #[error("Could not start the hunt: {0}")]
    RegistrationFailed(String),

    /// The proximity service failed to remove the treasure region.
    #[error("Could not remove the treasure region: {0}")]
    DeregistrationFailed(String),

    /// Reverse geocoding of the treasure location failed.
    #[error("Could not look up the treasure address: {0}")]
    GeocodingFailed(String),

    /// The runtime authorization check failed for an action.
    #[error("Permission required for {0}")]
    AuthorizationDenied(Capability),

    /// The location provider could not deliver updates.
    #[error("Location updates unavailable: {0}")]
    LocationUnavailable(String),

    /// A start was requested while a hunt is already running.
    #[error("A treasure hunt is already in progress")]
    HuntInProgress,

    /// The hunt service event loop is no longer running.
    #[error("Hunt service has stopped")]
    ServiceStopped,
}

impl HuntError {
    /// Whether this error aborts the transition it is attached to.
    pub fn is_blocking(&self) -> bool {
        !matches!(
            self,
            HuntError::DeregistrationFailed(_) | HuntError::GeocodingFailed(_)
        )
    }
}
