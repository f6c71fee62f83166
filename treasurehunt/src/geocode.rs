//! Reverse geocoding collaborator.
//!
//! Used once per hunt to label the result marker. Geocoding never blocks the
//! marker: an empty result gets [`NO_ADDRESS_LABEL`] and an error gets its
//! own text as the label.

use futures::future::BoxFuture;
use thiserror::Error;
use tracing::warn;

use crate::coord::Position;
use crate::error::HuntError;

/// Marker label used when the geocoder knows no address for a position.
pub const NO_ADDRESS_LABEL: &str = "No address found";

/// Errors reported by a geocoder.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeocodeError {
    #[error("{0}")]
    Service(String),

    #[error("Geocoder not available")]
    Unavailable,
}

/// Turns a position into a human-readable place description.
pub trait Geocoder: Send + Sync + 'static {
    /// Single lookup; `Ok(None)` when no address is known.
    fn reverse_geocode(&self, position: Position)
        -> BoxFuture<'_, Result<Option<String>, GeocodeError>>;
}

/// Resolve the marker label for `position`. Never fails.
pub async fn resolve_label(geocoder: &dyn Geocoder, position: Position) -> String {
    match geocoder.reverse_geocode(position).await {
        Ok(Some(address)) => address,
        Ok(None) => NO_ADDRESS_LABEL.to_string(),
        Err(e) => {
            let err = HuntError::GeocodingFailed(e.to_string());
            warn!(position = %position, error = %err, "Using error text as marker label");
            e.to_string()
        }
    }
}
