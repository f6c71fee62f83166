//! Canned reverse geocoder.

use futures::future::BoxFuture;

use crate::coord::Position;
use crate::geocode::{GeocodeError, Geocoder};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SimulatedGeocoder {
    /// Describe the position by its rounded coordinates.
    #[default]
    Coordinates,
    /// Always a fixed address.
    Fixed(String),
    /// Never knows an address.
    Empty,
    /// Every lookup fails with this message.
    Failing(String),
}

impl Geocoder for SimulatedGeocoder {
    fn reverse_geocode(
        &self,
        position: Position,
    ) -> BoxFuture<'_, Result<Option<String>, GeocodeError>> {
        let result = match self {
            SimulatedGeocoder::Coordinates => Ok(Some(format!("Near {}", position))),
            SimulatedGeocoder::Fixed(address) => Ok(Some(address.clone())),
            SimulatedGeocoder::Empty => Ok(None),
            SimulatedGeocoder::Failing(message) => Err(GeocodeError::Service(message.clone())),
        };
        Box::pin(async move { result })
    }
}
