//! External proximity (geofence) service interface.

use std::sync::Arc;

use futures::future::BoxFuture;
use thiserror::Error;

use super::ProximityRegion;

/// Invoked by the proximity service with the id of an entered region.
///
/// Implementations must return immediately; the hunt core only enqueues an
/// event from it.
pub type EnterCallback = Arc<dyn Fn(String) + Send + Sync>;

/// Errors reported by the proximity service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProximityError {
    /// The service refused the request.
    #[error("{0}")]
    Rejected(String),

    /// The service is not reachable.
    #[error("Proximity service unavailable")]
    Unavailable,
}

/// Platform proximity/geofence capability.
pub trait ProximityService: Send + Sync + 'static {
    /// Register `region`; `on_enter` fires when the device enters it.
    fn register(
        &self,
        region: ProximityRegion,
        on_enter: EnterCallback,
    ) -> BoxFuture<'_, Result<(), ProximityError>>;

    /// Remove a previously registered region.
    fn deregister(&self, region_id: &str) -> BoxFuture<'_, Result<(), ProximityError>>;
}
