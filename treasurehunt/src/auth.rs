//! Runtime authorization capability checks.
//!
//! Both location subscription and proximity registration are gated on a
//! boolean capability. A denied check fails that one attempt; nothing in the
//! core retries it automatically.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;

use crate::error::HuntError;

/// An action that requires runtime authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Receiving device position updates.
    Location,
    /// Registering and removing proximity regions.
    Proximity,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::Location => "location",
            Capability::Proximity => "proximity",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Capability check provided by the host platform.
pub trait Authorization: Send + Sync + 'static {
    /// Returns `true` if the capability is currently granted.
    fn is_authorized(&self, capability: Capability) -> bool;
}

/// Fails with [`HuntError::AuthorizationDenied`] when `capability` is not granted.
pub fn require(authorization: &dyn Authorization, capability: Capability) -> Result<(), HuntError> {
    if authorization.is_authorized(capability) {
        Ok(())
    } else {
        debug!(capability = %capability, "Authorization check failed");
        Err(HuntError::AuthorizationDenied(capability))
    }
}

/// Authorization backed by two switchable flags.
///
/// Used by the simulator and tests; grants can be revoked at runtime.
#[derive(Debug)]
pub struct StaticAuthorization {
    location: AtomicBool,
    proximity: AtomicBool,
}

impl StaticAuthorization {
    /// Everything granted.
    pub fn granted() -> Self {
        Self {
            location: AtomicBool::new(true),
            proximity: AtomicBool::new(true),
        }
    }

    /// Everything denied.
    pub fn denied() -> Self {
        Self {
            location: AtomicBool::new(false),
            proximity: AtomicBool::new(false),
        }
    }

    /// Grant or revoke a single capability.
    pub fn set(&self, capability: Capability, granted: bool) {
        self.flag(capability).store(granted, Ordering::SeqCst);
    }

    fn flag(&self, capability: Capability) -> &AtomicBool {
        match capability {
            Capability::Location => &self.location,
            Capability::Proximity => &self.proximity,
        }
    }
}

impl Default for StaticAuthorization {
    fn default() -> Self {
        Self::granted()
    }
}

impl Authorization for StaticAuthorization {
    fn is_authorized(&self, capability: Capability) -> bool {
        self.flag(capability).load(Ordering::SeqCst)
    }
}
