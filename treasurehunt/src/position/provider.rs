//! Location provider collaborator and its bridge onto the event queue.

use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::auth::{require, Authorization, Capability};
use crate::coord::Position;
use crate::error::HuntError;
use crate::hunt::HuntHandle;

/// Default interval between location updates.
pub const DEFAULT_UPDATE_INTERVAL: Duration = Duration::from_secs(10);

/// Default minimum spacing between location updates.
pub const DEFAULT_MIN_UPDATE_INTERVAL: Duration = Duration::from_secs(5);

/// Update cadence requested from the location provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationRequest {
    /// Target interval between updates.
    pub interval: Duration,
    /// Updates never arrive closer together than this.
    pub min_interval: Duration,
}

impl Default for LocationRequest {
    fn default() -> Self {
        Self {
            interval: DEFAULT_UPDATE_INTERVAL,
            min_interval: DEFAULT_MIN_UPDATE_INTERVAL,
        }
    }
}

impl LocationRequest {
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_min_interval(mut self, min_interval: Duration) -> Self {
        self.min_interval = min_interval;
        self
    }
}

/// Errors reported by a location provider.
#[derive(Debug, Clone, Error)]
pub enum LocationError {
    #[error("Location services are disabled")]
    Disabled,

    #[error("Location provider error: {0}")]
    Provider(String),
}

/// External source of device positions.
pub trait LocationProvider: Send + Sync + 'static {
    /// One-shot lookup of the last known fix, if any.
    fn last_known(&self) -> BoxFuture<'_, Result<Option<Position>, LocationError>>;

    /// Start delivering fixes on `updates` at the requested cadence.
    fn subscribe(
        &self,
        request: &LocationRequest,
        updates: mpsc::UnboundedSender<Position>,
    ) -> Result<(), LocationError>;

    /// Stop delivering fixes.
    fn unsubscribe(&self);
}

/// Running bridge from a [`LocationProvider`] to a [`HuntHandle`].
///
/// Every fix is forwarded as a position event; the feed itself never touches
/// hunt state.
pub struct LocationFeed {
    provider: Arc<dyn LocationProvider>,
    cancellation: CancellationToken,
    task: JoinHandle<()>,
}

impl LocationFeed {
    /// Check authorization, seed the last known fix and subscribe.
    ///
    /// A denied authorization fails this attempt with
    /// [`HuntError::AuthorizationDenied`] and is not retried.
    pub async fn start(
        provider: Arc<dyn LocationProvider>,
        authorization: &dyn Authorization,
        request: LocationRequest,
        handle: HuntHandle,
    ) -> Result<Self, HuntError> {
        require(authorization, Capability::Location)?;

        match provider.last_known().await {
            Ok(Some(position)) => {
                debug!(position = %position, "Seeding last known position");
                handle.update_position(position)?;
            }
            Ok(None) => debug!("No last known position"),
            Err(e) => warn!(error = %e, "Last known position lookup failed"),
        }

        let (tx, mut rx) = mpsc::unbounded_channel();
        provider
            .subscribe(&request, tx)
            .map_err(|e| HuntError::LocationUnavailable(e.to_string()))?;

        info!(
            interval_secs = request.interval.as_secs_f64(),
            min_interval_secs = request.min_interval.as_secs_f64(),
            "Location updates started"
        );

        let cancellation = CancellationToken::new();
        let token = cancellation.clone();
        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;

                    _ = token.cancelled() => break,

                    fix = rx.recv() => {
                        let Some(position) = fix else { break };
                        if handle.update_position(position).is_err() {
                            debug!("Hunt service gone, stopping location feed");
                            break;
                        }
                    }
                }
            }
        });

        Ok(Self {
            provider,
            cancellation,
            task,
        })
    }

    /// Whether the forwarding task is still running.
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Unsubscribe from the provider and stop forwarding.
    pub fn stop(self) {
        self.provider.unsubscribe();
        self.cancellation.cancel();
        info!("Location updates stopped");
    }
}
