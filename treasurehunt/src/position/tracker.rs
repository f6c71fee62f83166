//! Most-recent-fix holder.

use tracing::{info, trace};

use crate::coord::Position;
use crate::error::HuntError;

/// Holds the last known device position.
///
/// Any fix is treated as usable until it is overwritten. Querying before the
/// first fix is a distinct [`HuntError::NoPositionFix`], never `(0, 0)`.
#[derive(Debug, Default)]
pub struct PositionTracker {
    current: Option<Position>,
    updates: u64,
}

impl PositionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new fix, replacing the previous one.
    pub fn update(&mut self, position: Position) {
        if self.current.is_none() {
            info!(position = %position, "First position fix");
        } else {
            trace!(position = %position, "Position updated");
        }
        self.current = Some(position);
        self.updates += 1;
    }

    /// The last known position.
    pub fn current(&self) -> Result<Position, HuntError> {
        self.current.ok_or(HuntError::NoPositionFix)
    }

    /// Whether any fix has arrived yet.
    pub fn has_fix(&self) -> bool {
        self.current.is_some()
    }

    /// Number of fixes recorded since creation.
    pub fn update_count(&self) -> u64 {
        self.updates
    }
}
