//! Status views over the run store.

use serde::{Deserialize, Serialize};

/// Run counts by status, for dashboards and tests.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunCounts {
    pub queued: usize,
    pub running: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub cancelled: usize,
}

impl RunCounts {
    /// Runs that have reached a terminal status.
    pub fn terminal(&self) -> usize {
        self.succeeded + self.failed + self.cancelled
    }
}
