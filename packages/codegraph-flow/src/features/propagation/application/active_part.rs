//! Cooperative cancellation
//!
//! The driver polls the flag between rounds. Deactivating it stops the run
//! before the next round, leaving a consistent but incomplete result.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Clonable cancellation handle shared with the driver
#[derive(Debug, Clone)]
pub struct ActivePart {
    active: Arc<AtomicBool>,
}

impl Default for ActivePart {
    fn default() -> Self {
        Self::new()
    }
}

impl ActivePart {
    pub fn new() -> Self {
        Self {
            active: Arc::new(AtomicBool::new(true)),
        }
    }

    #[inline]
    pub fn can_proceed(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Request the run to stop before its next round
    pub fn deactivate(&self) {
        self.active.store(false, Ordering::Release);
    }

    pub fn activate(&self) {
        self.active.store(true, Ordering::Release);
    }
}
