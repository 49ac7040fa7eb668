use std::time::Duration;

use serde::{Deserialize, Serialize};

/// A time budget: the total allowance and how much of it was already spent.
///
/// A zero `timeout` disables enforcement for whoever resolves to this slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    /// Total allowance.
    pub timeout: Duration,
    /// Time consumed before the slot last became inactive.
    pub elapsed: Duration,
}

impl TimeSlot {
    /// Fresh slot with nothing consumed yet.
    pub const fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            elapsed: Duration::ZERO,
        }
    }

    /// Fresh slot from a millisecond value.
    pub const fn from_millis(timeout_ms: u64) -> Self {
        Self::new(Duration::from_millis(timeout_ms))
    }

    /// Returns `true` when this slot does not enforce anything.
    pub const fn is_disabled(&self) -> bool {
        self.timeout.is_zero()
    }
}
