//! Metrics hooks for phase execution.
//!
//! Backends implement [`MetricsBackend`] and are attached with [`crate::TimeoutManager::with_metrics`].
//! Without one, the manager reports into [`NoOpMetrics`].
mod backend;
pub use backend::{MetricsBackend, MetricsHandle, PhaseOutcome};

mod noop;
pub use noop::NoOpMetrics;

use std::sync::Arc;

/// Create a no-op metrics handle.
#[inline]
pub fn noop_metrics() -> MetricsHandle {
    Arc::new(NoOpMetrics)
}
