use crate::metrics::backend::{MetricsBackend, PhaseOutcome};

/// Metrics backend that records nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpMetrics;

impl MetricsBackend for NoOpMetrics {
    #[inline(always)]
    fn record_phase_started(&self, _: &str) {}

    #[inline(always)]
    fn record_phase_finished(&self, _: &str, _: PhaseOutcome, _: u64) {}

    #[inline(always)]
    fn record_budget_adjusted(&self, _: &str, _: u64) {}
}
