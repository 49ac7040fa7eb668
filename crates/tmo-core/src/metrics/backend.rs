use std::sync::Arc;

/// How a guarded phase ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseOutcome {
    /// The operation returned before the deadline (its own result is not inspected).
    Completed,
    /// The deadline won the race.
    TimedOut,
}

impl PhaseOutcome {
    /// Label value for metrics.
    #[inline]
    pub fn as_label(&self) -> &'static str {
        match self {
            PhaseOutcome::Completed => "completed",
            PhaseOutcome::TimedOut => "timed_out",
        }
    }
}

/// Phase metrics collection interface.
pub trait MetricsBackend: Send + Sync + 'static {
    /// A phase of the given type was entered.
    fn record_phase_started(&self, phase: &str);
    /// A phase left, with its outcome and wall time spent inside the call.
    fn record_phase_finished(&self, phase: &str, outcome: PhaseOutcome, duration_ms: u64);
    /// The budget of the active phase was changed by `slow()` or `set_timeout()`.
    fn record_budget_adjusted(&self, phase: &str, timeout_ms: u64);
}

/// Shared handle to a metrics backend.
pub type MetricsHandle = Arc<dyn MetricsBackend>;
