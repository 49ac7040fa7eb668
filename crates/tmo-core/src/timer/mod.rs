//! Deadline racing primitive the manager delegates to.
//!
//! The [`Timer`] knows nothing about phases: it keeps one budget (timeout + elapsed),
//! races work against it and reports whether the deadline won.
mod deadline;
pub use deadline::DeadlineTimer;

use std::{future::Future, time::Duration};

use tokio::time::Instant;

/// Result of racing a unit of work against the timer's deadline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerOutcome<T> {
    /// Work finished first.
    Completed(T),
    /// Deadline passed (or the race was interrupted) while work was still pending.
    DeadlineExceeded,
}

/// Single-budget countdown that races work against a movable deadline.
///
/// Implementations must accept deadline changes while a race is in flight
/// and treat a zero timeout as "no deadline".
pub trait Timer: Send + Sync {
    /// Race `work` against the current deadline.
    fn run<F>(&self, work: F) -> impl Future<Output = TimerOutcome<F::Output>>
    where
        F: Future;

    /// Replace the budget.
    ///
    /// `elapsed` overwrites the time already consumed; `None` keeps the live reading.
    fn update_timeout(&self, timeout: Duration, elapsed: Option<Duration>);

    /// Time consumed so far against the current budget.
    fn elapsed(&self) -> Duration;

    /// Instant at which the active race expires, if one is running and enforcement is on.
    fn deadline(&self) -> Option<Instant>;

    /// Abort the active race. No-op when nothing is running.
    fn interrupt(&self);
}
