//! Phase-aware budget manager.
//!
//! [`TimeoutManager`] sits on top of a [`Timer`] and gives it meaning: it knows which
//! phase is running, which slot that phase draws from, and how to attribute a timeout.
//! - every phase switch stamps the outgoing slot with the timer's elapsed reading and
//!   primes the timer with the incoming slot's `(timeout, elapsed)`;
//! - when a phase ends the manager returns to the resting `test` runnable;
//! - an expired deadline is turned into a [`TimeoutError`] naming the phase or fixture.
mod report;

use std::{
    future::Future,
    sync::{Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use tokio::time::Instant;
use tracing::{debug, trace, warn};

use tmo_model::{RunnableDescription, TimeSlot, TimeoutConfig};

use crate::{
    error::TimeoutError,
    metrics::{MetricsHandle, PhaseOutcome, noop_metrics},
    slot::{SlotSource, resolve_slot, resolve_slot_mut},
    timer::{DeadlineTimer, Timer, TimerOutcome},
};

/// Phase bookkeeping guarded by the manager's lock.
#[derive(Debug)]
struct PhaseState {
    /// Budget used whenever neither the runnable nor its fixture declares one.
    default_slot: TimeSlot,
    /// Idle runnable, rebuilt on every return to rest.
    resting: RunnableDescription,
    /// Working copies of the runnables entered so far, innermost last.
    frames: Vec<RunnableDescription>,
    /// Whether the innermost frame is current. Cleared when any phase ends.
    active: bool,
}

impl PhaseState {
    fn new(timeout: Duration) -> Self {
        Self {
            default_slot: TimeSlot::new(timeout),
            resting: RunnableDescription::resting(),
            frames: Vec::new(),
            active: false,
        }
    }

    fn current(&self) -> &RunnableDescription {
        match self.frames.last() {
            Some(top) if self.active => top,
            _ => &self.resting,
        }
    }

    fn slot(&self) -> (&TimeSlot, SlotSource) {
        resolve_slot(self.current(), &self.default_slot)
    }

    fn slot_mut(&mut self) -> &mut TimeSlot {
        let Self {
            default_slot,
            resting,
            frames,
            active,
        } = self;
        let current = match frames.last_mut() {
            Some(top) if *active => top,
            _ => resting,
        };
        resolve_slot_mut(current, default_slot)
    }
}

/// Tracks and enforces time budgets for the phases of one test execution.
///
/// Phases run strictly one at a time (nested or sequential, never interleaved).
/// All methods take `&self`, so guarded work can call back into the manager
/// (`slow()`, nested `with_runnable`, ...) while its own phase is in flight.
pub struct TimeoutManager<T: Timer = DeadlineTimer> {
    timer: T,
    state: Mutex<PhaseState>,
    metrics: MetricsHandle,
}

impl TimeoutManager<DeadlineTimer> {
    /// Create a manager with the given default budget. Zero disables enforcement.
    pub fn new(timeout: Duration) -> Self {
        Self::with_timer(DeadlineTimer::new(timeout), timeout)
    }

    /// Create a manager from configuration.
    pub fn from_config(cfg: &TimeoutConfig) -> Self {
        Self::new(cfg.effective_timeout())
    }
}

impl<T: Timer> TimeoutManager<T> {
    /// Create a manager over a custom timer, already primed with `timeout`.
    pub fn with_timer(timer: T, timeout: Duration) -> Self {
        Self {
            timer,
            state: Mutex::new(PhaseState::new(timeout)),
            metrics: noop_metrics(),
        }
    }

    /// Replace the metrics backend.
    pub fn with_metrics(mut self, metrics: MetricsHandle) -> Self {
        self.metrics = metrics;
        self
    }

    /// Underlying timer.
    pub fn timer(&self) -> &T {
        &self.timer
    }

    /// Abort whatever race is active. Fire-and-forget.
    pub fn interrupt(&self) {
        debug!("interrupting active phase");
        self.timer.interrupt();
    }

    /// Timer's elapsed reading.
    pub fn elapsed(&self) -> Duration {
        self.timer.elapsed()
    }

    /// Timer's deadline.
    pub fn deadline(&self) -> Option<Instant> {
        self.timer.deadline()
    }

    /// Push a budget straight into the timer without touching any slot.
    ///
    /// `elapsed` defaults to zero, restarting the countdown from the full `timeout`.
    /// A zero `timeout` disables enforcement.
    pub fn update_timeout(&self, timeout: Duration, elapsed: Option<Duration>) {
        self.timer
            .update_timeout(timeout, Some(elapsed.unwrap_or_default()));
    }

    /// Snapshot of the runnable currently in effect.
    pub fn current_runnable(&self) -> RunnableDescription {
        self.lock().current().clone()
    }

    /// Snapshot of the slot currently in effect.
    pub fn current_slot(&self) -> TimeSlot {
        *self.lock().slot().0
    }

    /// Run `work` as the phase described by `runnable`, racing it against that phase's budget.
    ///
    /// With `None`, `work` runs unguarded and nothing is switched.
    /// Otherwise the outgoing slot is flushed, `runnable` becomes current and the timer is
    /// primed with its slot. Afterwards the manager returns to the resting `test` runnable and
    /// the final slot bookkeeping of the phase is written back into `runnable`.
    ///
    /// `work`'s output is returned as-is. `Err` means the deadline expired first.
    pub async fn with_runnable<F>(
        &self,
        runnable: Option<&mut RunnableDescription>,
        work: F,
    ) -> Result<F::Output, TimeoutError>
    where
        F: Future,
    {
        let Some(runnable) = runnable else {
            return Ok(work.await);
        };

        let phase = runnable.kind;
        let guard = PhaseGuard::enter(self, runnable.clone());
        debug!(phase = %phase, depth = guard.depth, "phase started");
        self.metrics.record_phase_started(phase.as_str());
        let started = Instant::now();

        let result = match self.timer.run(work).await {
            TimerOutcome::Completed(out) => Ok(out),
            TimerOutcome::DeadlineExceeded => Err(self.create_timeout_error()),
        };

        if let Some(finished) = guard.finish() {
            *runnable = finished;
        }

        let outcome = match result {
            Ok(_) => PhaseOutcome::Completed,
            Err(_) => PhaseOutcome::TimedOut,
        };
        let duration_ms = started.elapsed().as_millis() as u64;
        debug!(phase = %phase, outcome = outcome.as_label(), duration_ms, "phase finished");
        self.metrics
            .record_phase_finished(phase.as_str(), outcome, duration_ms);
        result
    }

    /// Triple the budget in effect. Compounds on repeated calls.
    pub fn slow(&self) {
        let mut state = self.lock();
        let slot = state.slot_mut();
        slot.timeout = slot.timeout.saturating_mul(3);
        let timeout = slot.timeout;

        self.timer.update_timeout(timeout, None);
        self.report_adjusted(&state, timeout, "slow");
    }

    /// Replace the budget in effect. Ignored when enforcement is disabled (zero budget).
    pub fn set_timeout(&self, timeout: Duration) {
        let mut state = self.lock();
        let slot = state.slot_mut();
        if slot.is_disabled() {
            trace!("budget disabled; set_timeout ignored");
            return;
        }
        slot.timeout = timeout;

        self.timer.update_timeout(timeout, None);
        self.report_adjusted(&state, timeout, "set_timeout");
    }

    /// Flush the live elapsed reading into the slot in effect and return the default slot.
    pub fn default_slot_timings(&self) -> TimeSlot {
        let mut state = self.lock();
        self.flush(&mut state);
        state.default_slot
    }

    fn lock(&self) -> MutexGuard<'_, PhaseState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Stamp the slot in effect with the timer's elapsed reading.
    fn flush(&self, state: &mut PhaseState) {
        let elapsed = self.timer.elapsed();
        state.slot_mut().elapsed = elapsed;
    }

    /// Push the slot in effect into the timer.
    fn prime(&self, state: &PhaseState) {
        let (slot, source) = state.slot();
        trace!(
            source = source.as_str(),
            timeout_ms = slot.timeout.as_millis() as u64,
            elapsed_ms = slot.elapsed.as_millis() as u64,
            "priming timer"
        );
        self.timer.update_timeout(slot.timeout, Some(slot.elapsed));
    }

    fn enter(&self, runnable: RunnableDescription) -> usize {
        let mut state = self.lock();
        self.flush(&mut state);
        let depth = state.frames.len();
        state.frames.push(runnable);
        state.active = true;
        self.prime(&state);
        depth
    }

    /// Return to rest and hand back the frame entered at `depth`.
    fn leave(&self, depth: usize) -> Option<RunnableDescription> {
        let mut state = self.lock();
        self.flush(&mut state);
        state.active = false;
        state.resting = RunnableDescription::resting();
        let finished = if state.frames.len() > depth {
            state.frames.truncate(depth + 1);
            state.frames.pop()
        } else {
            None
        };
        self.prime(&state);
        finished
    }

    fn create_timeout_error(&self) -> TimeoutError {
        let state = self.lock();
        let (slot, source) = state.slot();
        let err = report::timeout_error(state.current(), slot.timeout);
        warn!(
            phase = %state.current().kind,
            source = source.as_str(),
            location = ?err.location(),
            "{}",
            err.message()
        );
        err
    }

    fn report_adjusted(&self, state: &PhaseState, timeout: Duration, reason: &'static str) {
        let phase = state.current().kind;
        let timeout_ms = timeout.as_millis() as u64;
        debug!(phase = %phase, timeout_ms, reason, "budget adjusted");
        self.metrics.record_budget_adjusted(phase.as_str(), timeout_ms);
    }
}

/// Leaves the phase entered at `depth` when dropped, so a cancelled
/// `with_runnable` future still returns the manager to rest.
struct PhaseGuard<'a, T: Timer> {
    manager: &'a TimeoutManager<T>,
    depth: usize,
    armed: bool,
}

impl<'a, T: Timer> PhaseGuard<'a, T> {
    fn enter(manager: &'a TimeoutManager<T>, runnable: RunnableDescription) -> Self {
        let depth = manager.enter(runnable);
        Self {
            manager,
            depth,
            armed: true,
        }
    }

    fn finish(mut self) -> Option<RunnableDescription> {
        self.armed = false;
        self.manager.leave(self.depth)
    }
}

impl<T: Timer> Drop for PhaseGuard<'_, T> {
    fn drop(&mut self) {
        if self.armed {
            debug!(depth = self.depth, "phase dropped before completion");
            self.manager.leave(self.depth);
        }
    }
}
