use std::{
    future::Future,
    sync::{Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use tokio::{
    sync::Notify,
    time::{Instant, sleep_until},
};
use tokio_util::sync::CancellationToken;
use tracing::trace;

use super::{Timer, TimerOutcome};

/// Mutable clock state guarded by the timer's lock.
#[derive(Debug)]
struct Clock {
    /// Current budget. Zero means no deadline.
    timeout: Duration,
    /// Time consumed up to `last_sync`.
    elapsed: Duration,
    /// Set while at least one race is active.
    last_sync: Option<Instant>,
    /// Number of nested races in flight.
    depth: usize,
    /// Cancelled by `interrupt()`; replaced whenever a new outermost race starts.
    cancel: CancellationToken,
}

impl Clock {
    /// Fold time passed since the last sync into `elapsed`.
    fn sync(&mut self) {
        if let Some(last) = self.last_sync {
            let now = Instant::now();
            self.elapsed += now.saturating_duration_since(last);
            self.last_sync = Some(now);
        }
    }

    fn deadline(&self) -> Option<Instant> {
        if self.timeout.is_zero() {
            return None;
        }
        let base = self.last_sync?;
        Some(base + self.timeout.saturating_sub(self.elapsed))
    }
}

/// Tokio-backed [`Timer`].
///
/// Elapsed time only accrues while a race is running. Nested races share one clock:
/// every active race watches the same deadline and re-arms when it moves.
#[derive(Debug)]
pub struct DeadlineTimer {
    clock: Mutex<Clock>,
    changed: Notify,
}

impl DeadlineTimer {
    pub fn new(timeout: Duration) -> Self {
        Self {
            clock: Mutex::new(Clock {
                timeout,
                elapsed: Duration::ZERO,
                last_sync: None,
                depth: 0,
                cancel: CancellationToken::new(),
            }),
            changed: Notify::new(),
        }
    }

    /// Budget currently enforced.
    pub fn timeout(&self) -> Duration {
        self.lock().timeout
    }

    /// Returns `true` while a race is in flight.
    pub fn is_running(&self) -> bool {
        self.lock().depth > 0
    }

    fn lock(&self) -> MutexGuard<'_, Clock> {
        self.clock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn enter(&self) -> CancellationToken {
        let mut clock = self.lock();
        if clock.depth == 0 {
            clock.last_sync = Some(Instant::now());
            clock.cancel = CancellationToken::new();
        }
        clock.depth += 1;
        clock.cancel.clone()
    }

    fn exit(&self) {
        let mut clock = self.lock();
        clock.sync();
        clock.depth = clock.depth.saturating_sub(1);
        if clock.depth == 0 {
            clock.last_sync = None;
        }
    }

    fn expired(&self) -> bool {
        self.lock()
            .deadline()
            .is_some_and(|deadline| deadline <= Instant::now())
    }
}

/// Leaves the race on drop, so a cancelled `run` future does not keep the clock ticking.
struct Race<'a>(&'a DeadlineTimer);

impl Drop for Race<'_> {
    fn drop(&mut self) {
        self.0.exit();
    }
}

async fn sleep_until_opt(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

impl Timer for DeadlineTimer {
    async fn run<F>(&self, work: F) -> TimerOutcome<F::Output>
    where
        F: Future,
    {
        let cancel = self.enter();
        let _race = Race(self);
        tokio::pin!(work);

        loop {
            // Register for changes before reading the deadline so no update is missed.
            let changed = self.changed.notified();
            let deadline = self.lock().deadline();

            tokio::select! {
                biased;
                out = &mut work => return TimerOutcome::Completed(out),
                _ = cancel.cancelled() => {
                    trace!("race interrupted");
                    return TimerOutcome::DeadlineExceeded;
                }
                _ = changed => continue,
                _ = sleep_until_opt(deadline) => {
                    if self.expired() {
                        trace!("deadline reached");
                        return TimerOutcome::DeadlineExceeded;
                    }
                }
            }
        }
    }

    fn update_timeout(&self, timeout: Duration, elapsed: Option<Duration>) {
        {
            let mut clock = self.lock();
            clock.timeout = timeout;
            if let Some(elapsed) = elapsed {
                clock.sync();
                clock.elapsed = elapsed;
            }
            trace!(
                timeout_ms = timeout.as_millis() as u64,
                elapsed_ms = clock.elapsed.as_millis() as u64,
                running = clock.depth > 0,
                "timer budget updated"
            );
        }
        self.changed.notify_waiters();
    }

    fn elapsed(&self) -> Duration {
        let mut clock = self.lock();
        clock.sync();
        clock.elapsed
    }

    fn deadline(&self) -> Option<Instant> {
        self.lock().deadline()
    }

    fn interrupt(&self) {
        let clock = self.lock();
        if clock.depth > 0 {
            clock.cancel.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use tokio::time::{Instant, sleep};

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn completes_before_deadline() {
        let timer = DeadlineTimer::new(Duration::from_millis(100));
        let out = timer
            .run(async {
                sleep(Duration::from_millis(40)).await;
                7
            })
            .await;

        assert_eq!(out, TimerOutcome::Completed(7));
        assert_eq!(timer.elapsed(), Duration::from_millis(40));
        assert!(!timer.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn expires_when_work_is_slower() {
        let timer = DeadlineTimer::new(Duration::from_millis(50));
        let started = Instant::now();
        let out = timer.run(sleep(Duration::from_secs(10))).await;

        assert_eq!(out, TimerOutcome::DeadlineExceeded);
        assert_eq!(started.elapsed(), Duration::from_millis(50));
    }

    #[tokio::test(start_paused = true)]
    async fn zero_timeout_never_expires() {
        let timer = DeadlineTimer::new(Duration::ZERO);
        let out = timer.run(sleep(Duration::from_secs(3_600))).await;

        assert_eq!(out, TimerOutcome::Completed(()));
        assert_eq!(timer.deadline(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn elapsed_beyond_timeout_expires_immediately() {
        let timer = DeadlineTimer::new(Duration::from_millis(100));
        timer.update_timeout(Duration::from_millis(100), Some(Duration::from_millis(150)));

        let started = Instant::now();
        let out = timer.run(sleep(Duration::from_secs(1))).await;
        assert_eq!(out, TimerOutcome::DeadlineExceeded);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn extending_mid_race_moves_deadline() {
        let timer = Arc::new(DeadlineTimer::new(Duration::from_millis(100)));
        let inner = Arc::clone(&timer);

        let out = timer
            .run(async move {
                sleep(Duration::from_millis(60)).await;
                inner.update_timeout(Duration::from_millis(300), None);
                sleep(Duration::from_millis(200)).await;
                "done"
            })
            .await;

        assert_eq!(out, TimerOutcome::Completed("done"));
        assert_eq!(timer.elapsed(), Duration::from_millis(260));
    }

    #[tokio::test(start_paused = true)]
    async fn shrinking_mid_race_expires_early() {
        let timer = Arc::new(DeadlineTimer::new(Duration::from_secs(10)));
        let inner = Arc::clone(&timer);
        let started = Instant::now();

        let out = timer
            .run(async move {
                sleep(Duration::from_millis(20)).await;
                inner.update_timeout(Duration::from_millis(50), None);
                sleep(Duration::from_secs(5)).await;
            })
            .await;

        assert_eq!(out, TimerOutcome::DeadlineExceeded);
        assert_eq!(started.elapsed(), Duration::from_millis(50));
    }

    #[tokio::test(start_paused = true)]
    async fn interrupt_aborts_active_race() {
        let timer = Arc::new(DeadlineTimer::new(Duration::ZERO));
        let inner = Arc::clone(&timer);

        let out = timer
            .run(async move {
                sleep(Duration::from_millis(5)).await;
                inner.interrupt();
                sleep(Duration::from_secs(60)).await;
            })
            .await;

        assert_eq!(out, TimerOutcome::DeadlineExceeded);
    }

    #[tokio::test(start_paused = true)]
    async fn interrupt_while_idle_does_not_poison_next_race() {
        let timer = DeadlineTimer::new(Duration::ZERO);
        timer.interrupt();

        let out = timer.run(sleep(Duration::from_millis(5))).await;
        assert_eq!(out, TimerOutcome::Completed(()));
    }

    #[tokio::test(start_paused = true)]
    async fn elapsed_only_accrues_while_running() {
        let timer = DeadlineTimer::new(Duration::from_secs(1));
        timer.run(sleep(Duration::from_millis(30))).await;

        sleep(Duration::from_millis(500)).await;
        assert_eq!(timer.elapsed(), Duration::from_millis(30));
        assert_eq!(timer.deadline(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn update_with_elapsed_overwrites_reading() {
        let timer = DeadlineTimer::new(Duration::from_secs(1));
        timer.run(sleep(Duration::from_millis(30))).await;

        timer.update_timeout(Duration::from_secs(2), Some(Duration::from_millis(5)));
        assert_eq!(timer.elapsed(), Duration::from_millis(5));
        assert_eq!(timer.timeout(), Duration::from_secs(2));

        timer.update_timeout(Duration::from_secs(3), None);
        assert_eq!(timer.elapsed(), Duration::from_millis(5));
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_race_stops_the_clock() {
        let timer = DeadlineTimer::new(Duration::from_secs(1));
        let race = timer.run(sleep(Duration::from_secs(10)));
        let _ = tokio::time::timeout(Duration::from_millis(20), race).await;

        assert!(!timer.is_running());
        sleep(Duration::from_millis(100)).await;
        assert_eq!(timer.elapsed(), Duration::from_millis(20));
    }
}
