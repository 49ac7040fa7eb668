//! Drives a scenario through the timeout manager the way a test worker would:
//! `beforeAll` once, then per test `beforeEach` -> fixture setup -> body ->
//! fixture teardown -> `afterEach`, and finally worker teardown.
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, error, info};

use tmo_core::{TimeoutError, TimeoutManager};
use tmo_model::{
    FixtureDescription, FixturePhase, RunnableDescription, RunnableType, TimeSlot, TimeoutConfig,
};

use crate::config::{ScenarioTest, WorkerConfig};

/// Outcome of one scenario test.
#[derive(Debug)]
pub struct TestReport {
    pub title: String,
    /// Default slot after the test, `None` if a phase timed out.
    pub timings: Option<TimeSlot>,
    pub error: Option<TimeoutError>,
}

impl TestReport {
    pub fn passed(&self) -> bool {
        self.error.is_none()
    }
}

/// Everything the worker ran.
#[derive(Debug, Default)]
pub struct RunReport {
    pub setup_error: Option<TimeoutError>,
    pub tests: Vec<TestReport>,
    pub teardown_error: Option<TimeoutError>,
}

impl RunReport {
    pub fn failures(&self) -> usize {
        self.tests.iter().filter(|t| !t.passed()).count()
            + usize::from(self.setup_error.is_some())
            + usize::from(self.teardown_error.is_some())
    }
}

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

/// Group-level phases get their own slot sized like the configured test budget.
fn own_slot(cfg: &TimeoutConfig) -> TimeSlot {
    TimeSlot::new(cfg.effective_timeout())
}

pub async fn run(cfg: &WorkerConfig) -> RunReport {
    let mut report = RunReport::default();

    // Hooks and teardown outside tests run on a manager of their own.
    let worker = TimeoutManager::from_config(&cfg.timeouts);

    let mut before_all =
        RunnableDescription::new(RunnableType::BeforeAll).with_slot(own_slot(&cfg.timeouts));
    if let Err(e) = worker
        .with_runnable(Some(&mut before_all), sleep(ms(cfg.before_all_ms)))
        .await
    {
        error!(stack = %e.stack(), "beforeAll failed; skipping tests");
        report.setup_error = Some(e);
    } else {
        for test in &cfg.tests {
            let outcome = run_test(&cfg.timeouts, test).await;
            report.tests.push(outcome);
        }
    }

    let mut teardown =
        RunnableDescription::new(RunnableType::Teardown).with_slot(own_slot(&cfg.timeouts));
    if let Err(e) = worker
        .with_runnable(Some(&mut teardown), sleep(ms(cfg.worker_teardown_ms)))
        .await
    {
        error!(stack = %e.stack(), "worker teardown failed");
        report.teardown_error = Some(e);
    }
    report
}

/// Run one test on a fresh manager, so every test starts with an untouched default budget.
pub async fn run_test(timeouts: &TimeoutConfig, test: &ScenarioTest) -> TestReport {
    let manager = TimeoutManager::from_config(timeouts);
    let result = drive_test(&manager, test).await;

    match result {
        Ok(()) => {
            let timings = manager.default_slot_timings();
            info!(
                test = %test.title,
                elapsed_ms = timings.elapsed.as_millis() as u64,
                timeout_ms = timings.timeout.as_millis() as u64,
                "test passed"
            );
            TestReport {
                title: test.title.clone(),
                timings: Some(timings),
                error: None,
            }
        }
        Err(e) => {
            error!(test = %test.title, stack = %e.stack(), "test timed out");
            TestReport {
                title: test.title.clone(),
                timings: None,
                error: Some(e),
            }
        }
    }
}

async fn drive_test(m: &TimeoutManager, test: &ScenarioTest) -> Result<(), TimeoutError> {
    let mut body = RunnableDescription::new(RunnableType::Test);
    body.location = test.location.clone();

    let mut before_each = RunnableDescription::new(RunnableType::BeforeEach);
    m.with_runnable(Some(&mut before_each), sleep(ms(test.before_each_ms)))
        .await?;

    let mut fixture = test.fixture.as_ref().map(|f| {
        let mut desc = FixtureDescription::setup(f.title.clone());
        desc.location = f.location.clone();
        desc.slot = f.timeout_ms.map(TimeSlot::from_millis);
        body.clone().with_fixture(desc)
    });

    if let (Some(scope), Some(f)) = (fixture.as_mut(), test.fixture.as_ref()) {
        debug!(fixture = %f.title, "setting up fixture");
        m.with_runnable(Some(scope), sleep(ms(f.setup_ms))).await?;
    }

    m.with_runnable(Some(&mut body), async {
        if test.slow {
            m.slow();
        }
        sleep(ms(test.body_ms)).await;
    })
    .await?;

    if let (Some(scope), Some(f)) = (fixture.as_mut(), test.fixture.as_ref()) {
        scope.fixture = scope
            .fixture
            .take()
            .map(|desc| desc.into_phase(FixturePhase::Teardown));
        debug!(fixture = %f.title, "tearing down fixture");
        m.with_runnable(Some(scope), sleep(ms(f.teardown_ms))).await?;
    }

    let mut after_each = RunnableDescription::new(RunnableType::AfterEach);
    m.with_runnable(Some(&mut after_each), sleep(ms(test.after_each_ms)))
        .await?;
    Ok(())
}
