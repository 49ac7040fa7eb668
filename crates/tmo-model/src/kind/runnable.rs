use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of phase currently executing inside a worker.
///
/// The type decides how a timeout is attributed when the phase runs out of budget:
/// - `Test`: the test body itself (and fixtures it pulls in);
/// - `BeforeEach` / `AfterEach`: per-test hooks, charged to the test budget;
/// - `BeforeAll` / `AfterAll`: per-group hooks with their own budget;
/// - `Slow` / `Skip` / `Fail` / `Fixme`: conditional modifier callbacks;
/// - `Teardown`: worker-scoped teardown after all tests have run.
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RunnableType {
    #[default]
    Test,
    BeforeAll,
    AfterAll,
    BeforeEach,
    AfterEach,
    Slow,
    Skip,
    Fail,
    Fixme,
    Teardown,
}

impl RunnableType {
    /// Canonical name, as it appears in timeout messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            RunnableType::Test => "test",
            RunnableType::BeforeAll => "beforeAll",
            RunnableType::AfterAll => "afterAll",
            RunnableType::BeforeEach => "beforeEach",
            RunnableType::AfterEach => "afterEach",
            RunnableType::Slow => "slow",
            RunnableType::Skip => "skip",
            RunnableType::Fail => "fail",
            RunnableType::Fixme => "fixme",
            RunnableType::Teardown => "teardown",
        }
    }

    /// `beforeEach` / `afterEach`.
    pub fn is_each_hook(&self) -> bool {
        matches!(self, RunnableType::BeforeEach | RunnableType::AfterEach)
    }

    /// `beforeAll` / `afterAll`.
    pub fn is_all_hook(&self) -> bool {
        matches!(self, RunnableType::BeforeAll | RunnableType::AfterAll)
    }

    /// `slow` / `skip` / `fail` / `fixme`.
    pub fn is_modifier(&self) -> bool {
        matches!(
            self,
            RunnableType::Slow | RunnableType::Skip | RunnableType::Fail | RunnableType::Fixme
        )
    }
}

impl fmt::Display for RunnableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
