use std::{fs, path::Path};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use tmo_model::{Location, TimeoutConfig, TimeoutMs};
use tmo_observe::LoggerConfig;

/// Simulated fixture used by a scenario test.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioFixture {
    pub title: String,
    #[serde(default)]
    pub setup_ms: u64,
    #[serde(default)]
    pub teardown_ms: u64,
    /// Own budget for the fixture. Without it the fixture draws from the test budget.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<TimeoutMs>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

/// One simulated test: hooks, an optional fixture and a body of given duration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioTest {
    pub title: String,
    #[serde(default)]
    pub body_ms: u64,
    #[serde(default)]
    pub before_each_ms: u64,
    #[serde(default)]
    pub after_each_ms: u64,
    /// Mark the test slow from inside its body.
    #[serde(default)]
    pub slow: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixture: Option<ScenarioFixture>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

/// Worker configuration, loaded from JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WorkerConfig {
    pub logger: LoggerConfig,
    pub timeouts: TimeoutConfig,
    /// Duration of the group's `beforeAll` hook.
    pub before_all_ms: u64,
    /// Duration of worker-scoped teardown after all tests.
    pub worker_teardown_ms: u64,
    pub tests: Vec<ScenarioTest>,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            logger: LoggerConfig::default(),
            timeouts: TimeoutConfig::default(),
            before_all_ms: 50,
            worker_teardown_ms: 20,
            tests: vec![
                ScenarioTest {
                    title: "adds item to cart".into(),
                    body_ms: 120,
                    before_each_ms: 10,
                    after_each_ms: 10,
                    slow: false,
                    fixture: Some(ScenarioFixture {
                        title: "page".into(),
                        setup_ms: 40,
                        teardown_ms: 20,
                        timeout_ms: None,
                        location: None,
                    }),
                    location: Some(Location::new("cart.spec.ts", 12, 1)),
                },
                ScenarioTest {
                    title: "completes checkout".into(),
                    body_ms: 400,
                    before_each_ms: 10,
                    after_each_ms: 10,
                    slow: true,
                    fixture: None,
                    location: Some(Location::new("cart.spec.ts", 30, 1)),
                },
            ],
        }
    }
}

impl WorkerConfig {
    /// Read and validate a JSON config file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let cfg: Self = serde_json::from_str(&raw)
            .with_context(|| format!("parsing config {}", path.display()))?;
        cfg.timeouts.validate()?;
        Ok(cfg)
    }
}
