use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{
    TimeoutMs,
    error::{ModelError, ModelResult},
};

/// Test timeout used when nothing is configured.
pub const DEFAULT_TIMEOUT_MS: TimeoutMs = 30_000;

/// Upper bound accepted for a configured timeout (24h).
const MAX_TIMEOUT_MS: TimeoutMs = 24 * 60 * 60 * 1_000;

/// Budget configuration handed to the timeout manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TimeoutConfig {
    /// Default per-test budget in milliseconds. `0` disables enforcement.
    pub timeout_ms: TimeoutMs,
    /// Debug mode: no budget is enforced at all.
    pub debug: bool,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            debug: false,
        }
    }
}

impl TimeoutConfig {
    /// Budget the manager should start with.
    pub fn effective_timeout(&self) -> Duration {
        if self.debug {
            return Duration::ZERO;
        }
        Duration::from_millis(self.timeout_ms)
    }

    /// Rules:
    /// - `timeout_ms` must not exceed 24 hours.
    pub fn validate(&self) -> ModelResult<()> {
        if self.timeout_ms > MAX_TIMEOUT_MS {
            return Err(ModelError::InvalidConfig(format!(
                "timeoutMs {} exceeds {MAX_TIMEOUT_MS}",
                self.timeout_ms
            )));
        }
        Ok(())
    }
}
