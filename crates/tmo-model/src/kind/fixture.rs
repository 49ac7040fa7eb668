use std::fmt;

use serde::{Deserialize, Serialize};

/// Whether a fixture is being set up or torn down.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FixturePhase {
    Setup,
    Teardown,
}

impl FixturePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            FixturePhase::Setup => "setup",
            FixturePhase::Teardown => "teardown",
        }
    }

    /// Progressive form used in messages ("setting up", "tearing down").
    pub fn verb(&self) -> &'static str {
        match self {
            FixturePhase::Setup => "setting up",
            FixturePhase::Teardown => "tearing down",
        }
    }
}

impl fmt::Display for FixturePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
