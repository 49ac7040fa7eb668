use serde::{Deserialize, Serialize};

use crate::{FixturePhase, Location, TimeSlot};

/// A fixture being set up or torn down inside the current runnable.
///
/// When `slot` is set the fixture runs on its own budget instead of the runnable's,
/// and timeouts are attributed to the fixture itself.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixtureDescription {
    /// Fixture name as written by the user.
    pub title: String,
    /// Setup or teardown.
    pub phase: FixturePhase,
    /// Where the fixture is declared.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    /// Own budget, if the fixture declares one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot: Option<TimeSlot>,
}

impl FixtureDescription {
    pub fn new(title: impl Into<String>, phase: FixturePhase) -> Self {
        Self {
            title: title.into(),
            phase,
            location: None,
            slot: None,
        }
    }

    pub fn setup(title: impl Into<String>) -> Self {
        Self::new(title, FixturePhase::Setup)
    }

    pub fn teardown(title: impl Into<String>) -> Self {
        Self::new(title, FixturePhase::Teardown)
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_slot(mut self, slot: TimeSlot) -> Self {
        self.slot = Some(slot);
        self
    }

    /// Same fixture, switched to another phase. The slot is carried over so that
    /// setup and teardown draw from one budget.
    pub fn into_phase(mut self, phase: FixturePhase) -> Self {
        self.phase = phase;
        self
    }
}
