use serde::{Deserialize, Serialize};

use crate::{FixtureDescription, Location, RunnableType, TimeSlot};

/// Describes the phase a worker is executing right now.
///
/// Supplied by the orchestrator at every phase boundary. The resting value,
/// active whenever no narrower phase is running, is a bare `test` runnable
/// (see [`RunnableDescription::resting`]).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunnableDescription {
    /// Phase kind, drives timeout attribution.
    #[serde(rename = "type")]
    pub kind: RunnableType,
    /// Where the phase is declared.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    /// Own budget. When absent, the manager's default slot applies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot: Option<TimeSlot>,
    /// Fixture currently being set up or torn down within this phase.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixture: Option<FixtureDescription>,
}

impl RunnableDescription {
    pub fn new(kind: RunnableType) -> Self {
        Self {
            kind,
            ..Default::default()
        }
    }

    /// The idle `test` runnable. Built fresh on every call.
    pub fn resting() -> Self {
        Self::new(RunnableType::Test)
    }

    /// Returns `true` for a bare `test` runnable with nothing attached.
    pub fn is_resting(&self) -> bool {
        self.kind == RunnableType::Test
            && self.location.is_none()
            && self.slot.is_none()
            && self.fixture.is_none()
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_slot(mut self, slot: TimeSlot) -> Self {
        self.slot = Some(slot);
        self
    }

    pub fn with_fixture(mut self, fixture: FixtureDescription) -> Self {
        self.fixture = Some(fixture);
        self
    }
}

#[cfg(test)]
mod tests {
    use crate::{FixtureDescription, FixturePhase, Location, RunnableDescription, RunnableType, TimeSlot};

    #[test]
    fn resting_is_bare_test() {
        let r = RunnableDescription::resting();
        assert_eq!(r.kind, RunnableType::Test);
        assert!(r.is_resting());
        assert_eq!(r, RunnableDescription::default());
    }

    #[test]
    fn anything_attached_is_not_resting() {
        let with_fixture =
            RunnableDescription::resting().with_fixture(FixtureDescription::setup("page"));
        assert!(!with_fixture.is_resting());

        let hook = RunnableDescription::new(RunnableType::BeforeAll);
        assert!(!hook.is_resting());
    }

    #[test]
    fn fixture_phase_switch_keeps_slot() {
        let setup = FixtureDescription::setup("db").with_slot(TimeSlot::from_millis(1_000));
        let teardown = setup.clone().into_phase(FixturePhase::Teardown);
        assert_eq!(teardown.phase, FixturePhase::Teardown);
        assert_eq!(teardown.slot, setup.slot);
    }

    #[test]
    fn serde_uses_type_key_and_skips_empty_fields() {
        let r = RunnableDescription::new(RunnableType::AfterAll)
            .with_location(Location::new("a.spec.ts", 4, 2));

        let json = serde_json::to_string(&r).unwrap();
        assert!(json.contains(r#""type":"afterAll""#));
        assert!(json.contains(r#""file":"a.spec.ts""#));
        assert!(!json.contains("slot"));
        assert!(!json.contains("fixture"));

        let back: RunnableDescription = serde_json::from_str(&json).unwrap();
        assert_eq!(back, r);
    }
}
