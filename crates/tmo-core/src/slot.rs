//! Slot resolution: picks the budget that applies to a runnable.
//!
//! The chain is fixture slot -> runnable slot -> default slot; the first one present wins.
use tmo_model::{RunnableDescription, TimeSlot};

/// Which level of the resolution chain supplied the budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotSource {
    Fixture,
    Runnable,
    Default,
}

impl SlotSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            SlotSource::Fixture => "fixture",
            SlotSource::Runnable => "runnable",
            SlotSource::Default => "default",
        }
    }
}

/// Resolve the slot applying to `runnable`, falling back to `default`.
pub fn resolve_slot<'a>(
    runnable: &'a RunnableDescription,
    default: &'a TimeSlot,
) -> (&'a TimeSlot, SlotSource) {
    let fixture_slot = runnable.fixture.as_ref().and_then(|f| f.slot.as_ref());
    match (fixture_slot, runnable.slot.as_ref()) {
        (Some(slot), _) => (slot, SlotSource::Fixture),
        (None, Some(slot)) => (slot, SlotSource::Runnable),
        (None, None) => (default, SlotSource::Default),
    }
}

/// Mutable counterpart of [`resolve_slot`].
pub fn resolve_slot_mut<'a>(
    runnable: &'a mut RunnableDescription,
    default: &'a mut TimeSlot,
) -> &'a mut TimeSlot {
    let RunnableDescription { slot, fixture, .. } = runnable;
    let fixture_slot = fixture.as_mut().and_then(|f| f.slot.as_mut());
    match (fixture_slot, slot.as_mut()) {
        (Some(slot), _) => slot,
        (None, Some(slot)) => slot,
        (None, None) => default,
    }
}
