//! Timeout attribution: turns the active runnable into a phase-specific error.
use std::time::Duration;

use tmo_model::{FixturePhase, RunnableDescription, RunnableType};

use crate::error::TimeoutError;

/// Build the error reported when `runnable` exceeds a budget of `timeout`.
///
/// A fixture carrying its own slot always takes the blame, regardless of the runnable type.
pub(crate) fn timeout_error(runnable: &RunnableDescription, timeout: Duration) -> TimeoutError {
    let ms = timeout.as_millis();
    let fixture = runnable.fixture.as_ref();

    let message = match runnable.kind {
        RunnableType::Test => match fixture {
            None => format!("Test timeout of {ms}ms exceeded."),
            Some(f) if f.phase == FixturePhase::Setup => {
                format!("Test timeout of {ms}ms exceeded while setting up \"{}\".", f.title)
            }
            // Teardown is charged to the test budget even though the body finished.
            Some(f) => format!(
                "Test finished within timeout of {ms}ms, but tearing down \"{}\" ran out of time.\n\
                 Please allow more time for the test, since teardown is attributed towards the test timeout budget.",
                f.title
            ),
        },
        RunnableType::Teardown => match fixture {
            Some(f) => format!(
                "Worker teardown timeout of {ms}ms exceeded while {} \"{}\".",
                f.phase.verb(),
                f.title
            ),
            None => format!("Worker teardown timeout of {ms}ms exceeded."),
        },
        kind if kind.is_each_hook() => {
            format!("Test timeout of {ms}ms exceeded while running \"{kind}\" hook.")
        }
        kind if kind.is_all_hook() => format!("\"{kind}\" hook timeout of {ms}ms exceeded."),
        kind => {
            debug_assert!(kind.is_modifier(), "unclassified runnable type {kind}");
            format!("\"{kind}\" modifier timeout of {ms}ms exceeded.")
        }
    };

    match fixture.filter(|f| f.slot.is_some()) {
        Some(f) => TimeoutError::new(
            format!(
                "Fixture \"{}\" timeout of {ms}ms exceeded during {}.",
                f.title, f.phase
            ),
            f.location.clone(),
        ),
        None => TimeoutError::new(message, runnable.location.clone()),
    }
}
