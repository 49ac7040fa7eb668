use thiserror::Error;

use tmo_model::Location;

/// A phase ran out of its time budget.
///
/// Only ever produced by [`crate::TimeoutManager::with_runnable`] when the timer reports
/// an expired deadline; failures raised by the guarded operation itself are never wrapped.
/// `Display` renders the attributed message alone, without a type label.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct TimeoutError {
    message: String,
    location: Option<Location>,
}

impl TimeoutError {
    pub(crate) fn new(message: String, location: Option<Location>) -> Self {
        Self { message, location }
    }

    /// Human-readable, phase-specific message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Source location of the phase or fixture the timeout is attributed to.
    pub fn location(&self) -> Option<&Location> {
        self.location.as_ref()
    }

    /// Diagnostic trace: the message, followed by a synthetic `at file:line:column`
    /// frame when the location is known.
    pub fn stack(&self) -> String {
        match &self.location {
            Some(loc) => format!("{}\n    at {loc}", self.message),
            None => self.message.clone(),
        }
    }
}
