mod location;
pub use location::Location;

mod slot;
pub use slot::TimeSlot;

/// Timeout value in milliseconds.
///
/// Used at the configuration layer; runtime bookkeeping works in [`std::time::Duration`].
pub type TimeoutMs = u64;
