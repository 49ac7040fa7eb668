mod error;
pub use error::TimeoutError;

pub mod manager;
pub mod metrics;
pub mod slot;
pub mod timer;

pub use manager::TimeoutManager;
pub use metrics::{MetricsBackend, MetricsHandle, NoOpMetrics, PhaseOutcome, noop_metrics};
pub use slot::{SlotSource, resolve_slot, resolve_slot_mut};
pub use timer::{DeadlineTimer, Timer, TimerOutcome};
