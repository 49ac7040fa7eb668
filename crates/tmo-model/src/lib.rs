mod domain;
pub use domain::{Location, TimeSlot, TimeoutMs};

mod error;
pub use error::{ModelError, ModelResult};

mod kind;
pub use kind::{FixturePhase, RunnableType};

mod spec;
pub use spec::{FixtureDescription, RunnableDescription};

mod config;
pub use config::{DEFAULT_TIMEOUT_MS, TimeoutConfig};
