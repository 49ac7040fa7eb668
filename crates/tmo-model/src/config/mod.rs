mod timeout;
pub use timeout::{DEFAULT_TIMEOUT_MS, TimeoutConfig};
