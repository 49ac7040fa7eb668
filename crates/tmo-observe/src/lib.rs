//! Logging setup shared by the timeout workspace binaries.
mod logger;
pub use logger::*;
