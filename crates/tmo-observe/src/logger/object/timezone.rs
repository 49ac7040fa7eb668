use std::{fmt, str::FromStr, sync::OnceLock};

use serde::{Deserialize, Serialize};
use time::UtcOffset;

use crate::logger::LoggerError;

/// Local offset detected at startup. Unset means "not detected", which reads as UTC.
static LOCAL_OFFSET: OnceLock<UtcOffset> = OnceLock::new();

/// Timezone used for log timestamps.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoggerTimeZone {
    #[default]
    Utc,
    Local,
}

impl LoggerTimeZone {
    /// Offset to apply to timestamps.
    pub fn offset(&self) -> UtcOffset {
        match self {
            LoggerTimeZone::Utc => UtcOffset::UTC,
            LoggerTimeZone::Local => LOCAL_OFFSET.get().copied().unwrap_or(UtcOffset::UTC),
        }
    }
}

impl fmt::Display for LoggerTimeZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LoggerTimeZone::Utc => "utc",
            LoggerTimeZone::Local => "local",
        })
    }
}

impl FromStr for LoggerTimeZone {
    type Err = LoggerError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "utc" => Ok(Self::Utc),
            "local" => Ok(Self::Local),
            _ => Err(LoggerError::InvalidTimeZone(s.to_string())),
        }
    }
}

/// Detect and cache the local UTC offset.
///
/// Must run before any other thread is spawned (i.e. before building the tokio
/// runtime): detection is refused on most Unix platforms once the process is multi-threaded.
/// Returns the offset now in effect for [`LoggerTimeZone::Local`].
pub fn init_local_offset() -> UtcOffset {
    *LOCAL_OFFSET.get_or_init(|| UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC))
}
