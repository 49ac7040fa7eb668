use std::io::IsTerminal;

use serde::{Deserialize, Serialize};

use crate::logger::{
    error::LoggerResult,
    object::{LoggerFormat, LoggerLevel, LoggerTimeZone},
};

/// Environment variable overriding [`LoggerConfig::level`].
pub const ENV_LOG_LEVEL: &str = "TMO_LOG";
/// Environment variable overriding [`LoggerConfig::format`].
pub const ENV_LOG_FORMAT: &str = "TMO_LOG_FORMAT";

/// Logger configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LoggerConfig {
    /// Output format.
    pub format: LoggerFormat,
    /// `EnvFilter` expression, e.g. `"info"` or `"tmo_core=trace,info"`.
    pub level: LoggerLevel,
    /// Timezone for timestamps.
    pub tz: LoggerTimeZone,
    /// Print event targets.
    pub with_targets: bool,
    /// ANSI colors for text output (only honored on a terminal).
    pub use_color: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            format: LoggerFormat::default(),
            level: LoggerLevel::default(),
            tz: LoggerTimeZone::default(),
            with_targets: false,
            use_color: true,
        }
    }
}

impl LoggerConfig {
    /// Apply `TMO_LOG` / `TMO_LOG_FORMAT` on top of this config.
    pub fn with_env_overrides(self) -> LoggerResult<Self> {
        self.with_overrides(
            std::env::var(ENV_LOG_LEVEL).ok().as_deref(),
            std::env::var(ENV_LOG_FORMAT).ok().as_deref(),
        )
    }

    fn with_overrides(mut self, level: Option<&str>, format: Option<&str>) -> LoggerResult<Self> {
        if let Some(level) = level.filter(|s| !s.trim().is_empty()) {
            self.level = level.parse()?;
        }
        if let Some(format) = format.filter(|s| !s.trim().is_empty()) {
            self.format = format.parse()?;
        }
        Ok(self)
    }

    /// Colors are used only when enabled and stdout is a terminal.
    pub fn should_use_color(&self) -> bool {
        self.use_color && std::io::stdout().is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::LoggerError;

    #[test]
    fn defaults() {
        let cfg = LoggerConfig::default();
        assert_eq!(cfg.format, LoggerFormat::Text);
        assert_eq!(cfg.tz, LoggerTimeZone::Utc);
        assert_eq!(cfg.level.as_str(), "info");
        assert!(!cfg.with_targets);
        assert!(cfg.use_color);
    }

    #[test]
    fn empty_json_is_default() {
        let cfg: LoggerConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.format, LoggerFormat::Text);
        assert_eq!(cfg.level.as_str(), "info");
    }

    #[test]
    fn camel_case_fields() {
        let cfg: LoggerConfig =
            serde_json::from_str(r#"{"format":"json","withTargets":true,"tz":"local"}"#).unwrap();
        assert_eq!(cfg.format, LoggerFormat::Json);
        assert_eq!(cfg.tz, LoggerTimeZone::Local);
        assert!(cfg.with_targets);
    }

    #[test]
    fn overrides_replace_level_and_format() {
        let cfg = LoggerConfig::default()
            .with_overrides(Some("tmo_core=trace,warn"), Some("json"))
            .unwrap();
        assert_eq!(cfg.level.as_str(), "tmo_core=trace,warn");
        assert_eq!(cfg.format, LoggerFormat::Json);
    }

    #[test]
    fn blank_overrides_are_ignored() {
        let cfg = LoggerConfig::default()
            .with_overrides(Some("  "), None)
            .unwrap();
        assert_eq!(cfg.level.as_str(), "info");
        assert_eq!(cfg.format, LoggerFormat::Text);
    }

    #[test]
    fn bad_override_is_an_error() {
        let err = LoggerConfig::default()
            .with_overrides(None, Some("xml"))
            .unwrap_err();
        assert!(matches!(err, LoggerError::InvalidFormat(_)));
    }
}
