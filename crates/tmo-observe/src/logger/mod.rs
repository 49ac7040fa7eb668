mod config;
mod error;
mod log;
mod object;

pub use config::{ENV_LOG_FORMAT, ENV_LOG_LEVEL, LoggerConfig};
pub use error::{LoggerError, LoggerResult};
pub use object::{LoggerFormat, LoggerLevel, LoggerTimeZone, init_local_offset};

/// Install the global tracing subscriber described by `cfg`.
///
/// Call [`init_local_offset`] first (before any threads start) when using
/// [`LoggerTimeZone::Local`]; otherwise timestamps fall back to UTC.
///
/// ```rust
/// use tmo_observe::{LoggerConfig, init_logger};
///
/// init_logger(&LoggerConfig::default()).expect("logger");
/// tracing::info!("ready");
/// ```
pub fn init_logger(cfg: &LoggerConfig) -> LoggerResult<()> {
    match cfg.format {
        LoggerFormat::Text => log::install_text(cfg),
        LoggerFormat::Json => log::install_json(cfg),
        LoggerFormat::Journald => log::install_journald(cfg),
    }
}
