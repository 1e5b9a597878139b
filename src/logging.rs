//! Logging setup
//!
//! Structured logging with tracing. Output goes to the [`ReportSink`], so a
//! detached run shows its log lines in the exit dialog. An optional daily
//! rolling file can be enabled with `--log-file`.

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::level_filters::LevelFilter;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config;
use crate::report::ReportSink;

/// Verbosity selected with `--log-level`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Accepted spellings; the first name for each level is the canonical one
const LEVEL_NAMES: &[(&str, LogLevel)] = &[
    ("off", LogLevel::Off),
    ("error", LogLevel::Error),
    ("warn", LogLevel::Warn),
    ("warning", LogLevel::Warn),
    ("info", LogLevel::Info),
    ("debug", LogLevel::Debug),
    ("trace", LogLevel::Trace),
];

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        LEVEL_NAMES
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(s))
            .map(|&(_, level)| level)
            .ok_or_else(|| format!("Invalid log level: {}", s))
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = LEVEL_NAMES
            .iter()
            .find(|(_, level)| level == self)
            .map_or("off", |(name, _)| name);
        f.write_str(name)
    }
}

impl From<LogLevel> for LevelFilter {
    fn from(log_level: LogLevel) -> Self {
        match log_level {
            LogLevel::Off => LevelFilter::OFF,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

/// Filter directive for our own crate at `log_level`
pub fn filter_directive(log_level: LogLevel) -> String {
    let filter = LevelFilter::from(log_level);
    if filter == LevelFilter::OFF {
        return "off".to_string();
    }
    format!("{}={}", config::app::NAME, filter.to_string().to_lowercase())
}

/// Platform-specific logs directory, created on demand.
///
/// Windows: `%LOCALAPPDATA%\runres\logs`, elsewhere `~/.local/share/runres/logs`.
pub fn get_logs_dir() -> Result<PathBuf> {
    let logs_dir = dirs::data_local_dir()
        .context("Failed to get local data directory")?
        .join(config::app::NAME)
        .join(config::logging::LOGS_DIR_NAME);

    if !logs_dir.exists() {
        fs::create_dir_all(&logs_dir)
            .with_context(|| format!("Failed to create logs directory: {:?}", logs_dir))?;
    }

    Ok(logs_dir)
}

/// Initialize the global subscriber.
///
/// # Arguments
/// * `log_level` - Minimum level recorded for this crate
/// * `log_to_file` - Also write a daily rolling log file
/// * `sink` - Destination for formatted console output
pub fn init_logging(log_level: LogLevel, log_to_file: bool, sink: ReportSink) -> Result<()> {
    let filter = EnvFilter::try_new(filter_directive(log_level))
        .context("Failed to build log filter")?;

    let sink_layer = tracing_subscriber::fmt::layer()
        .with_ansi(!sink.is_buffered())
        .with_target(false)
        .without_time()
        .with_writer(sink);

    if log_to_file {
        let logs_dir = get_logs_dir()?;
        let appender =
            RollingFileAppender::new(Rotation::DAILY, &logs_dir, config::logging::LOG_FILE_NAME);

        let file_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(appender)
            .with_target(false)
            .with_file(true)
            .with_line_number(true);

        tracing_subscriber::registry()
            .with(filter)
            .with(sink_layer)
            .with(file_layer)
            .try_init()
            .context("Failed to install log subscriber")?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(sink_layer)
            .try_init()
            .context("Failed to install log subscriber")?;
    }

    tracing::debug!(
        version = env!("CARGO_PKG_VERSION"),
        platform = std::env::consts::OS,
        log_level = %log_level,
        log_to_file,
        "Logging initialized"
    );

    Ok(())
}
