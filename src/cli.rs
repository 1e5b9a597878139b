//! Command-line surface: `runres <width> <height> <cmd>`

use clap::Parser;

use crate::config;
use crate::logging::LogLevel;

#[derive(Parser, Debug, Clone, PartialEq)]
#[command(
    name = "runres",
    version,
    about = config::app::ABOUT,
    after_help = config::app::EPILOG,
    allow_negative_numbers = true
)]
pub struct Cli {
    /// Screen width
    pub width: i64,

    /// Screen height
    pub height: i64,

    /// Command to execute
    pub cmd: String,

    /// Minimum level of log output (off, error, warn, info, debug, trace)
    #[arg(long, default_value = config::logging::DEFAULT_LEVEL)]
    pub log_level: LogLevel,

    /// Also write a daily rolling log file
    #[arg(long)]
    pub log_file: bool,
}
