//! runres - Run a program at a temporary screen resolution
//!
//! Changes the primary display to a requested resolution, runs one command
//! to completion and restores the display defaults afterwards, whatever
//! happened in between.

// Configuration constants
pub mod config;

pub mod error;

// Display controller and OS backends
pub mod display;

pub mod launcher;
pub mod orchestrator;

// Command line, logging and error reporting glue
pub mod cli;
pub mod logging;
pub mod report;

// Re-export commonly used types
pub use display::{
    create_backend, DisplayBackend, DisplayController, DisplayDevice, DisplayMode,
    ResolutionChangeOutcome,
};
pub use error::RunresError;
pub use launcher::{ProcessLauncher, SystemLauncher};
pub use orchestrator::{Orchestrator, RunPhase, RunReport};
pub use report::ReportSink;
