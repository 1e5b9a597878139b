//! Error taxonomy for a guarded run.

use thiserror::Error;

use crate::display::ChangeStatus;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunresError {
    /// Non-positive or out-of-range width/height. Raised before any display call.
    #[error("Invalid resolution {width}x{height}: width and height must be positive")]
    InvalidArgument { width: i64, height: i64 },

    #[error("Failed to get display settings for device '{device}'.")]
    QueryFailed { device: String },

    #[error("Graphics mode {width}x{height} not supported.")]
    UnsupportedMode { width: u32, height: u32 },

    #[error("Failed to apply graphics mode {width}x{height}: {status}")]
    ApplyFailed {
        width: u32,
        height: u32,
        status: ChangeStatus,
    },

    /// The command could not be started or did not terminate normally.
    /// Its own exit code is never turned into this error.
    #[error("Failed to run '{command}': {reason}")]
    ChildProcess { command: String, reason: String },
}

impl RunresError {
    pub fn child(command: &str, reason: impl Into<String>) -> Self {
        Self::ChildProcess {
            command: command.to_string(),
            reason: reason.into(),
        }
    }
}
