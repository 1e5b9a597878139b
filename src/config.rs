//! Application Configuration Constants
//!
//! Centralized configuration for names, defaults and Win32 magic numbers.
//! runres keeps no configuration on disk; everything tunable lives here or
//! on the command line.

/// Application identity
pub mod app {
    /// Program name used for the logs directory and as a fallback dialog title
    pub const NAME: &str = "runres";

    /// Shown by `--help`
    pub const ABOUT: &str = "Run program using specified resolution.";

    /// Shown after the argument list in `--help`
    pub const EPILOG: &str = "When program exits, the resolution is reset.";
}

/// Logging Configuration
pub mod logging {
    /// Default log level when `--log-level` is not given.
    /// Only errors reach the report sink unless the user asks for more.
    pub const DEFAULT_LEVEL: &str = "error";

    /// File name prefix for the daily rolling log
    pub const LOG_FILE_NAME: &str = "runres.log";

    /// Directory name under the platform local data dir
    pub const LOGS_DIR_NAME: &str = "logs";
}

/// Display Mode Constants
///
/// Values match the Win32 `DM_*`, `CDS_*` and `DISPLAY_DEVICE_*` definitions so the
/// backend can pass them straight through.
pub mod display {
    pub const DM_POSITION: u32 = 0x0000_0020;
    pub const DM_DISPLAYORIENTATION: u32 = 0x0000_0080;
    pub const DM_BITSPERPEL: u32 = 0x0004_0000;
    pub const DM_PELSWIDTH: u32 = 0x0008_0000;
    pub const DM_PELSHEIGHT: u32 = 0x0010_0000;
    pub const DM_DISPLAYFLAGS: u32 = 0x0020_0000;
    pub const DM_DISPLAYFREQUENCY: u32 = 0x0040_0000;
    pub const DM_DISPLAYFIXEDOUTPUT: u32 = 0x2000_0000;

    pub const CDS_TEST: u32 = 0x0000_0002;

    pub const DISPLAY_DEVICE_ATTACHED_TO_DESKTOP: u32 = 0x0000_0001;
    pub const DISPLAY_DEVICE_PRIMARY_DEVICE: u32 = 0x0000_0004;
    pub const DISPLAY_DEVICE_MIRRORING_DRIVER: u32 = 0x0000_0008;

    pub const DISP_CHANGE_SUCCESSFUL: i32 = 0;
    pub const DISP_CHANGE_RESTART: i32 = 1;
    pub const DISP_CHANGE_FAILED: i32 = -1;
    pub const DISP_CHANGE_BADMODE: i32 = -2;
    pub const DISP_CHANGE_NOTUPDATED: i32 = -3;
    pub const DISP_CHANGE_BADFLAGS: i32 = -4;
    pub const DISP_CHANGE_BADPARAM: i32 = -5;
    pub const DISP_CHANGE_BADDUALVIEW: i32 = -6;
}
