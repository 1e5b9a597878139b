// display/mod.rs - Display Configuration Module
//
// Value types for display devices and modes, the OS boundary trait, and the
// controller that drives it. The Win32 backend is the only one that touches
// real hardware; the others exist for non-Windows builds and for tests.

use bitflags::bitflags;
use std::fmt;

use crate::config::display as dm;

pub mod controller;
pub mod headless;
pub mod mock;

#[cfg(windows)]
pub mod windows;
#[cfg(windows)]
pub use self::windows::Win32Display;

pub use controller::DisplayController;
pub use headless::HeadlessDisplay;
pub use mock::MockDisplay;

bitflags! {
    /// Which fields of a [`DisplayMode`] a change request carries.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ModeFields: u32 {
        const POSITION = dm::DM_POSITION;
        const DISPLAY_ORIENTATION = dm::DM_DISPLAYORIENTATION;
        const BITS_PER_PEL = dm::DM_BITSPERPEL;
        const PELS_WIDTH = dm::DM_PELSWIDTH;
        const PELS_HEIGHT = dm::DM_PELSHEIGHT;
        const DISPLAY_FLAGS = dm::DM_DISPLAYFLAGS;
        const DISPLAY_FREQUENCY = dm::DM_DISPLAYFREQUENCY;
        const DISPLAY_FIXED_OUTPUT = dm::DM_DISPLAYFIXEDOUTPUT;
    }
}

bitflags! {
    /// `DISPLAY_DEVICE_*` state bits reported during enumeration.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct DeviceState: u32 {
        const ATTACHED_TO_DESKTOP = dm::DISPLAY_DEVICE_ATTACHED_TO_DESKTOP;
        const PRIMARY_DEVICE = dm::DISPLAY_DEVICE_PRIMARY_DEVICE;
        const MIRRORING_DRIVER = dm::DISPLAY_DEVICE_MIRRORING_DRIVER;

        // Keep bits we don't name
        const _ = !0;
    }
}

bitflags! {
    /// `CDS_*` flags for a change request. Empty means "apply for this session only".
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ChangeFlags: u32 {
        const TEST = dm::CDS_TEST;
    }
}

/// One display output as reported by device enumeration
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DisplayDevice {
    /// Opaque device identifier, e.g. `\\.\DISPLAY1`
    pub name: String,
    /// Adapter description
    pub description: String,
    pub state: DeviceState,
}

impl DisplayDevice {
    pub fn new(name: impl Into<String>, description: impl Into<String>, state: DeviceState) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            state,
        }
    }

    pub fn is_primary(&self) -> bool {
        self.state.contains(DeviceState::PRIMARY_DEVICE)
    }
}

/// Desktop position and orientation of a display mode.
///
/// The OS record shares this storage with printer-only fields; runres never
/// reads or writes the printer side, so it is not modelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModePosition {
    pub x: i32,
    pub y: i32,
    pub orientation: u32,
    pub fixed_output: u32,
}

/// Snapshot of the OS mode record a [`DisplayMode`] was queried from.
///
/// Backends write it back underneath a change request so driver-specific
/// attributes runres does not model survive untouched.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct RawModeRecord(Vec<u8>);

impl RawModeRecord {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for RawModeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RawModeRecord({} bytes)", self.0.len())
    }
}

/// A queried or requested display configuration
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DisplayMode {
    pub width: u32,
    pub height: u32,
    pub bits_per_pixel: u32,
    pub frequency: u32,
    pub display_flags: u32,
    pub position: Option<ModePosition>,
    pub fields: ModeFields,
    /// Queried record, if any; `None` for modes built from scratch
    pub raw: Option<RawModeRecord>,
}

impl DisplayMode {
    /// Mode with only width and height set
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            fields: ModeFields::PELS_WIDTH | ModeFields::PELS_HEIGHT,
            ..Default::default()
        }
    }

    /// Overlay a new resolution on a queried mode.
    ///
    /// All other attributes, including the raw queried record, keep their
    /// queried values; only the field mask is replaced so the request carries
    /// width and height alone.
    pub fn with_resolution(&self, width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            fields: ModeFields::PELS_WIDTH | ModeFields::PELS_HEIGHT,
            ..self.clone()
        }
    }

    pub fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Raw answer of the OS to a change request (`DISP_CHANGE_*`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeStatus {
    Successful,
    Restart,
    Failed,
    BadMode,
    NotUpdated,
    BadFlags,
    BadParam,
    BadDualView,
    Other(i32),
}

impl ChangeStatus {
    pub fn from_code(code: i32) -> Self {
        match code {
            dm::DISP_CHANGE_SUCCESSFUL => Self::Successful,
            dm::DISP_CHANGE_RESTART => Self::Restart,
            dm::DISP_CHANGE_FAILED => Self::Failed,
            dm::DISP_CHANGE_BADMODE => Self::BadMode,
            dm::DISP_CHANGE_NOTUPDATED => Self::NotUpdated,
            dm::DISP_CHANGE_BADFLAGS => Self::BadFlags,
            dm::DISP_CHANGE_BADPARAM => Self::BadParam,
            dm::DISP_CHANGE_BADDUALVIEW => Self::BadDualView,
            other => Self::Other(other),
        }
    }

    pub fn is_successful(self) -> bool {
        self == Self::Successful
    }
}

impl fmt::Display for ChangeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Successful => write!(f, "successful"),
            Self::Restart => write!(f, "restart required"),
            Self::Failed => write!(f, "display driver failed"),
            Self::BadMode => write!(f, "graphics mode not supported"),
            Self::NotUpdated => write!(f, "unable to write settings"),
            Self::BadFlags => write!(f, "invalid flags"),
            Self::BadParam => write!(f, "invalid parameter"),
            Self::BadDualView => write!(f, "system is DualView capable"),
            Self::Other(code) => write!(f, "unknown status {}", code),
        }
    }
}

/// Result of [`DisplayController::set_resolution`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionChangeOutcome {
    Applied,
    UnsupportedMode,
    QueryFailed,
    ApplyFailed(ChangeStatus),
}

impl ResolutionChangeOutcome {
    pub fn is_applied(self) -> bool {
        self == Self::Applied
    }
}

/// The operating system's display subsystem.
///
/// The display configuration is process-wide shared state; implementations
/// are handed to a [`DisplayController`] explicitly instead of being reached
/// through a global, so tests can substitute [`MockDisplay`].
pub trait DisplayBackend {
    /// Device at `index` in enumeration order, or `None` past the end
    fn enum_device(&self, index: u32) -> Option<DisplayDevice>;

    /// Currently active mode of `device`, or `None` if the OS can't supply it
    fn current_mode(&self, device: &DisplayDevice) -> Option<DisplayMode>;

    /// Submit a change request. `None` asks the OS to restore its stored defaults.
    fn change_mode(&self, mode: Option<&DisplayMode>, flags: ChangeFlags) -> ChangeStatus;

    /// Active screen size in pixels (best effort)
    fn screen_size(&self) -> (u32, u32);
}

impl<T: DisplayBackend + ?Sized> DisplayBackend for &T {
    fn enum_device(&self, index: u32) -> Option<DisplayDevice> {
        (**self).enum_device(index)
    }

    fn current_mode(&self, device: &DisplayDevice) -> Option<DisplayMode> {
        (**self).current_mode(device)
    }

    fn change_mode(&self, mode: Option<&DisplayMode>, flags: ChangeFlags) -> ChangeStatus {
        (**self).change_mode(mode, flags)
    }

    fn screen_size(&self) -> (u32, u32) {
        (**self).screen_size()
    }
}

impl<T: DisplayBackend + ?Sized> DisplayBackend for Box<T> {
    fn enum_device(&self, index: u32) -> Option<DisplayDevice> {
        (**self).enum_device(index)
    }

    fn current_mode(&self, device: &DisplayDevice) -> Option<DisplayMode> {
        (**self).current_mode(device)
    }

    fn change_mode(&self, mode: Option<&DisplayMode>, flags: ChangeFlags) -> ChangeStatus {
        (**self).change_mode(mode, flags)
    }

    fn screen_size(&self) -> (u32, u32) {
        (**self).screen_size()
    }
}

/// Create the display backend for the current platform
pub fn create_backend() -> Box<dyn DisplayBackend> {
    #[cfg(windows)]
    {
        Box::new(Win32Display::new())
    }

    #[cfg(not(windows))]
    {
        Box::new(HeadlessDisplay::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_resolution_keeps_other_attributes() {
        let queried = DisplayMode {
            width: 1920,
            height: 1080,
            bits_per_pixel: 32,
            frequency: 144,
            display_flags: 0,
            position: Some(ModePosition {
                x: 0,
                y: 0,
                orientation: 1,
                fixed_output: 0,
            }),
            fields: ModeFields::all(),
            raw: Some(RawModeRecord::new(vec![7u8; 16])),
        };

        let requested = queried.with_resolution(1024, 768);
        assert_eq!(requested.resolution(), (1024, 768));
        assert_eq!(requested.bits_per_pixel, 32);
        assert_eq!(requested.frequency, 144);
        assert_eq!(requested.position, queried.position);
        assert_eq!(requested.raw, queried.raw);
        assert_eq!(
            requested.fields,
            ModeFields::PELS_WIDTH | ModeFields::PELS_HEIGHT
        );
    }

    #[test]
    fn test_change_status_codes() {
        assert_eq!(ChangeStatus::from_code(0), ChangeStatus::Successful);
        assert_eq!(ChangeStatus::from_code(-2), ChangeStatus::BadMode);
        assert_eq!(ChangeStatus::from_code(-42), ChangeStatus::Other(-42));
        assert!(!ChangeStatus::Restart.is_successful());
    }

    #[test]
    fn test_primary_flag() {
        let device = DisplayDevice::new(
            "\\\\.\\DISPLAY1",
            "Adapter",
            DeviceState::ATTACHED_TO_DESKTOP | DeviceState::PRIMARY_DEVICE,
        );
        assert!(device.is_primary());
        assert!(!DisplayDevice::default().is_primary());
    }
}
