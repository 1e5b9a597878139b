// display/mock.rs - Scriptable display backend
//
// Holds a device list, a set of supported resolutions and the active mode,
// and records every call made against it.

use std::cell::RefCell;

use super::{
    ChangeFlags, ChangeStatus, DeviceState, DisplayBackend, DisplayDevice, DisplayMode, ModeFields,
    RawModeRecord,
};

/// A call received by [`MockDisplay`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    EnumDevice(u32),
    QueryMode(String),
    ChangeMode {
        mode: Option<(u32, u32)>,
        flags: ChangeFlags,
    },
    ScreenSize,
}

#[derive(Debug)]
struct MockState {
    current: DisplayMode,
    calls: Vec<BackendCall>,
    last_request: Option<DisplayMode>,
}

#[derive(Debug)]
pub struct MockDisplay {
    devices: Vec<DisplayDevice>,
    supported: Vec<(u32, u32)>,
    default_mode: DisplayMode,
    query_fails: bool,
    apply_status: ChangeStatus,
    reset_status: ChangeStatus,
    state: RefCell<MockState>,
}

impl Default for MockDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl MockDisplay {
    /// Backend with no devices and a zero-sized default mode
    pub fn new() -> Self {
        Self {
            devices: Vec::new(),
            supported: Vec::new(),
            default_mode: DisplayMode::default(),
            query_fails: false,
            apply_status: ChangeStatus::Successful,
            reset_status: ChangeStatus::Successful,
            state: RefCell::new(MockState {
                current: DisplayMode::default(),
                calls: Vec::new(),
                last_request: None,
            }),
        }
    }

    /// One primary device running `width`x`height` at 32 bpp / 60 Hz
    pub fn single(width: u32, height: u32) -> Self {
        let mode = DisplayMode {
            width,
            height,
            bits_per_pixel: 32,
            frequency: 60,
            display_flags: 0,
            position: None,
            fields: ModeFields::PELS_WIDTH
                | ModeFields::PELS_HEIGHT
                | ModeFields::BITS_PER_PEL
                | ModeFields::DISPLAY_FREQUENCY,
            raw: Some(RawModeRecord::new(*b"mock driver record")),
        };

        Self::new()
            .with_device(DisplayDevice::new(
                "\\\\.\\DISPLAY1",
                "Mock Display Adapter",
                DeviceState::ATTACHED_TO_DESKTOP | DeviceState::PRIMARY_DEVICE,
            ))
            .with_default_mode(mode)
            .with_supported(width, height)
    }

    pub fn with_device(mut self, device: DisplayDevice) -> Self {
        self.devices.push(device);
        self
    }

    pub fn with_supported(mut self, width: u32, height: u32) -> Self {
        self.supported.push((width, height));
        self
    }

    /// Mode restored by a reset; also becomes the active mode
    pub fn with_default_mode(mut self, mode: DisplayMode) -> Self {
        self.state.get_mut().current = mode.clone();
        self.default_mode = mode;
        self
    }

    pub fn with_query_failure(mut self) -> Self {
        self.query_fails = true;
        self
    }

    /// Status returned by a real (non-test) change of a supported mode
    pub fn with_apply_status(mut self, status: ChangeStatus) -> Self {
        self.apply_status = status;
        self
    }

    pub fn with_reset_status(mut self, status: ChangeStatus) -> Self {
        self.reset_status = status;
        self
    }

    pub fn calls(&self) -> Vec<BackendCall> {
        self.state.borrow().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    /// Last mode passed to a change request
    pub fn last_request(&self) -> Option<DisplayMode> {
        self.state.borrow().last_request.clone()
    }

    /// Number of change requests that carried a mode (dry runs included)
    pub fn change_requests(&self) -> usize {
        self.count_changes(|mode| mode.is_some())
    }

    /// Number of reset-to-defaults requests
    pub fn resets(&self) -> usize {
        self.count_changes(|mode| mode.is_none())
    }

    pub fn current(&self) -> DisplayMode {
        self.state.borrow().current.clone()
    }

    fn count_changes(&self, filter: impl Fn(&Option<(u32, u32)>) -> bool) -> usize {
        self.state
            .borrow()
            .calls
            .iter()
            .filter(|call| matches!(call, BackendCall::ChangeMode { mode, .. } if filter(mode)))
            .count()
    }

    fn record(&self, call: BackendCall) {
        self.state.borrow_mut().calls.push(call);
    }

    fn is_supported(&self, mode: &DisplayMode) -> bool {
        self.supported.contains(&mode.resolution())
    }
}

impl DisplayBackend for MockDisplay {
    fn enum_device(&self, index: u32) -> Option<DisplayDevice> {
        self.record(BackendCall::EnumDevice(index));
        self.devices.get(index as usize).cloned()
    }

    fn current_mode(&self, device: &DisplayDevice) -> Option<DisplayMode> {
        self.record(BackendCall::QueryMode(device.name.clone()));
        if self.query_fails || !self.devices.iter().any(|d| d.name == device.name) {
            return None;
        }
        Some(self.state.borrow().current.clone())
    }

    fn change_mode(&self, mode: Option<&DisplayMode>, flags: ChangeFlags) -> ChangeStatus {
        self.record(BackendCall::ChangeMode {
            mode: mode.map(DisplayMode::resolution),
            flags,
        });

        let Some(mode) = mode else {
            if self.reset_status.is_successful() {
                self.state.borrow_mut().current = self.default_mode.clone();
            }
            return self.reset_status;
        };

        self.state.borrow_mut().last_request = Some(mode.clone());

        if !self.is_supported(mode) {
            return ChangeStatus::BadMode;
        }
        if flags.contains(ChangeFlags::TEST) {
            return ChangeStatus::Successful;
        }
        if self.apply_status.is_successful() {
            let mut state = self.state.borrow_mut();
            state.current.width = mode.width;
            state.current.height = mode.height;
        }
        self.apply_status
    }

    fn screen_size(&self) -> (u32, u32) {
        self.record(BackendCall::ScreenSize);
        self.state.borrow().current.resolution()
    }
}
