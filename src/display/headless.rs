// display/headless.rs - Backend for platforms without a supported display API
//
// Enumerates nothing and refuses every change, so a run still launches the
// command and reports the display step as failed.

use super::{ChangeFlags, ChangeStatus, DisplayBackend, DisplayDevice, DisplayMode};

#[derive(Debug, Default, Clone, Copy)]
pub struct HeadlessDisplay;

impl HeadlessDisplay {
    pub fn new() -> Self {
        Self
    }
}

impl DisplayBackend for HeadlessDisplay {
    fn enum_device(&self, _index: u32) -> Option<DisplayDevice> {
        None
    }

    fn current_mode(&self, device: &DisplayDevice) -> Option<DisplayMode> {
        log::debug!("[DISPLAY] No display API on this platform, cannot query '{}'", device.name);
        None
    }

    fn change_mode(&self, _mode: Option<&DisplayMode>, _flags: ChangeFlags) -> ChangeStatus {
        ChangeStatus::Failed
    }

    fn screen_size(&self) -> (u32, u32) {
        (0, 0)
    }
}
