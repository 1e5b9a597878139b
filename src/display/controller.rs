//! Display Configuration Controller
//!
//! Reads and mutates the resolution of the primary display through a
//! [`DisplayBackend`]. A resolution change is always done in four steps:
//! query the current mode, overlay width/height, dry-run the candidate with
//! [`ChangeFlags::TEST`], then apply it for the current session only.

use tracing::{debug, info, warn};

use super::{ChangeFlags, DisplayBackend, DisplayDevice, ResolutionChangeOutcome};

pub struct DisplayController<B> {
    backend: B,
}

impl<B: DisplayBackend> DisplayController<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Currently active pixel dimensions (best effort, never fails)
    pub fn current_resolution(&self) -> (u32, u32) {
        self.backend.screen_size()
    }

    /// Find the primary display device.
    ///
    /// Enumeration stops at the first primary device or at the end of the
    /// list. Without a primary, the last enumerated device wins; with no
    /// devices at all the empty default device is returned.
    pub fn primary_device(&self) -> DisplayDevice {
        let mut last = DisplayDevice::default();
        let mut index = 0;

        while let Some(device) = self.backend.enum_device(index) {
            index += 1;
            if device.is_primary() {
                debug!(device = %device.name, index = index - 1, "Primary display device found");
                return device;
            }
            last = device;
        }

        if index == 0 {
            warn!("No display devices enumerated");
        } else {
            debug!(device = %last.name, count = index, "No primary flag set, using last device");
        }
        last
    }

    /// Change `device` to `width`x`height` for the current session.
    pub fn set_resolution(
        &self,
        device: &DisplayDevice,
        width: u32,
        height: u32,
    ) -> ResolutionChangeOutcome {
        let Some(current) = self.backend.current_mode(device) else {
            warn!(device = %device.name, "Failed to query current display mode");
            return ResolutionChangeOutcome::QueryFailed;
        };

        debug!(
            device = %device.name,
            from_width = current.width,
            from_height = current.height,
            bits_per_pixel = current.bits_per_pixel,
            frequency = current.frequency,
            "Current display mode"
        );

        let requested = current.with_resolution(width, height);

        let probe = self.backend.change_mode(Some(&requested), ChangeFlags::TEST);
        if !probe.is_successful() {
            warn!(width, height, status = %probe, "Display mode rejected by dry run");
            return ResolutionChangeOutcome::UnsupportedMode;
        }

        let status = self.backend.change_mode(Some(&requested), ChangeFlags::empty());
        if status.is_successful() {
            info!(width, height, "Display mode applied");
            ResolutionChangeOutcome::Applied
        } else {
            warn!(width, height, status = %status, "Display mode change failed");
            ResolutionChangeOutcome::ApplyFailed(status)
        }
    }

    /// Ask the OS to restore its stored default configuration.
    ///
    /// Safe to call at any time and any number of times; failures are logged only.
    pub fn reset_to_defaults(&self) {
        let status = self.backend.change_mode(None, ChangeFlags::empty());
        if status.is_successful() {
            info!("Display settings reset to defaults");
        } else {
            warn!(status = %status, "Failed to reset display settings");
        }
    }
}
