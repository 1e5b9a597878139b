// display/windows.rs - Win32 display backend
//
// Device enumeration and mode changes through the GDI display-settings API.
// All requests target the primary display: ChangeDisplaySettingsW is called
// without a device name, and resets use a null mode.

use std::mem;

use windows::core::PCWSTR;
use windows::Win32::Foundation::POINTL;
use windows::Win32::Graphics::Gdi::{
    ChangeDisplaySettingsW, EnumDisplayDevicesW, EnumDisplaySettingsW, CDS_TYPE,
    DEVMODE_DISPLAY_FIXED_OUTPUT, DEVMODE_DISPLAY_ORIENTATION, DEVMODE_FIELD_FLAGS, DEVMODEW,
    DISPLAY_DEVICEW, ENUM_CURRENT_SETTINGS,
};
use windows::Win32::UI::WindowsAndMessaging::{GetSystemMetrics, SM_CXSCREEN, SM_CYSCREEN};

use super::{
    ChangeFlags, ChangeStatus, DeviceState, DisplayBackend, DisplayDevice, DisplayMode,
    ModeFields, ModePosition, RawModeRecord,
};

#[derive(Debug, Default, Clone, Copy)]
pub struct Win32Display;

impl Win32Display {
    pub fn new() -> Self {
        Self
    }
}

fn wide_to_string(wide: &[u16]) -> String {
    let len = wide.iter().position(|&c| c == 0).unwrap_or(wide.len());
    String::from_utf16_lossy(&wide[..len])
}

fn to_wide(value: &str) -> Vec<u16> {
    value.encode_utf16().chain(std::iter::once(0)).collect()
}

fn snapshot(devmode: &DEVMODEW) -> RawModeRecord {
    // SAFETY: DEVMODEW is plain data and lives for the duration of the borrow
    let bytes = unsafe {
        std::slice::from_raw_parts(
            devmode as *const DEVMODEW as *const u8,
            mem::size_of::<DEVMODEW>(),
        )
    };
    RawModeRecord::new(bytes)
}

fn restore(record: &RawModeRecord) -> Option<DEVMODEW> {
    let bytes = record.as_bytes();
    if bytes.len() != mem::size_of::<DEVMODEW>() {
        return None;
    }

    // SAFETY: the length matches and every bit pattern is a valid DEVMODEW
    unsafe {
        let mut devmode: DEVMODEW = mem::zeroed();
        std::ptr::copy_nonoverlapping(
            bytes.as_ptr(),
            &mut devmode as *mut DEVMODEW as *mut u8,
            bytes.len(),
        );
        Some(devmode)
    }
}

fn mode_from_devmode(devmode: &DEVMODEW) -> DisplayMode {
    let fields = ModeFields::from_bits_truncate(devmode.dmFields.0);

    // SAFETY: the display branch of the union is the one filled in for display devices
    let position = if fields.contains(ModeFields::POSITION) {
        let display = unsafe { devmode.Anonymous1.Anonymous2 };
        Some(ModePosition {
            x: display.dmPosition.x,
            y: display.dmPosition.y,
            orientation: display.dmDisplayOrientation.0,
            fixed_output: display.dmDisplayFixedOutput.0,
        })
    } else {
        None
    };

    DisplayMode {
        width: devmode.dmPelsWidth,
        height: devmode.dmPelsHeight,
        bits_per_pixel: devmode.dmBitsPerPel,
        frequency: devmode.dmDisplayFrequency,
        display_flags: unsafe { devmode.Anonymous2.dmDisplayFlags },
        position,
        fields,
        raw: Some(snapshot(devmode)),
    }
}

/// Build the record for a change request.
///
/// A queried mode is overlaid onto its own record: only the resolution and
/// the field mask change. A mode built from scratch starts from zero.
fn devmode_from_mode(mode: &DisplayMode) -> DEVMODEW {
    if let Some(mut devmode) = mode.raw.as_ref().and_then(restore) {
        devmode.dmPelsWidth = mode.width;
        devmode.dmPelsHeight = mode.height;
        devmode.dmFields = DEVMODE_FIELD_FLAGS(mode.fields.bits());
        return devmode;
    }

    // SAFETY: DEVMODEW is plain data; all-zero is a valid empty request
    let mut devmode: DEVMODEW = unsafe { mem::zeroed() };
    devmode.dmSize = mem::size_of::<DEVMODEW>() as u16;
    devmode.dmFields = DEVMODE_FIELD_FLAGS(mode.fields.bits());
    devmode.dmPelsWidth = mode.width;
    devmode.dmPelsHeight = mode.height;
    devmode.dmBitsPerPel = mode.bits_per_pixel;
    devmode.dmDisplayFrequency = mode.frequency;
    devmode.Anonymous2.dmDisplayFlags = mode.display_flags;

    if let Some(position) = mode.position {
        // SAFETY: writes select the display branch of the union
        unsafe {
            let display = &mut devmode.Anonymous1.Anonymous2;
            display.dmPosition = POINTL {
                x: position.x,
                y: position.y,
            };
            display.dmDisplayOrientation = DEVMODE_DISPLAY_ORIENTATION(position.orientation);
            display.dmDisplayFixedOutput = DEVMODE_DISPLAY_FIXED_OUTPUT(position.fixed_output);
        }
    }

    devmode
}

impl DisplayBackend for Win32Display {
    fn enum_device(&self, index: u32) -> Option<DisplayDevice> {
        unsafe {
            let mut device: DISPLAY_DEVICEW = mem::zeroed();
            device.cb = mem::size_of::<DISPLAY_DEVICEW>() as u32;

            if !EnumDisplayDevicesW(PCWSTR::null(), index, &mut device, 0).as_bool() {
                return None;
            }

            let found = DisplayDevice::new(
                wide_to_string(&device.DeviceName),
                wide_to_string(&device.DeviceString),
                DeviceState::from_bits_retain(device.StateFlags.0),
            );
            log::trace!(
                "[DISPLAY] Device {}: {} ({}) flags={:#x}",
                index,
                found.name,
                found.description,
                found.state.bits()
            );
            Some(found)
        }
    }

    fn current_mode(&self, device: &DisplayDevice) -> Option<DisplayMode> {
        let name = to_wide(&device.name);

        unsafe {
            let mut devmode: DEVMODEW = mem::zeroed();
            devmode.dmSize = mem::size_of::<DEVMODEW>() as u16;

            if !EnumDisplaySettingsW(PCWSTR(name.as_ptr()), ENUM_CURRENT_SETTINGS, &mut devmode)
                .as_bool()
            {
                log::debug!("[DISPLAY] EnumDisplaySettingsW failed for '{}'", device.name);
                return None;
            }

            Some(mode_from_devmode(&devmode))
        }
    }

    fn change_mode(&self, mode: Option<&DisplayMode>, flags: ChangeFlags) -> ChangeStatus {
        let devmode = mode.map(devmode_from_mode);
        let request = devmode.as_ref().map(|d| d as *const DEVMODEW);

        let result = unsafe { ChangeDisplaySettingsW(request, CDS_TYPE(flags.bits())) };
        ChangeStatus::from_code(result.0)
    }

    fn screen_size(&self) -> (u32, u32) {
        unsafe {
            let width = GetSystemMetrics(SM_CXSCREEN).max(0) as u32;
            let height = GetSystemMetrics(SM_CYSCREEN).max(0) as u32;
            (width, height)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wide_to_string_stops_at_nul() {
        let mut buffer = [0u16; 32];
        for (slot, c) in buffer.iter_mut().zip("\\\\.\\DISPLAY1".encode_utf16()) {
            *slot = c;
        }
        assert_eq!(wide_to_string(&buffer), "\\\\.\\DISPLAY1");
    }

    #[test]
    fn test_overlay_preserves_queried_record() {
        use windows::Win32::Graphics::Gdi::{DMDO_90, DM_DISPLAYORIENTATION, DM_PELSHEIGHT, DM_PELSWIDTH};

        let mut queried: DEVMODEW = unsafe { mem::zeroed() };
        queried.dmSize = mem::size_of::<DEVMODEW>() as u16;
        queried.dmSpecVersion = 0x0401;
        queried.dmDriverVersion = 7;
        queried.dmDeviceName[0] = 'G' as u16;
        queried.dmLogPixels = 96;
        queried.dmPanningWidth = 1920;
        queried.dmPanningHeight = 1080;
        queried.dmBitsPerPel = 32;
        queried.dmDisplayFrequency = 144;
        queried.dmPelsWidth = 1920;
        queried.dmPelsHeight = 1080;
        queried.dmFields = DM_PELSWIDTH | DM_PELSHEIGHT | DM_DISPLAYORIENTATION;
        unsafe {
            queried.Anonymous1.Anonymous2.dmDisplayOrientation = DMDO_90;
        }

        let mode = mode_from_devmode(&queried);
        assert_eq!(mode.position, None);

        let request = devmode_from_mode(&mode.with_resolution(1024, 768));

        assert_eq!(request.dmPelsWidth, 1024);
        assert_eq!(request.dmPelsHeight, 768);
        assert_eq!(request.dmFields, DM_PELSWIDTH | DM_PELSHEIGHT);
        assert_eq!(request.dmSize, queried.dmSize);
        assert_eq!(request.dmSpecVersion, 0x0401);
        assert_eq!(request.dmDriverVersion, 7);
        assert_eq!(request.dmDeviceName[0], 'G' as u16);
        assert_eq!(request.dmLogPixels, 96);
        assert_eq!(request.dmPanningWidth, 1920);
        assert_eq!(request.dmPanningHeight, 1080);
        assert_eq!(request.dmBitsPerPel, 32);
        assert_eq!(request.dmDisplayFrequency, 144);
        let orientation = unsafe { request.Anonymous1.Anonymous2.dmDisplayOrientation };
        assert_eq!(orientation, DMDO_90);
    }

    #[test]
    fn test_scratch_mode_starts_from_zero() {
        let mode = DisplayMode::new(1024, 768);
        let devmode = devmode_from_mode(&mode);
        assert_eq!(devmode.dmPelsWidth, 1024);
        assert_eq!(devmode.dmPelsHeight, 768);
        assert_eq!(mode_from_devmode(&devmode).fields, mode.fields);
    }
}
