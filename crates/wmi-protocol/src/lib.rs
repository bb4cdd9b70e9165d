//! Messages posted from the WMI hotkey driver to its user-space daemon.
//!
//! The driver posts a vendor-tagged event carrying three integers. [`DaemonMessage`] is that
//! payload; [`codec`] turns it into bytes for whatever transport carries it.
use serde::{Deserialize, Serialize};

/// Vendor string the daemon filters events on.
pub const VENDOR_ID: &str = "VoodooWMI";

/// Event code of hotkey messages within the vendor namespace.
pub const EVENT_CODE: u32 = 0x8102;

/// Message types understood by the daemon. Values match the driver's action numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i32)]
pub enum MessageType {
    /// Put the machine to sleep.
    Sleep = 0,
    /// Lock the screen.
    LockScreen = 1,
    /// Cycle display configuration.
    SwitchDisplay = 2,
    /// Toggle airplane mode.
    ToggleAirplaneMode = 3,
    /// Toggle the touchpad.
    ToggleTouchpad = 4,
    /// Decrease keyboard backlight.
    KeyboardBacklightDown = 5,
    /// Increase keyboard backlight.
    KeyboardBacklightUp = 6,
    /// Decrease screen brightness.
    ScreenBrightnessDown = 7,
    /// Increase screen brightness.
    ScreenBrightnessUp = 8,
    /// Toggle Wi-Fi.
    ToggleWifi = 9,
}

impl MessageType {
    /// Wire value of this type.
    pub fn code(self) -> i32 {
        self as i32
    }
}

/// One message to the daemon: a type and two arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaemonMessage {
    /// Message type; see [`MessageType`] for the known values.
    pub kind: i32,
    /// First argument.
    pub arg1: i32,
    /// Second argument.
    pub arg2: i32,
}

impl DaemonMessage {
    /// Message with explicit type and arguments.
    pub fn new(kind: i32, arg1: i32, arg2: i32) -> Self {
        Self { kind, arg1, arg2 }
    }

    /// Argument-less message of a known type.
    pub fn of(kind: MessageType) -> Self {
        Self::new(kind.code(), 0, 0)
    }
}

/// Byte encoding of daemon messages.
pub mod codec;
