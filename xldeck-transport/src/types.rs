//! Common types for transport layer

use serde::Serialize;

/// Device identification information
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransportDeviceInfo {
    /// USB Vendor ID
    pub vid: u16,
    /// USB Product ID
    pub pid: u16,
    /// Platform device path (hidraw node on Linux)
    pub device_path: String,
    /// Serial number if available
    pub serial: Option<String>,
    /// Product name if available
    pub product_name: Option<String>,
}

impl TransportDeviceInfo {
    /// `VID:PID` in the usual lsusb notation
    pub fn id_string(&self) -> String {
        format!("{:04x}:{:04x}", self.vid, self.pid)
    }
}

/// Discovered device that can be opened
#[derive(Debug, Clone, Serialize)]
pub struct DiscoveredDevice {
    /// Device information
    pub info: TransportDeviceInfo,
}

/// Raw HID interface entry (for `list --all`)
#[derive(Debug, Clone, Serialize)]
pub struct HidInterface {
    pub vid: u16,
    pub pid: u16,
    pub usage_page: u16,
    pub usage: u16,
    pub interface: i32,
    pub path: String,
}
