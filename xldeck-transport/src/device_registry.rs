//! Device registry - hardware signature used during device selection

/// Vendor ID of the supported control surface
pub const VENDOR_ID: u16 = 0x0FD9;

/// Product ID of the 32-key (8×4) model
pub const PRODUCT_ID: u16 = 0x006C;

/// Check whether a VID/PID pair matches the supported hardware
#[inline]
pub fn is_supported(vid: u16, pid: u16) -> bool {
    vid == VENDOR_ID && pid == PRODUCT_ID
}
