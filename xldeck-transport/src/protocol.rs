//! Protocol constants and wire layouts for the 32-key control surface

use zerocopy::byteorder::little_endian::U16;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Report IDs
pub mod report {
    /// Output report carrying streamed image frames
    pub const IMAGE: u8 = 0x02;
    /// Feature report for panel-wide control (brightness, reset)
    pub const CONTROL: u8 = 0x03;
    /// Feature report holding the firmware version string
    pub const FIRMWARE_VERSION: u8 = 0x05;
    /// Feature report holding the serial number string
    pub const SERIAL_NUMBER: u8 = 0x06;
}

/// Commands carried in the byte following the report ID
pub mod cmd {
    /// Image frame (on `report::IMAGE`)
    pub const SET_KEY_IMAGE: u8 = 0x07;
    /// Show the idle logo (on `report::CONTROL`)
    pub const RESET: u8 = 0x02;
    /// Panel brightness percentage (on `report::CONTROL`)
    pub const SET_BRIGHTNESS: u8 = 0x08;

    /// Get human-readable name for a control command byte
    pub fn name(cmd: u8) -> &'static str {
        match cmd {
            RESET => "RESET",
            SET_BRIGHTNESS => "SET_BRIGHTNESS",
            _ => "UNKNOWN",
        }
    }
}

/// Total size of one streamed image frame
pub const FRAME_SIZE: usize = 1024;

/// Image frame header length
pub const FRAME_HEADER_SIZE: usize = 8;

/// Maximum payload bytes carried by one frame
pub const FRAME_PAYLOAD_SIZE: usize = FRAME_SIZE - FRAME_HEADER_SIZE;

/// Size of every control feature report
pub const FEATURE_REPORT_SIZE: usize = 32;

/// Input report: leading metadata bytes before the key states
pub const INPUT_HEADER_SIZE: usize = 4;

/// Input report: trailing padding after the key states
pub const INPUT_TRAILER_SIZE: usize = 1;

/// Number of keys on the panel
pub const KEY_COUNT: usize = 32;

/// Minimum well-formed input report length
pub const INPUT_REPORT_MIN: usize = INPUT_HEADER_SIZE + KEY_COUNT + INPUT_TRAILER_SIZE;

/// Largest input report the device emits
pub const INPUT_REPORT_MAX: usize = 512;

/// Image frame header (8 bytes, precedes up to 1016 payload bytes).
///
/// `[0x02, 0x07, key, is_last, len_lo, len_hi, seq_lo, seq_hi]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoBytes, FromBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct ImageFrameHeader {
    pub report_id: u8,
    pub command: u8,
    pub key: u8,
    pub is_last: u8,
    pub payload_len: U16,
    pub sequence: U16,
}

impl ImageFrameHeader {
    /// Header for one image chunk
    pub fn new(key: u8, is_last: bool, payload_len: u16, sequence: u16) -> Self {
        Self {
            report_id: report::IMAGE,
            command: cmd::SET_KEY_IMAGE,
            key,
            is_last: u8::from(is_last),
            payload_len: U16::new(payload_len),
            sequence: U16::new(sequence),
        }
    }

    /// Parse the header from the start of a frame.
    ///
    /// Returns `None` if the buffer is too short or is not an image frame.
    pub fn parse(frame: &[u8]) -> Option<Self> {
        let (header, _) = Self::read_from_prefix(frame).ok()?;
        if header.report_id != report::IMAGE || header.command != cmd::SET_KEY_IMAGE {
            return None;
        }
        Some(header)
    }

    pub fn is_last(&self) -> bool {
        self.is_last != 0
    }
}

/// Build a 32-byte control feature report `[0x03, cmd, args..., 0...]`
pub fn build_control(cmd: u8, args: &[u8]) -> [u8; FEATURE_REPORT_SIZE] {
    let mut buf = [0u8; FEATURE_REPORT_SIZE];
    buf[0] = report::CONTROL;
    buf[1] = cmd;
    let n = args.len().min(FEATURE_REPORT_SIZE - 2);
    buf[2..2 + n].copy_from_slice(&args[..n]);
    buf
}

/// Extract a NUL-padded ASCII string from a feature report payload
pub fn extract_string(data: &[u8], offset: usize) -> String {
    let tail = data.get(offset..).unwrap_or_default();
    let end = tail.iter().position(|&b| b == 0).unwrap_or(tail.len());
    String::from_utf8_lossy(&tail[..end]).trim().to_string()
}
