//! Key indices, colors and the canonical icon buffer
//!
//! Every icon handed to the encoder is a [`CanonicalIcon`]: 96×96 pixels,
//! row-major, three bytes (R, G, B) per pixel. Caller-supplied pixel buffers
//! come in two shapes which are converted with different scan conventions;
//! both conversions must stay bit-exact with what the panel firmware expects.

use std::fmt;
use std::str::FromStr;

use crate::error::SurfaceError;

pub use xldeck_transport::protocol::KEY_COUNT;

/// Edge length of a key display in pixels
pub const ICON_SIZE: usize = 96;

/// Edge length of the low resolution source format
pub const LOW_RES_SIZE: usize = 72;

/// Bytes per pixel
pub const CHANNELS: usize = 3;

/// Byte length of a canonical icon, and of a high resolution source
pub const HIGH_RES_LEN: usize = ICON_SIZE * ICON_SIZE * CHANNELS;

/// Byte length of a low resolution source
pub const LOW_RES_LEN: usize = LOW_RES_SIZE * LOW_RES_SIZE * CHANNELS;

/// Keys per row
pub const COLUMNS: usize = 8;

/// Rows of keys
pub const ROWS: usize = 4;

/// Index of one key on the panel, 0..=31
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KeyIndex(u8);

impl KeyIndex {
    /// Validate a key index
    pub fn new(index: i32) -> Result<Self, SurfaceError> {
        if (0..KEY_COUNT as i32).contains(&index) {
            Ok(Self(index as u8))
        } else {
            Err(SurfaceError::InvalidArgument(format!(
                "key index {index} out of range 0-{}",
                KEY_COUNT - 1
            )))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// All keys in ascending order
    pub fn all() -> impl Iterator<Item = KeyIndex> {
        (0..KEY_COUNT as u8).map(KeyIndex)
    }

    /// (column, row) on the 8×4 grid
    pub fn position(self) -> (usize, usize) {
        let i = self.0 as usize;
        (i % COLUMNS, i / COLUMNS)
    }
}

impl TryFrom<i32> for KeyIndex {
    type Error = SurfaceError;

    fn try_from(index: i32) -> Result<Self, Self::Error> {
        Self::new(index)
    }
}

impl fmt::Display for KeyIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// RGB color value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Self = Self { r: 0, g: 0, b: 0 };

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build a color from untrusted integers, rejecting anything outside 0-255
    pub fn checked(r: i32, g: i32, b: i32) -> Result<Self, SurfaceError> {
        let channel = |name: &str, v: i32| {
            u8::try_from(v).map_err(|_| {
                SurfaceError::InvalidArgument(format!("{name} channel {v} out of range 0-255"))
            })
        };
        Ok(Self {
            r: channel("red", r)?,
            g: channel("green", g)?,
            b: channel("blue", b)?,
        })
    }
}

impl FromStr for Rgb {
    type Err = SurfaceError;

    /// Accepts `#rrggbb`, `rrggbb` or `r,g,b`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || SurfaceError::InvalidArgument(format!("invalid color {s:?}"));

        if s.contains(',') {
            let parts: Vec<i32> = s
                .split(',')
                .map(|p| p.trim().parse::<i32>().map_err(|_| invalid()))
                .collect::<Result<_, _>>()?;
            return match parts.as_slice() {
                [r, g, b] => Self::checked(*r, *g, *b),
                _ => Err(invalid()),
            };
        }

        let hex = s.strip_prefix('#').unwrap_or(s);
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(invalid());
        }
        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
        Ok(Self::new(byte(0)?, byte(2)?, byte(4)?))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// 96×96 RGB pixel buffer in the orientation the panel displays
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalIcon(Vec<u8>);

impl CanonicalIcon {
    /// Every pixel set to `color`
    pub fn solid(color: Rgb) -> Self {
        let pixel = [color.r, color.g, color.b];
        Self(pixel.repeat(ICON_SIZE * ICON_SIZE))
    }

    /// Convert a caller-supplied buffer, dispatching on its length
    pub fn from_source(source: &[u8]) -> Result<Self, SurfaceError> {
        match source.len() {
            HIGH_RES_LEN => Ok(Self::from_high_res(source)),
            LOW_RES_LEN => Ok(Self::from_low_res(source)),
            other => Err(SurfaceError::InvalidArgument(format!(
                "image buffer is {other} bytes, expected {HIGH_RES_LEN} (96x96 RGB) or {LOW_RES_LEN} (72x72 RGB)"
            ))),
        }
    }

    /// High resolution path: output pixels are written in order while a
    /// source cursor walks backwards from the last byte, three at a time.
    /// Channels come from (cursor-2, cursor-1, cursor).
    fn from_high_res(source: &[u8]) -> Self {
        debug_assert_eq!(source.len(), HIGH_RES_LEN);
        Self(source.chunks_exact(CHANNELS).rev().flatten().copied().collect())
    }

    /// Low resolution path: nearest-neighbor upscale. Destination (y, x) is
    /// visited from 95 down to 0 and written in order; channels are read
    /// forward from the mapped source pixel.
    fn from_low_res(source: &[u8]) -> Self {
        debug_assert_eq!(source.len(), LOW_RES_LEN);
        let mut out = Vec::with_capacity(HIGH_RES_LEN);
        for y in (0..ICON_SIZE).rev() {
            let sy = scale_to_low_res(y);
            for x in (0..ICON_SIZE).rev() {
                let sx = scale_to_low_res(x);
                let offset = (sy * LOW_RES_SIZE + sx) * CHANNELS;
                out.extend_from_slice(&source[offset..offset + CHANNELS]);
            }
        }
        Self(out)
    }

    /// Pixel at column `x`, row `y`
    pub fn pixel(&self, x: usize, y: usize) -> Rgb {
        let i = (y * ICON_SIZE + x) * CHANNELS;
        Rgb::new(self.0[i], self.0[i + 1], self.0[i + 2])
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// round(v * 72 / 96), halves rounding up
fn scale_to_low_res(v: usize) -> usize {
    (2 * v * LOW_RES_SIZE + ICON_SIZE) / (2 * ICON_SIZE)
}
