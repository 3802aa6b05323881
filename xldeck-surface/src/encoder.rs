//! Icon compression
//!
//! The panel only accepts baseline JPEG at 96×96 with 4:2:0 chroma
//! subsampling; quality 95 is what the firmware was tuned against.

use jpeg_encoder::{ColorType, Encoder, SamplingFactor};
use tracing::debug;

use crate::error::SurfaceError;
use crate::icon::{CHANNELS, ICON_SIZE};

/// Channel order of the pixel buffer handed to the encoder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorOrder {
    #[default]
    Rgb,
    Bgr,
}

/// Chroma subsampling mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChromaSubsampling {
    Yuv444,
    Yuv422,
    #[default]
    Yuv420,
}

/// Encoder parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderConfig {
    pub width: u16,
    pub height: u16,
    pub color_order: ColorOrder,
    /// 1-100
    pub quality: u8,
    pub chroma_subsampling: ChromaSubsampling,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            width: ICON_SIZE as u16,
            height: ICON_SIZE as u16,
            color_order: ColorOrder::Rgb,
            quality: 95,
            chroma_subsampling: ChromaSubsampling::Yuv420,
        }
    }
}

impl EncoderConfig {
    /// Buffer length the encoder expects
    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * CHANNELS
    }
}

/// Compresses a raw pixel buffer into the bytes streamed to a key
pub trait IconEncoder: Send + Sync {
    fn encode(&self, pixels: &[u8], config: &EncoderConfig) -> Result<Vec<u8>, SurfaceError>;
}

/// Baseline JPEG encoder
#[derive(Debug, Clone, Copy, Default)]
pub struct JpegIconEncoder;

impl IconEncoder for JpegIconEncoder {
    fn encode(&self, pixels: &[u8], config: &EncoderConfig) -> Result<Vec<u8>, SurfaceError> {
        if pixels.len() != config.expected_len() {
            return Err(SurfaceError::Encode(format!(
                "pixel buffer is {} bytes, expected {} for {}x{}",
                pixels.len(),
                config.expected_len(),
                config.width,
                config.height
            )));
        }

        let mut out = Vec::new();
        let mut encoder = Encoder::new(&mut out, config.quality);
        encoder.set_sampling_factor(match config.chroma_subsampling {
            ChromaSubsampling::Yuv444 => SamplingFactor::R_4_4_4,
            ChromaSubsampling::Yuv422 => SamplingFactor::R_4_2_2,
            ChromaSubsampling::Yuv420 => SamplingFactor::R_4_2_0,
        });
        let color_type = match config.color_order {
            ColorOrder::Rgb => ColorType::Rgb,
            ColorOrder::Bgr => ColorType::Bgr,
        };
        encoder
            .encode(pixels, config.width, config.height, color_type)
            .map_err(|e| SurfaceError::Encode(e.to_string()))?;

        debug!("Encoded {} pixel bytes into {} JPEG bytes", pixels.len(), out.len());
        Ok(out)
    }
}
