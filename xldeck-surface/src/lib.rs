//! High-level interface for 32-key LCD control surfaces
//!
//! A [`DeckSurface`] owns one opened device: it renders icons onto keys,
//! controls panel brightness and turns raw input reports into key events.
//! It works on top of any [`Transport`], so sessions can be driven by a
//! recording mock as easily as by hidapi.

pub mod encoder;
pub mod error;
pub mod frame;
pub mod icon;
pub mod input;

pub use encoder::{ChromaSubsampling, ColorOrder, EncoderConfig, IconEncoder, JpegIconEncoder};
pub use error::SurfaceError;
pub use frame::{Frame, FrameChunker};
pub use icon::{CanonicalIcon, KeyIndex, Rgb, COLUMNS, ICON_SIZE, KEY_COUNT, ROWS};
pub use input::{InputDecoder, KeyEvent, KeyStates};

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use xldeck_transport::protocol::{self, cmd, report, FEATURE_REPORT_SIZE};
use xldeck_transport::{HidDiscovery, ReportSink, Transport, TransportDeviceInfo, TransportError};

/// Capacity of the event broadcast channel
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Something happened on the input side of a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceEvent {
    KeyDown(u8),
    KeyUp(u8),
    /// The transport's reader reported a failure (passed through unmodified)
    TransportError(TransportError),
    /// An input report was too short and was dropped
    MalformedReport { len: usize },
}

impl From<KeyEvent> for SurfaceEvent {
    fn from(event: KeyEvent) -> Self {
        match event {
            KeyEvent::Down(k) => SurfaceEvent::KeyDown(k),
            KeyEvent::Up(k) => SurfaceEvent::KeyUp(k),
        }
    }
}

/// Transport handle and decoder state, guarded together so that a frame
/// sequence and a report decode never interleave
struct Core {
    transport: Arc<dyn Transport>,
    decoder: InputDecoder,
}

struct Shared {
    core: Mutex<Core>,
    events: broadcast::Sender<SurfaceEvent>,
}

impl Shared {
    fn publish(&self, event: SurfaceEvent) {
        // No subscribers is not an error
        let _ = self.events.send(event);
    }
}

/// Sink registered with the transport reader
///
/// Holds the session weakly so the reader never keeps a dropped session
/// alive.
struct SessionSink {
    shared: Weak<Shared>,
}

impl ReportSink for SessionSink {
    fn on_report(&self, data: &[u8]) {
        let Some(shared) = self.shared.upgrade() else {
            return;
        };
        let mut core = shared.core.lock();
        match core.decoder.decode(data) {
            Ok(events) => {
                for event in events {
                    debug!("Key event: {:?}", event);
                    shared.publish(event.into());
                }
            }
            Err(e) => {
                warn!("Dropping input report: {}", e);
                shared.publish(SurfaceEvent::MalformedReport { len: data.len() });
            }
        }
    }

    fn on_error(&self, error: TransportError) {
        let Some(shared) = self.shared.upgrade() else {
            return;
        };
        warn!("Input error: {}", error);
        let _core = shared.core.lock();
        shared.publish(SurfaceEvent::TransportError(error));
    }
}

/// One open control surface
pub struct DeckSurface {
    shared: Arc<Shared>,
    encoder: Box<dyn IconEncoder>,
    encoder_config: EncoderConfig,
    info: TransportDeviceInfo,
}

impl DeckSurface {
    /// Open a device and start listening for key events
    ///
    /// # Arguments
    /// * `path` - Platform device path; `None` selects the first attached
    ///   device with the surface's VID/PID
    pub fn open(path: Option<&str>) -> Result<Self, SurfaceError> {
        Self::open_with(&HidDiscovery::new(), path)
    }

    /// Like [`DeckSurface::open`], using a preconfigured discovery
    /// (e.g. one that wraps transports with a traffic printer)
    pub fn open_with(discovery: &HidDiscovery, path: Option<&str>) -> Result<Self, SurfaceError> {
        let transport = match path {
            Some(path) => discovery.open_path(path),
            None => discovery.open_first(),
        }
        .map_err(|e| match e {
            TransportError::DeviceNotFound(msg) => SurfaceError::NotFound(msg),
            other => SurfaceError::Transport(other),
        })?;
        Self::with_transport(transport)
    }

    /// Build a session over an already-open transport
    ///
    /// All keys start released. Fails if the transport cannot start
    /// delivering input reports.
    pub fn with_transport(transport: Arc<dyn Transport>) -> Result<Self, SurfaceError> {
        let info = transport.device_info().clone();
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let shared = Arc::new(Shared {
            core: Mutex::new(Core {
                transport: Arc::clone(&transport),
                decoder: InputDecoder::new(),
            }),
            events,
        });

        let sink = Arc::new(SessionSink {
            shared: Arc::downgrade(&shared),
        });
        transport.start_reader(sink)?;

        info!(
            "Opened surface {} at {}",
            info.id_string(),
            info.device_path
        );

        Ok(Self {
            shared,
            encoder: Box::new(JpegIconEncoder),
            encoder_config: EncoderConfig::default(),
            info,
        })
    }

    /// Replace the icon encoder
    pub fn with_encoder(mut self, encoder: impl IconEncoder + 'static) -> Self {
        self.encoder = Box::new(encoder);
        self
    }

    /// Information about the opened device
    pub fn device_info(&self) -> &TransportDeviceInfo {
        &self.info
    }

    /// Receive key events and input-side errors
    ///
    /// Events published before subscribing are not replayed.
    pub fn subscribe(&self) -> broadcast::Receiver<SurfaceEvent> {
        self.shared.events.subscribe()
    }

    /// Snapshot of which keys are currently held
    pub fn key_states(&self) -> KeyStates {
        self.shared.core.lock().decoder.states()
    }

    // === Rendering ===

    /// Fill a key with one color
    ///
    /// # Arguments
    /// * `key` - Key index 0-31
    /// * `r`, `g`, `b` - Channels 0-255
    pub fn fill_color(&self, key: i32, r: i32, g: i32, b: i32) -> Result<(), SurfaceError> {
        let key = KeyIndex::new(key)?;
        let color = Rgb::checked(r, g, b)?;
        self.fill_rgb(key, color)
    }

    /// Fill a key with an already validated color
    pub fn fill_rgb(&self, key: KeyIndex, color: Rgb) -> Result<(), SurfaceError> {
        debug!("Fill key {} with {}", key, color);
        self.send_icon(key, &CanonicalIcon::solid(color))
    }

    /// Draw a raw RGB image on a key
    ///
    /// # Arguments
    /// * `key` - Key index 0-31
    /// * `source` - 96×96 (27648 bytes) or 72×72 (15552 bytes) RGB pixels
    pub fn fill_image(&self, key: i32, source: &[u8]) -> Result<(), SurfaceError> {
        let key = KeyIndex::new(key)?;
        let icon = CanonicalIcon::from_source(source)?;
        debug!("Fill key {} with {}-byte image", key, source.len());
        self.send_icon(key, &icon)
    }

    /// Blank one key
    pub fn clear_key(&self, key: i32) -> Result<(), SurfaceError> {
        let key = KeyIndex::new(key)?;
        self.fill_rgb(key, Rgb::BLACK)
    }

    /// Blank every key in ascending order, stopping at the first failure
    pub fn clear_all(&self) -> Result<(), SurfaceError> {
        for key in KeyIndex::all() {
            self.fill_rgb(key, Rgb::BLACK)?;
        }
        Ok(())
    }

    fn send_icon(&self, key: KeyIndex, icon: &CanonicalIcon) -> Result<(), SurfaceError> {
        let jpeg = self.encoder.encode(icon.as_bytes(), &self.encoder_config)?;

        let core = self.shared.core.lock();
        for frame in FrameChunker::new(key.get(), &jpeg) {
            core.transport.write(&frame)?;
        }
        debug!(
            "Sent {} bytes to key {} in {} frames",
            jpeg.len(),
            key,
            FrameChunker::frame_count(jpeg.len())
        );
        Ok(())
    }

    // === Panel control ===

    /// Set panel brightness
    ///
    /// # Arguments
    /// * `percent` - 0-100
    pub fn set_brightness(&self, percent: i32) -> Result<(), SurfaceError> {
        let percent = u8::try_from(percent)
            .ok()
            .filter(|p| *p <= 100)
            .ok_or_else(|| {
                SurfaceError::InvalidArgument(format!("brightness {percent} out of range 0-100"))
            })?;
        self.send_control(cmd::SET_BRIGHTNESS, &[percent])
    }

    /// Clear all keys back to the idle logo screen
    pub fn reset(&self) -> Result<(), SurfaceError> {
        self.send_control(cmd::RESET, &[])
    }

    fn send_control(&self, command: u8, args: &[u8]) -> Result<(), SurfaceError> {
        let buf = protocol::build_control(command, args);
        debug!("Control {} {:?}", cmd::name(command), args);
        self.shared.core.lock().transport.send_feature_report(&buf)?;
        Ok(())
    }

    // === Device info ===

    /// Serial number string stored in the device
    pub fn serial_number(&self) -> Result<String, SurfaceError> {
        self.read_string(report::SERIAL_NUMBER, 2)
    }

    /// Firmware version string
    pub fn firmware_version(&self) -> Result<String, SurfaceError> {
        self.read_string(report::FIRMWARE_VERSION, 6)
    }

    fn read_string(&self, report_id: u8, offset: usize) -> Result<String, SurfaceError> {
        let data = self
            .shared
            .core
            .lock()
            .transport
            .get_feature_report(report_id, FEATURE_REPORT_SIZE)?;
        Ok(protocol::extract_string(&data, offset))
    }
}
