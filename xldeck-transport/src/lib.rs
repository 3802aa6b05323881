//! Transport abstraction layer for 32-key LCD control surfaces
//!
//! This crate provides the raw I/O primitives a control-surface session is
//! built on:
//!
//! - Device discovery by VID/PID signature (hidapi enumeration)
//! - Blocking output-report writes for streamed image frames
//! - Out-of-band feature reports (brightness, reset, info strings)
//! - A background reader that pushes raw input reports into a [`ReportSink`]
//!
//! Everything above raw bytes (framing, image transforms, key-state diffing)
//! lives in `xldeck-surface`.

pub mod device_registry;
pub mod error;
pub mod mock;
pub mod printer;
pub mod protocol;
pub mod types;

mod discovery;
mod hid;
mod report_reader;

pub use device_registry::{is_supported, PRODUCT_ID, VENDOR_ID};
pub use error::TransportError;
pub use printer::{PacketFilter, PrinterConfig, PrinterTransport};
pub use types::{DiscoveredDevice, HidInterface, TransportDeviceInfo};

pub use discovery::HidDiscovery;
pub use hid::HidTransport;

use std::sync::Arc;

/// Receiver for asynchronous input-side traffic
///
/// Implementations are invoked from the transport's reader thread, one report
/// at a time in arrival order.
pub trait ReportSink: Send + Sync {
    /// A raw input report arrived
    fn on_report(&self, data: &[u8]);

    /// The input side failed
    fn on_error(&self, error: TransportError);
}

/// The core transport trait - all backends implement this
///
/// All calls block until the device has accepted (or rejected) the data.
/// No retries are performed at this layer.
pub trait Transport: Send + Sync {
    /// Write one output report (an image frame, report ID in byte 0)
    fn write(&self, data: &[u8]) -> Result<(), TransportError>;

    /// Send a feature report (report ID in byte 0)
    fn send_feature_report(&self, data: &[u8]) -> Result<(), TransportError>;

    /// Read a feature report
    ///
    /// # Arguments
    /// * `report_id` - Feature report ID to request
    /// * `len` - Buffer size including the report ID byte
    fn get_feature_report(&self, report_id: u8, len: usize) -> Result<Vec<u8>, TransportError>;

    /// Get device information
    fn device_info(&self) -> &TransportDeviceInfo;

    /// Start delivering input reports and read errors to `sink`
    ///
    /// Called once per session. Delivery stops when the transport is dropped.
    fn start_reader(&self, sink: Arc<dyn ReportSink>) -> Result<(), TransportError>;
}
