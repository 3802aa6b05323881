//! hidapi transport for the USB-connected control surface

use std::sync::Arc;

use hidapi::HidDevice;
use parking_lot::Mutex;
use tracing::debug;

use crate::error::TransportError;
use crate::report_reader::{ReaderConfig, ReaderHandle};
use crate::types::TransportDeviceInfo;
use crate::{ReportSink, Transport};

/// HID transport over a single USB interface
///
/// The device is opened twice: one handle for output/feature reports and one
/// owned by the reader thread, so a blocked read never holds up a frame write.
pub struct HidTransport {
    /// Handle for output and feature reports
    device: Mutex<HidDevice>,
    /// Second handle, moved into the reader thread on `start_reader`
    input_device: Mutex<Option<HidDevice>>,
    /// Running reader (dropping it stops the thread)
    reader: Mutex<Option<ReaderHandle>>,
    info: TransportDeviceInfo,
}

impl HidTransport {
    /// Create a new transport from already-opened HID handles
    ///
    /// # Arguments
    /// * `device` - Handle for writes and feature reports
    /// * `input_device` - Handle for input reports (key events)
    /// * `info` - Device information
    pub fn new(device: HidDevice, input_device: HidDevice, info: TransportDeviceInfo) -> Self {
        Self {
            device: Mutex::new(device),
            input_device: Mutex::new(Some(input_device)),
            reader: Mutex::new(None),
            info,
        }
    }
}

impl Transport for HidTransport {
    fn write(&self, data: &[u8]) -> Result<(), TransportError> {
        let device = self.device.lock();
        let written = device.write(data)?;
        if written < data.len() {
            return Err(TransportError::ShortWrite {
                expected: data.len(),
                written,
            });
        }
        Ok(())
    }

    fn send_feature_report(&self, data: &[u8]) -> Result<(), TransportError> {
        debug!("Feature report: {:02X?}", &data[..data.len().min(8)]);
        let device = self.device.lock();
        device.send_feature_report(data)?;
        Ok(())
    }

    fn get_feature_report(&self, report_id: u8, len: usize) -> Result<Vec<u8>, TransportError> {
        let mut buf = vec![0u8; len.max(1)];
        buf[0] = report_id;
        let device = self.device.lock();
        let read = device.get_feature_report(&mut buf)?;
        buf.truncate(read.max(1));
        debug!("Feature report 0x{:02X} returned {} bytes", report_id, read);
        Ok(buf)
    }

    fn device_info(&self) -> &TransportDeviceInfo {
        &self.info
    }

    fn start_reader(&self, sink: Arc<dyn ReportSink>) -> Result<(), TransportError> {
        let input = self.input_device.lock().take().ok_or_else(|| {
            TransportError::Internal("reader already started".into())
        })?;
        let handle = ReaderHandle::spawn(input, sink, ReaderConfig::default())
            .map_err(|e| TransportError::Internal(format!("failed to spawn reader thread: {e}")))?;
        *self.reader.lock() = Some(handle);
        Ok(())
    }
}

impl Drop for HidTransport {
    fn drop(&mut self) {
        // ReaderHandle's own Drop flips the shutdown flag
        self.reader.lock().take();
        debug!("HidTransport dropped, signaling reader shutdown");
    }
}
