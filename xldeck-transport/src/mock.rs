//! In-memory transport for exercising sessions without hardware
//!
//! Records every output and feature report, can be told to fail a specific
//! write, and lets a test push input reports through the registered sink as
//! if the reader thread had received them.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::device_registry::{PRODUCT_ID, VENDOR_ID};
use crate::{ReportSink, Transport, TransportDeviceInfo, TransportError};

/// Recording transport
pub struct MockTransport {
    info: TransportDeviceInfo,
    writes: Mutex<Vec<Vec<u8>>>,
    feature_reports: Mutex<Vec<Vec<u8>>>,
    feature_responses: Mutex<HashMap<u8, Vec<u8>>>,
    write_attempts: AtomicUsize,
    fail_write_at: Mutex<Option<(usize, TransportError)>>,
    fail_features: Mutex<Option<TransportError>>,
    fail_reader: Mutex<Option<TransportError>>,
    sink: Mutex<Option<Arc<dyn ReportSink>>>,
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            info: TransportDeviceInfo {
                vid: VENDOR_ID,
                pid: PRODUCT_ID,
                device_path: "mock".into(),
                serial: Some("MOCK0001".into()),
                product_name: Some("Mock Surface".into()),
            },
            writes: Mutex::new(Vec::new()),
            feature_reports: Mutex::new(Vec::new()),
            feature_responses: Mutex::new(HashMap::new()),
            write_attempts: AtomicUsize::new(0),
            fail_write_at: Mutex::new(None),
            fail_features: Mutex::new(None),
            fail_reader: Mutex::new(None),
            sink: Mutex::new(None),
        }
    }

    /// Fail the `attempt`-th write (0-based, counted from now on) with `error`
    pub fn fail_write_at(&self, attempt: usize, error: TransportError) {
        let base = self.write_attempts.load(Ordering::SeqCst);
        *self.fail_write_at.lock() = Some((base + attempt, error));
    }

    /// Fail every feature report send/read with `error`
    pub fn fail_features(&self, error: TransportError) {
        *self.fail_features.lock() = Some(error);
    }

    /// Make `start_reader` fail with `error`
    pub fn fail_reader(&self, error: TransportError) {
        *self.fail_reader.lock() = Some(error);
    }

    /// Canned response for `get_feature_report(report_id, ..)`
    pub fn set_feature_response(&self, report_id: u8, data: Vec<u8>) {
        self.feature_responses.lock().insert(report_id, data);
    }

    /// Output reports accepted so far
    pub fn writes(&self) -> Vec<Vec<u8>> {
        self.writes.lock().clone()
    }

    /// Feature reports accepted so far
    pub fn feature_reports(&self) -> Vec<Vec<u8>> {
        self.feature_reports.lock().clone()
    }

    /// Forget recorded traffic
    pub fn clear(&self) {
        self.writes.lock().clear();
        self.feature_reports.lock().clear();
    }

    /// Whether a session registered its sink
    pub fn has_sink(&self) -> bool {
        self.sink.lock().is_some()
    }

    /// Deliver an input report to the registered sink
    ///
    /// Returns `false` if no sink is registered.
    pub fn push_report(&self, data: &[u8]) -> bool {
        let sink = self.sink.lock().clone();
        match sink {
            Some(sink) => {
                sink.on_report(data);
                true
            }
            None => false,
        }
    }

    /// Deliver a read error to the registered sink
    pub fn push_error(&self, error: TransportError) -> bool {
        let sink = self.sink.lock().clone();
        match sink {
            Some(sink) => {
                sink.on_error(error);
                true
            }
            None => false,
        }
    }
}

impl Transport for MockTransport {
    fn write(&self, data: &[u8]) -> Result<(), TransportError> {
        let attempt = self.write_attempts.fetch_add(1, Ordering::SeqCst);
        if let Some((at, error)) = self.fail_write_at.lock().as_ref() {
            if *at == attempt {
                return Err(error.clone());
            }
        }
        self.writes.lock().push(data.to_vec());
        Ok(())
    }

    fn send_feature_report(&self, data: &[u8]) -> Result<(), TransportError> {
        if let Some(error) = self.fail_features.lock().as_ref() {
            return Err(error.clone());
        }
        self.feature_reports.lock().push(data.to_vec());
        Ok(())
    }

    fn get_feature_report(&self, report_id: u8, len: usize) -> Result<Vec<u8>, TransportError> {
        if let Some(error) = self.fail_features.lock().as_ref() {
            return Err(error.clone());
        }
        let mut buf = self
            .feature_responses
            .lock()
            .get(&report_id)
            .cloned()
            .unwrap_or_else(|| vec![report_id]);
        buf.resize(len.max(buf.len()), 0);
        Ok(buf)
    }

    fn device_info(&self) -> &TransportDeviceInfo {
        &self.info
    }

    fn start_reader(&self, sink: Arc<dyn ReportSink>) -> Result<(), TransportError> {
        if let Some(error) = self.fail_reader.lock().as_ref() {
            return Err(error.clone());
        }
        *self.sink.lock() = Some(sink);
        Ok(())
    }
}
