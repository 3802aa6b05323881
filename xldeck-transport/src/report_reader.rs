//! Background input-report reader
//!
//! The device pushes a key-state report every time a key changes. A dedicated
//! thread blocks on the HID input endpoint and hands each report to the
//! session's [`ReportSink`] in arrival order.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use hidapi::HidDevice;
use tracing::{debug, warn};

use crate::protocol::INPUT_REPORT_MAX;
use crate::ReportSink;

/// Configuration for the report reader loop
#[derive(Debug, Clone)]
pub(crate) struct ReaderConfig {
    /// Read timeout in milliseconds (only used to notice the shutdown flag when idle)
    pub read_timeout_ms: i32,
    /// Thread name and log prefix
    pub name: &'static str,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            read_timeout_ms: 50,
            name: "xldeck-input",
        }
    }
}

/// Owns the reader thread's shutdown flag; dropping it stops the thread.
pub(crate) struct ReaderHandle {
    shutdown: Arc<AtomicBool>,
}

impl ReaderHandle {
    /// Spawn the reader thread for `device`
    pub(crate) fn spawn(
        device: HidDevice,
        sink: Arc<dyn ReportSink>,
        config: ReaderConfig,
    ) -> std::io::Result<Self> {
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = shutdown.clone();

        std::thread::Builder::new()
            .name(config.name.into())
            .spawn(move || run_report_reader_loop(device, sink, shutdown_clone, config))?;

        Ok(Self { shutdown })
    }
}

impl Drop for ReaderHandle {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }
}

/// Reader loop: reads input reports until shutdown and forwards them to `sink`.
///
/// The first read error is forwarded unmodified and ends the loop.
pub(crate) fn run_report_reader_loop(
    device: HidDevice,
    sink: Arc<dyn ReportSink>,
    shutdown: Arc<AtomicBool>,
    config: ReaderConfig,
) {
    debug!("{} reader thread started", config.name);
    let mut buf = [0u8; INPUT_REPORT_MAX];

    while !shutdown.load(Ordering::Relaxed) {
        match device.read_timeout(&mut buf, config.read_timeout_ms) {
            Ok(len) if len > 0 => {
                debug!(
                    "{} got {} bytes: {:02X?}",
                    config.name,
                    len,
                    &buf[..len.min(16)]
                );
                sink.on_report(&buf[..len]);
            }
            Ok(_) => {
                // Timeout, no data
            }
            Err(e) => {
                warn!("{} read error: {}", config.name, e);
                sink.on_error(e.into());
                break;
            }
        }
    }

    debug!("{} reader thread exiting", config.name);
}
