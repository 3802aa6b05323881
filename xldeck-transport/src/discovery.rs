//! Device discovery for the 32-key control surface

use std::ffi::CString;
use std::sync::Arc;

use hidapi::HidApi;
use tracing::{debug, info, warn};

use crate::device_registry;
use crate::error::TransportError;
use crate::hid::HidTransport;
use crate::printer::{PrinterConfig, PrinterTransport};
use crate::types::{DiscoveredDevice, HidInterface, TransportDeviceInfo};
use crate::Transport;

/// HID device discovery
pub struct HidDiscovery {
    /// Known VID/PID pairs to look for
    known_devices: Vec<(u16, u16)>,
    /// Optional printer config for monitoring mode - wraps transports automatically
    printer_config: Option<PrinterConfig>,
}

impl Default for HidDiscovery {
    fn default() -> Self {
        Self::new()
    }
}

impl HidDiscovery {
    /// Create a new HID discovery instance
    pub fn new() -> Self {
        Self {
            known_devices: vec![(device_registry::VENDOR_ID, device_registry::PRODUCT_ID)],
            printer_config: None,
        }
    }

    /// Create with printer config for monitoring mode
    /// All transports opened through this discovery will be wrapped with a printer
    pub fn with_printer_config(config: PrinterConfig) -> Self {
        Self {
            printer_config: Some(config),
            ..Self::new()
        }
    }

    /// Check if a device matches our known devices
    fn is_known_device(&self, vid: u16, pid: u16) -> bool {
        self.known_devices.contains(&(vid, pid))
    }

    /// List currently attached matching devices, in hidapi enumeration order
    pub fn list_devices(&self) -> Result<Vec<DiscoveredDevice>, TransportError> {
        let api = HidApi::new()?;
        let mut devices: Vec<DiscoveredDevice> = Vec::new();

        for device_info in api.device_list() {
            let vid = device_info.vendor_id();
            let pid = device_info.product_id();

            if !self.is_known_device(vid, pid) {
                continue;
            }

            let path = device_info.path().to_string_lossy().to_string();
            // Some platforms list one entry per usage; keep the first per path
            if devices.iter().any(|d| d.info.device_path == path) {
                continue;
            }

            debug!("Found device: VID={:04X} PID={:04X} path={}", vid, pid, path);

            devices.push(DiscoveredDevice {
                info: TransportDeviceInfo {
                    vid,
                    pid,
                    device_path: path,
                    serial: device_info.serial_number().map(|s| s.to_string()),
                    product_name: device_info.product_string().map(|s| s.to_string()),
                },
            });
        }

        info!("Found {} devices", devices.len());
        Ok(devices)
    }

    /// Open the first matching device
    pub fn open_first(&self) -> Result<Arc<dyn Transport>, TransportError> {
        let devices = self.list_devices()?;
        let first = devices.first().ok_or_else(|| {
            TransportError::DeviceNotFound(format!(
                "no device with signature {:04x}:{:04x}",
                device_registry::VENDOR_ID,
                device_registry::PRODUCT_ID
            ))
        })?;
        self.open_device(first)
    }

    /// Open a specific discovered device
    pub fn open_device(&self, device: &DiscoveredDevice) -> Result<Arc<dyn Transport>, TransportError> {
        self.open_path(&device.info.device_path)
    }

    /// Open a device by platform path (no signature check)
    pub fn open_path(&self, path: &str) -> Result<Arc<dyn Transport>, TransportError> {
        let api = HidApi::new()?;
        let c_path = device_path(path)?;

        let device = api.open_path(&c_path)?;
        // Second handle, owned by the reader thread
        let input_device = api.open_path(&c_path)?;
        debug!("Opened output and input handles for {}", path);

        let info = match api
            .device_list()
            .find(|d| d.path().to_string_lossy() == path)
        {
            Some(d) => TransportDeviceInfo {
                vid: d.vendor_id(),
                pid: d.product_id(),
                device_path: path.to_string(),
                serial: d.serial_number().map(|s| s.to_string()),
                product_name: d.product_string().map(|s| s.to_string()),
            },
            None => {
                let dev_info = device.get_device_info()?;
                TransportDeviceInfo {
                    vid: dev_info.vendor_id(),
                    pid: dev_info.product_id(),
                    device_path: path.to_string(),
                    serial: dev_info.serial_number().map(|s| s.to_string()),
                    product_name: dev_info.product_string().map(|s| s.to_string()),
                }
            }
        };

        if !device_registry::is_supported(info.vid, info.pid) {
            warn!(
                "{} is {}, not a known control surface",
                path,
                info.id_string()
            );
        }

        info!(
            "Opened transport for {:04X}:{:04X} at {}",
            info.vid, info.pid, info.device_path
        );

        let transport: Arc<dyn Transport> = Arc::new(HidTransport::new(device, input_device, info));

        // Wrap with printer if monitoring is enabled
        let transport = match &self.printer_config {
            Some(config) => PrinterTransport::wrap(transport, config.clone()),
            None => transport,
        };

        Ok(transport)
    }

    /// List every HID interface on the system, matching or not
    pub fn list_all_hid() -> Result<Vec<HidInterface>, TransportError> {
        let api = HidApi::new()?;
        Ok(api
            .device_list()
            .map(|d| HidInterface {
                vid: d.vendor_id(),
                pid: d.product_id(),
                usage_page: d.usage_page(),
                usage: d.usage(),
                interface: d.interface_number(),
                path: d.path().to_string_lossy().to_string(),
            })
            .collect())
    }
}

/// Convert a platform path for hidapi
fn device_path(path: &str) -> Result<CString, TransportError> {
    CString::new(path).map_err(|_| TransportError::HidError(format!("invalid device path {path:?}")))
}
