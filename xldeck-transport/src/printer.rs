//! PrinterTransport middleware for monitoring transport traffic
//!
//! Wraps any [`Transport`] and prints every frame, feature report and input
//! report passing through it to stderr, decoded where possible.
//!
//! # Example
//!
//! ```ignore
//! use xldeck_transport::{HidDiscovery, PrinterConfig, PrinterTransport};
//!
//! let transport = HidDiscovery::new().open_first()?;
//! let monitored = PrinterTransport::wrap(transport, PrinterConfig::default());
//! // Now all traffic will be printed
//! ```

use std::str::FromStr;
use std::sync::Arc;

use crossterm::style::Stylize;

use crate::protocol::{self, cmd, report, ImageFrameHeader};
use crate::{ReportSink, Transport, TransportDeviceInfo, TransportError};

/// Packet filter for selective display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PacketFilter {
    #[default]
    All,
    /// Streamed image frames only
    Frames,
    /// Feature reports only
    Features,
    /// Input reports only
    Input,
}

impl FromStr for PacketFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" | "" => Ok(Self::All),
            "frames" | "frame" | "images" => Ok(Self::Frames),
            "features" | "feature" => Ok(Self::Features),
            "input" | "inputs" | "events" => Ok(Self::Input),
            other => Err(format!("Unknown filter: {other}")),
        }
    }
}

/// Configuration for the PrinterTransport
#[derive(Debug, Clone, Default)]
pub struct PrinterConfig {
    /// Show raw hex dump alongside decoded output
    pub show_hex: bool,
    /// Filter for selective display
    pub filter: PacketFilter,
}

impl PrinterConfig {
    /// Create config with hex output setting
    pub fn with_hex(mut self, show: bool) -> Self {
        self.show_hex = show;
        self
    }

    /// Create config with filter
    pub fn with_filter(mut self, filter: PacketFilter) -> Self {
        self.filter = filter;
        self
    }

    fn shows(&self, kind: PacketFilter) -> bool {
        self.filter == PacketFilter::All || self.filter == kind
    }
}

/// Transport middleware that prints all traffic
pub struct PrinterTransport {
    inner: Arc<dyn Transport>,
    config: PrinterConfig,
}

impl PrinterTransport {
    /// Wrap a transport with printing middleware
    pub fn wrap(transport: Arc<dyn Transport>, config: PrinterConfig) -> Arc<dyn Transport> {
        Arc::new(Self {
            inner: transport,
            config,
        })
    }

    fn print_frame(&self, data: &[u8]) {
        if !self.config.shows(PacketFilter::Frames) {
            return;
        }
        match ImageFrameHeader::parse(data) {
            Some(h) => eprintln!(
                "{} {}  key={:<2} seq={:<3} len={:<4}{}",
                ">>>".cyan(),
                "IMG".cyan().bold(),
                h.key,
                h.sequence.get(),
                h.payload_len.get(),
                if h.is_last() { " LAST" } else { "" }
            ),
            None => eprintln!(
                "{} {}  {:02x?}",
                ">>>".cyan(),
                "OUT".cyan().bold(),
                &data[..data.len().min(16)]
            ),
        }
        if self.config.show_hex {
            eprintln!("    {}  {:02x?}", "HEX".dim(), &data[..data.len().min(32)]);
        }
    }

    fn print_feature(&self, data: &[u8]) {
        if !self.config.shows(PacketFilter::Features) {
            return;
        }
        match data {
            [report::CONTROL, cmd::SET_BRIGHTNESS, pct, ..] => eprintln!(
                "{} {}  {} {}%",
                ">>>".cyan(),
                "FEA".cyan().bold(),
                cmd::name(cmd::SET_BRIGHTNESS).yellow(),
                pct
            ),
            [report::CONTROL, c, ..] => eprintln!(
                "{} {}  {}",
                ">>>".cyan(),
                "FEA".cyan().bold(),
                cmd::name(*c).yellow()
            ),
            _ => eprintln!("{} {}  {:02x?}", ">>>".cyan(), "FEA".cyan().bold(), data),
        }
        if self.config.show_hex {
            eprintln!("    {}  {:02x?}", "HEX".dim(), data);
        }
    }

    fn print_feature_read(&self, report_id: u8, data: &[u8]) {
        if !self.config.shows(PacketFilter::Features) {
            return;
        }
        let offset = match report_id {
            report::SERIAL_NUMBER => 2,
            report::FIRMWARE_VERSION => 6,
            _ => 1,
        };
        eprintln!(
            "{} {}  0x{:02x} {:?}",
            "<<<".green(),
            "FEA".green().bold(),
            report_id,
            protocol::extract_string(data, offset)
        );
        if self.config.show_hex {
            eprintln!("    {}  {:02x?}", "HEX".dim(), data);
        }
    }
}

impl Transport for PrinterTransport {
    fn write(&self, data: &[u8]) -> Result<(), TransportError> {
        self.print_frame(data);
        self.inner.write(data)
    }

    fn send_feature_report(&self, data: &[u8]) -> Result<(), TransportError> {
        self.print_feature(data);
        self.inner.send_feature_report(data)
    }

    fn get_feature_report(&self, report_id: u8, len: usize) -> Result<Vec<u8>, TransportError> {
        let data = self.inner.get_feature_report(report_id, len)?;
        self.print_feature_read(report_id, &data);
        Ok(data)
    }

    fn device_info(&self) -> &TransportDeviceInfo {
        self.inner.device_info()
    }

    fn start_reader(&self, sink: Arc<dyn ReportSink>) -> Result<(), TransportError> {
        let printing = PrintingSink {
            inner: sink,
            config: self.config.clone(),
        };
        self.inner.start_reader(Arc::new(printing))
    }
}

/// Sink wrapper that prints input traffic before passing it on
struct PrintingSink {
    inner: Arc<dyn ReportSink>,
    config: PrinterConfig,
}

impl ReportSink for PrintingSink {
    fn on_report(&self, data: &[u8]) {
        if self.config.shows(PacketFilter::Input) {
            let start = protocol::INPUT_HEADER_SIZE;
            let pressed: Vec<usize> = data
                .get(start..start + protocol::KEY_COUNT)
                .unwrap_or_default()
                .iter()
                .enumerate()
                .filter(|(_, b)| **b == 1)
                .map(|(i, _)| i)
                .collect();
            eprintln!(
                "{} {}  len={} pressed={:?}",
                "<<<".yellow(),
                "IN ".yellow().bold(),
                data.len(),
                pressed
            );
            if self.config.show_hex {
                eprintln!("    {}  {:02x?}", "HEX".dim(), data);
            }
        }
        self.inner.on_report(data);
    }

    fn on_error(&self, error: TransportError) {
        if self.config.shows(PacketFilter::Input) {
            eprintln!("{} {}  {}", "<<<".red(), "ERR".red().bold(), error);
        }
        self.inner.on_error(error);
    }
}
