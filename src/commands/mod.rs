//! Command handlers for the CLI application.
//!
//! This module organizes command handlers by category:
//! - `query`: Read-only commands (list, info)
//! - `render`: Key image commands (fill, image, clear)
//! - `set`: Panel commands (brightness, reset)
//! - `watch`: Key event monitoring
//! - `apply`: Apply the config file to the panel

pub mod apply;
pub mod query;
pub mod render;
pub mod set;
pub mod watch;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Context as _;
use xldeck_surface::DeckSurface;
use xldeck_transport::{HidDiscovery, PacketFilter, PrinterConfig};

/// Result type for command handlers
pub type CommandResult = anyhow::Result<()>;

/// Settings every device command needs
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// Explicit device path
    pub device: Option<String>,
    /// Wrap the transport with a traffic printer
    pub printer_config: Option<PrinterConfig>,
}

impl Context {
    fn discovery(&self) -> HidDiscovery {
        match &self.printer_config {
            Some(config) => HidDiscovery::with_printer_config(config.clone()),
            None => HidDiscovery::new(),
        }
    }

    /// Open the selected control surface
    pub fn open_surface(&self) -> anyhow::Result<DeckSurface> {
        DeckSurface::open_with(&self.discovery(), self.device.as_deref()).with_context(|| {
            match &self.device {
                Some(path) => format!("opening {path}"),
                None => "opening first attached control surface".to_string(),
            }
        })
    }
}

/// Set up a Ctrl-C handler that sets the given flag to false when triggered.
/// Returns the Arc<AtomicBool> for use in the main loop.
pub fn setup_interrupt_handler() -> Arc<AtomicBool> {
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = Arc::clone(&running);

    if let Err(e) = ctrlc::set_handler(move || {
        running_clone.store(false, Ordering::SeqCst);
    }) {
        eprintln!("Warning: Could not set Ctrl+C handler: {e}");
    }

    running
}

/// Create printer config from CLI flags
pub fn create_printer_config(
    monitor: bool,
    hex: bool,
    filter: Option<&str>,
) -> anyhow::Result<Option<PrinterConfig>> {
    if !monitor {
        return Ok(None);
    }

    let filter = match filter {
        Some(f) => f.parse::<PacketFilter>().map_err(anyhow::Error::msg)?,
        None => PacketFilter::All,
    };

    Ok(Some(
        PrinterConfig::default().with_hex(hex).with_filter(filter),
    ))
}
