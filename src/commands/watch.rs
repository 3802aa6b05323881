//! Key event monitoring.

use std::sync::atomic::Ordering;
use std::time::Duration;

use crossterm::style::Stylize;
use tokio::sync::broadcast::error::TryRecvError;
use tracing::warn;
use xldeck_surface::{KeyIndex, SurfaceEvent};

use super::{setup_interrupt_handler, CommandResult, Context};

/// Poll interval while no events are queued
const IDLE_POLL: Duration = Duration::from_millis(10);

/// Print key presses and releases until Ctrl-C or an input error
pub fn watch(ctx: &Context) -> CommandResult {
    let surface = ctx.open_surface()?;
    let mut events = surface.subscribe();
    let running = setup_interrupt_handler();

    println!(
        "Watching {} ({}), Ctrl-C to stop",
        surface.device_info().device_path,
        surface.device_info().id_string()
    );

    while running.load(Ordering::SeqCst) {
        match events.try_recv() {
            Ok(event) => {
                if !print_event(&event) {
                    break;
                }
            }
            Err(TryRecvError::Empty) => std::thread::sleep(IDLE_POLL),
            Err(TryRecvError::Lagged(n)) => warn!("Missed {} events", n),
            Err(TryRecvError::Closed) => break,
        }
    }

    let held = surface.key_states().pressed();
    if !held.is_empty() {
        println!("Still held: {held:?}");
    }
    Ok(())
}

/// Print one event; returns false once the input side has failed
fn print_event(event: &SurfaceEvent) -> bool {
    match event {
        SurfaceEvent::KeyDown(k) => {
            println!("{} key {:>2}  {}", "DOWN".green().bold(), k, grid_position(*k));
        }
        SurfaceEvent::KeyUp(k) => {
            println!("{}   key {:>2}  {}", "UP".dim(), k, grid_position(*k));
        }
        SurfaceEvent::MalformedReport { len } => {
            println!("{} dropped {len}-byte report", "WARN".yellow());
        }
        SurfaceEvent::TransportError(e) => {
            println!("{} {e}", "ERR".red().bold());
            return false;
        }
    }
    true
}

fn grid_position(key: u8) -> String {
    match KeyIndex::new(key.into()) {
        Ok(index) => {
            let (col, row) = index.position();
            format!("(col {col}, row {row})")
        }
        Err(_) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xldeck_transport::TransportError;

    #[test]
    fn test_grid_position() {
        assert_eq!(grid_position(0), "(col 0, row 0)");
        assert_eq!(grid_position(15), "(col 7, row 1)");
        assert_eq!(grid_position(40), "");
    }

    #[test]
    fn test_stops_on_transport_error() {
        assert!(print_event(&SurfaceEvent::KeyDown(1)));
        assert!(print_event(&SurfaceEvent::MalformedReport { len: 3 }));
        assert!(!print_event(&SurfaceEvent::TransportError(
            TransportError::HidError("read failed".into())
        )));
        assert!(!print_event(&SurfaceEvent::TransportError(
            TransportError::HidPermissionDenied("hidraw".into())
        )));
    }
}
