//! Key press decoding
//!
//! Input report layout:
//!
//! ```text
//! [0..4]   metadata (ignored)
//! [4..36]  one status byte per key, 1 = pressed
//! [36]     trailer (ignored)
//! ```

use tracing::trace;
use xldeck_transport::protocol::{INPUT_HEADER_SIZE, INPUT_REPORT_MIN, KEY_COUNT};

use crate::error::SurfaceError;

/// A key changed state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    Down(u8),
    Up(u8),
}

impl KeyEvent {
    pub fn key(&self) -> u8 {
        match *self {
            KeyEvent::Down(k) | KeyEvent::Up(k) => k,
        }
    }
}

/// Pressed state of every key
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyStates([bool; KEY_COUNT]);

impl KeyStates {
    pub fn is_pressed(&self, key: u8) -> bool {
        self.0.get(key as usize).copied().unwrap_or(false)
    }

    /// Indices of pressed keys, ascending
    pub fn pressed(&self) -> Vec<u8> {
        (0..KEY_COUNT as u8).filter(|&k| self.0[k as usize]).collect()
    }
}

/// Diffs successive input reports against the last known key states
#[derive(Debug, Default)]
pub struct InputDecoder {
    states: KeyStates,
}

impl InputDecoder {
    /// All keys released
    pub fn new() -> Self {
        Self::default()
    }

    pub fn states(&self) -> KeyStates {
        self.states
    }

    /// Apply one report and return its transitions in ascending key order
    ///
    /// A report shorter than 37 bytes is rejected without touching the
    /// state. Bytes past the trailer are ignored.
    pub fn decode(&mut self, report: &[u8]) -> Result<Vec<KeyEvent>, SurfaceError> {
        if report.len() < INPUT_REPORT_MIN {
            return Err(SurfaceError::MalformedReport {
                expected: INPUT_REPORT_MIN,
                got: report.len(),
            });
        }

        let status = &report[INPUT_HEADER_SIZE..INPUT_HEADER_SIZE + KEY_COUNT];
        let mut events = Vec::new();
        for (i, &byte) in status.iter().enumerate() {
            let pressed = byte == 1;
            if self.states.0[i] != pressed {
                self.states.0[i] = pressed;
                let key = i as u8;
                events.push(if pressed {
                    KeyEvent::Down(key)
                } else {
                    KeyEvent::Up(key)
                });
            }
        }

        if !events.is_empty() {
            trace!("Input report: {:?}", events);
        }
        Ok(events)
    }
}
