//! Surface session error types

use thiserror::Error;
use xldeck_transport::TransportError;

/// Errors from control-surface operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SurfaceError {
    /// Key index, channel, image length or brightness out of range.
    /// Always reported before anything is sent.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// No device matching the hardware signature
    #[error("Device not found: {0}")]
    NotFound(String),

    /// Transport layer error, passed through unmodified
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Input report too short to hold the key status bytes
    #[error("Malformed input report: expected at least {expected} bytes, got {got}")]
    MalformedReport { expected: usize, got: usize },

    /// Icon compression failed
    #[error("Encode error: {0}")]
    Encode(String),
}
