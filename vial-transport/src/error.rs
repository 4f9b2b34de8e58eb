//! Transport error types

use thiserror::Error;

use crate::unpack::UnpackError;

/// Errors that can occur during transport operations
#[derive(Error, Debug)]
pub enum TransportError {
    /// A device operation was attempted while no session is open
    #[error("USB device not connected")]
    NotConnected,

    /// No device matched the requested filters
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    /// More than one device matched and none was selected
    #[error("{0} matching devices found, select one with --device")]
    AmbiguousDevice(usize),

    /// The device went away while a request was in flight
    #[error("Device disconnected")]
    Disconnected,

    // HID-specific errors
    #[error("Communication error: {0}")]
    Communication(String),

    #[error("HID permission denied: {0}")]
    PermissionDenied(String),

    /// Response bytes could not be decoded as requested
    #[error("Malformed response: {0}")]
    Unpack(#[from] UnpackError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl TransportError {
    /// True for platform-level I/O failures (as opposed to "never connected")
    pub fn is_communication(&self) -> bool {
        matches!(
            self,
            Self::Disconnected | Self::Communication(_) | Self::PermissionDenied(_)
        )
    }
}

impl From<hidapi::HidError> for TransportError {
    fn from(e: hidapi::HidError) -> Self {
        let msg = e.to_string();
        if msg.contains("Permission denied") || msg.contains("EPERM") || msg.contains("EACCES") {
            TransportError::PermissionDenied(msg)
        } else {
            TransportError::Communication(msg)
        }
    }
}
