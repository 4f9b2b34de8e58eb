//! Keyboard interface error types

use thiserror::Error;
use vial_transport::{TransportError, UnpackError};

/// Errors from keyboard operations
#[derive(Error, Debug)]
pub enum KeyboardError {
    /// Transport layer error (not connected, communication failure)
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The definition payload is not a valid xz stream
    #[error("Failed to decompress keyboard definition ({len} bytes, starts {preview:02X?}): {reason}")]
    Decompress {
        len: usize,
        preview: Vec<u8>,
        reason: String,
    },

    /// The decompressed definition is not the expected JSON document
    #[error("Invalid keyboard definition: {0}")]
    InvalidDescriptor(String),

    /// Device returned a response that could not be decoded
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Failed to get layer count")]
    LayerCount,

    #[error("No settings available to push")]
    NoSettings,

    /// Feature not supported by this device
    #[error("Feature not supported: {0}")]
    NotSupported(String),

    /// Invalid parameter value
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

impl From<UnpackError> for KeyboardError {
    fn from(e: UnpackError) -> Self {
        KeyboardError::MalformedResponse(e.to_string())
    }
}

impl KeyboardError {
    /// True when the failure came from the device link rather than its data
    pub fn is_communication(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_communication())
    }

    pub fn is_not_connected(&self) -> bool {
        matches!(self, Self::Transport(TransportError::NotConnected))
    }
}
