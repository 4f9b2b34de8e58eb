//! Transport layer for VIA/Vial keyboard communication
//!
//! This crate turns logical commands (an opcode plus argument bytes) into
//! fixed-size raw-HID reports and back:
//!
//! - [`Transport`]: raw report I/O, one implementation per backend
//! - [`ViaSession`]: the single open device session, request/response cycle,
//!   multi-report buffer reads
//! - [`codec`] / [`unpack`]: byte-order helpers and struct-style decoding

pub mod codec;
pub mod error;
pub mod protocol;
pub mod response;
pub mod types;
pub mod unpack;

mod discovery;
mod hid_device;
mod session;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use codec::{Endian, WordSize};
pub use discovery::{DeviceDiscovery, HidDiscovery};
pub use error::TransportError;
pub use hid_device::HidFeatureTransport;
pub use response::Response;
pub use session::ViaSession;
pub use types::{DeviceFilter, DiscoveredDevice, TransportDeviceInfo};
pub use unpack::UnpackError;

use async_trait::async_trait;
use std::sync::Arc;

/// Raw report I/O - all backends implement this
///
/// Implementations only move bytes; framing, correlation and decoding live
/// in [`ViaSession`].
#[async_trait]
pub trait Transport: Send + Sync {
    /// Write one report
    ///
    /// # Arguments
    /// * `report` - `MSG_LEN` bytes starting with the opcode (no report ID)
    async fn send_report(&self, report: &[u8]) -> Result<(), TransportError>;

    /// Read one feature report
    ///
    /// # Returns
    /// `MSG_LEN` bytes, report ID stripped
    async fn read_report(&self) -> Result<Vec<u8>, TransportError>;

    /// Get device information
    fn device_info(&self) -> &TransportDeviceInfo;

    /// Check if transport is still connected
    async fn is_connected(&self) -> bool;

    /// Release the device
    async fn close(&self) -> Result<(), TransportError>;
}

/// Type alias for a shared transport
pub type BoxedTransport = Arc<dyn Transport>;
