//! The single open device session
//!
//! `ViaSession` owns the device handle and performs the strictly half-duplex
//! request/response cycle. Reports carry no correlation id, so the session
//! lock is held from write until the matching read completes.
//!
//! ```text
//! [HidFeatureTransport / MockTransport]   ← implements Transport (raw I/O)
//!                |
//!          [ViaSession]                    ← framing, send/read cycle, buffers
//!                |
//!     [KeyboardInterface / CLI]
//! ```

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::codec::{self, Endian};
use crate::discovery::DeviceDiscovery;
use crate::error::TransportError;
use crate::protocol::{self, buffer, cmd};
use crate::response::Response;
use crate::types::{DeviceFilter, TransportDeviceInfo};
use crate::unpack::UnpackError;
use crate::Transport;

/// Process-wide device session; at most one device is open at a time
#[derive(Default)]
pub struct ViaSession {
    device: Mutex<Option<Arc<dyn Transport>>>,
}

impl ViaSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session around an already opened transport
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self {
            device: Mutex::new(Some(transport)),
        }
    }

    /// Select and open a device matching `filters`.
    ///
    /// With a `selector` (device path) that device is opened; otherwise
    /// exactly one device must match.
    pub async fn open(
        &self,
        discovery: &dyn DeviceDiscovery,
        filters: &[DeviceFilter],
        selector: Option<&str>,
    ) -> Result<TransportDeviceInfo, TransportError> {
        let devices = discovery.list_devices(filters).await?;

        let chosen = match selector {
            Some(path) => devices
                .into_iter()
                .find(|d| d.info.device_path == path)
                .ok_or_else(|| TransportError::DeviceNotFound(path.to_string()))?,
            None => {
                if devices.len() > 1 {
                    return Err(TransportError::AmbiguousDevice(devices.len()));
                }
                devices.into_iter().next().ok_or_else(|| {
                    TransportError::DeviceNotFound("no device matches the usage filters".into())
                })?
            }
        };

        let transport = discovery.open_device(&chosen).await?;
        self.attach(transport).await;
        Ok(chosen.info)
    }

    /// Install `transport` as the session device, closing any previous one
    pub async fn attach(&self, transport: Arc<dyn Transport>) {
        let mut guard = self.device.lock().await;
        if let Some(previous) = guard.take() {
            if let Err(e) = previous.close().await {
                warn!("Failed to close previous device: {}", e);
            }
        }
        info!("Session opened: {}", transport.device_info().display_name());
        *guard = Some(transport);
    }

    /// Release the device. Calling this when nothing is open is a no-op.
    pub async fn close(&self) {
        let mut guard = self.device.lock().await;
        if let Some(transport) = guard.take() {
            if let Err(e) = transport.close().await {
                warn!("Error while closing device: {}", e);
            }
            info!("Session closed");
        }
    }

    /// Drop the session after the platform reported a disconnect
    pub async fn handle_disconnect(&self) {
        if self.device.lock().await.take().is_some() {
            warn!("Device disconnected, session cleared");
        }
    }

    pub async fn is_open(&self) -> bool {
        self.device.lock().await.is_some()
    }

    /// Ask the open device whether it is still attached.
    ///
    /// A device that has gone away is treated as a disconnect event and the
    /// session is cleared.
    pub async fn is_connected(&self) -> bool {
        let Some(transport) = self.device.lock().await.clone() else {
            return false;
        };
        if transport.is_connected().await {
            return true;
        }
        self.handle_disconnect().await;
        false
    }

    /// Information about the open device, if any
    pub async fn device_info(&self) -> Option<TransportDeviceInfo> {
        self.device
            .lock()
            .await
            .as_ref()
            .map(|t| t.device_info().clone())
    }

    /// Write one report and read exactly one response
    pub async fn send(&self, opcode: u8, args: &[u8]) -> Result<Response, TransportError> {
        let mut guard = self.device.lock().await;
        let transport = guard.as_ref().ok_or(TransportError::NotConnected)?.clone();

        let report = protocol::build_report(opcode, args);
        debug!("{} {:02X?}", cmd::name(opcode), &report[..8]);

        let result = async {
            transport.send_report(&report).await?;
            transport.read_report().await
        }
        .await;

        match result {
            Ok(data) => Ok(Response::new(data)),
            Err(TransportError::Disconnected) => {
                warn!("Device disconnected during 0x{:02X}", opcode);
                *guard = None;
                Err(TransportError::Disconnected)
            }
            Err(e) => Err(e),
        }
    }

    /// Send a Vial sub-command (multiplexed under `VIAL_PREFIX`)
    pub async fn send_vial(&self, sub: u8, args: &[u8]) -> Result<Response, TransportError> {
        let mut full = Vec::with_capacity(args.len() + 1);
        full.push(sub);
        full.extend_from_slice(args);
        self.send(cmd::VIAL_PREFIX, &full).await
    }

    /// Read `total` bytes of a device buffer, one report at a time.
    ///
    /// Each request carries `[offset BE16, size]`; the payload starts after
    /// the 4-byte echoed header.
    pub async fn get_buffer(&self, opcode: u8, total: usize) -> Result<Vec<u8>, TransportError> {
        if total > u16::MAX as usize + 1 {
            return Err(TransportError::Internal(format!(
                "buffer of {total} bytes exceeds the 16-bit offset range"
            )));
        }

        let mut data = Vec::with_capacity(total);
        let mut offset = 0usize;
        while offset < total {
            let size = (total - offset).min(buffer::CHUNK_SIZE);
            let mut args = codec::be16(offset as i64).to_vec();
            args.push(size as u8);

            let resp = self.send(opcode, &args).await?;
            let chunk = resp
                .bytes()
                .get(buffer::HEADER_LEN..buffer::HEADER_LEN + size)
                .ok_or(UnpackError::TooShort {
                    needed: buffer::HEADER_LEN + size,
                    got: resp.len(),
                })?;
            data.extend_from_slice(chunk);
            offset += size;
        }

        debug!("Read {} bytes from buffer 0x{:02X}", data.len(), opcode);
        Ok(data)
    }

    /// [`get_buffer`](Self::get_buffer) decoded as 16-bit words
    pub async fn get_buffer_words(
        &self,
        opcode: u8,
        total: usize,
        endian: Endian,
    ) -> Result<Vec<u16>, TransportError> {
        let bytes = self.get_buffer(opcode, total).await?;
        Ok(Response::new(bytes).u16_array(endian))
    }
}
