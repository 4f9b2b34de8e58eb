//! hidapi-backed transport using feature reports

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use hidapi::HidDevice;
use parking_lot::Mutex;
use tracing::debug;

use crate::error::TransportError;
use crate::protocol::{MSG_LEN, REPORT_SIZE};
use crate::types::TransportDeviceInfo;
use crate::Transport;

/// Raw-HID transport for a USB keyboard
///
/// Each command is written as one feature report and answered by one
/// feature report read.
pub struct HidFeatureTransport {
    device: Mutex<HidDevice>,
    info: TransportDeviceInfo,
    closed: AtomicBool,
}

impl HidFeatureTransport {
    pub fn new(device: HidDevice, info: TransportDeviceInfo) -> Self {
        Self {
            device: Mutex::new(device),
            info,
            closed: AtomicBool::new(false),
        }
    }

    fn ensure_open(&self) -> Result<(), TransportError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(TransportError::Disconnected);
        }
        Ok(())
    }
}

#[async_trait]
impl Transport for HidFeatureTransport {
    async fn send_report(&self, report: &[u8]) -> Result<(), TransportError> {
        self.ensure_open()?;
        let mut buf = vec![0u8; REPORT_SIZE];
        let len = report.len().min(MSG_LEN);
        buf[1..1 + len].copy_from_slice(&report[..len]);
        debug!("-> {:02X?}", &buf[1..9]);

        let device = self.device.lock();
        device.send_feature_report(&buf)?;
        Ok(())
    }

    async fn read_report(&self) -> Result<Vec<u8>, TransportError> {
        self.ensure_open()?;
        let mut buf = vec![0u8; REPORT_SIZE];
        let read = {
            let device = self.device.lock();
            device.get_feature_report(&mut buf)?
        };
        if read == 0 {
            return Err(TransportError::Communication(
                "empty feature report".into(),
            ));
        }
        debug!("<- {:02X?}", &buf[1..9]);
        Ok(buf[1..].to_vec())
    }

    fn device_info(&self) -> &TransportDeviceInfo {
        &self.info
    }

    async fn is_connected(&self) -> bool {
        if self.closed.load(Ordering::SeqCst) {
            return false;
        }
        let device = self.device.lock();
        device.get_product_string().is_ok()
    }

    async fn close(&self) -> Result<(), TransportError> {
        // HidDevice is released on drop; further I/O is refused
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

impl Drop for HidFeatureTransport {
    fn drop(&mut self) {
        debug!("HidFeatureTransport for {} dropped", self.info.device_path);
    }
}
