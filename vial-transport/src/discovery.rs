//! Device discovery for raw-HID keyboards

use std::sync::Arc;

use async_trait::async_trait;
use hidapi::HidApi;
use tracing::{debug, info};

use crate::error::TransportError;
use crate::hid_device::HidFeatureTransport;
use crate::types::{DeviceFilter, DiscoveredDevice, TransportDeviceInfo};
use crate::Transport;

/// Device discovery abstraction
#[async_trait]
pub trait DeviceDiscovery: Send + Sync {
    /// List currently available devices exposing an interface that matches
    /// one of `filters`
    async fn list_devices(
        &self,
        filters: &[DeviceFilter],
    ) -> Result<Vec<DiscoveredDevice>, TransportError>;

    /// Open a specific device
    async fn open_device(
        &self,
        device: &DiscoveredDevice,
    ) -> Result<Arc<dyn Transport>, TransportError>;
}

/// hidapi-backed discovery
#[derive(Debug, Default)]
pub struct HidDiscovery;

impl HidDiscovery {
    pub fn new() -> Self {
        Self
    }

    fn api() -> Result<HidApi, TransportError> {
        HidApi::new().map_err(|e| TransportError::Communication(e.to_string()))
    }
}

#[async_trait]
impl DeviceDiscovery for HidDiscovery {
    async fn list_devices(
        &self,
        filters: &[DeviceFilter],
    ) -> Result<Vec<DiscoveredDevice>, TransportError> {
        let api = Self::api()?;
        let mut devices = Vec::new();

        for device_info in api.device_list() {
            let usage_page = device_info.usage_page();
            let usage = device_info.usage();
            if !filters.iter().any(|f| f.matches(usage_page, usage)) {
                continue;
            }

            let path = device_info.path().to_string_lossy().to_string();
            debug!(
                "Found device: VID={:04X} PID={:04X} usage={:04X}/{:02X} path={}",
                device_info.vendor_id(),
                device_info.product_id(),
                usage_page,
                usage,
                path
            );

            devices.push(DiscoveredDevice {
                info: TransportDeviceInfo {
                    vid: device_info.vendor_id(),
                    pid: device_info.product_id(),
                    usage_page,
                    usage,
                    device_path: path,
                    serial: device_info.serial_number().map(|s| s.to_string()),
                    product_name: device_info.product_string().map(|s| s.to_string()),
                },
            });
        }

        info!("Found {} devices", devices.len());
        Ok(devices)
    }

    async fn open_device(
        &self,
        device: &DiscoveredDevice,
    ) -> Result<Arc<dyn Transport>, TransportError> {
        let api = Self::api()?;

        let hid_info = api
            .device_list()
            .find(|d| d.path().to_string_lossy() == device.info.device_path)
            .ok_or_else(|| TransportError::DeviceNotFound(device.info.device_path.clone()))?;

        let hid_device = hid_info.open_device(&api).map_err(TransportError::from)?;

        info!(
            "Opened {} ({:04X}:{:04X}) at {}",
            device.info.display_name(),
            device.info.vid,
            device.info.pid,
            device.info.device_path
        );

        Ok(Arc::new(HidFeatureTransport::new(
            hid_device,
            device.info.clone(),
        )))
    }
}
