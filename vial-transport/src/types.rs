//! Common types for transport layer

use serde::{Deserialize, Serialize};

use crate::protocol::device;

/// A (usage page, usage) pair used to select the raw-HID interface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceFilter {
    pub usage_page: u16,
    pub usage: u16,
}

impl DeviceFilter {
    pub const fn new(usage_page: u16, usage: u16) -> Self {
        Self { usage_page, usage }
    }

    /// Check whether an interface with this usage page/usage matches
    pub fn matches(&self, usage_page: u16, usage: u16) -> bool {
        self.usage_page == usage_page && self.usage == usage
    }
}

impl Default for DeviceFilter {
    /// The VIA raw-HID interface (0xFF60 / 0x61)
    fn default() -> Self {
        Self::new(device::USAGE_PAGE, device::USAGE)
    }
}

/// Device identification information
#[derive(Debug, Clone)]
pub struct TransportDeviceInfo {
    /// USB Vendor ID
    pub vid: u16,
    /// USB Product ID
    pub pid: u16,
    /// HID usage page of the opened interface
    pub usage_page: u16,
    /// HID usage of the opened interface
    pub usage: u16,
    /// Platform device path
    pub device_path: String,
    /// Serial number if available
    pub serial: Option<String>,
    /// Product name if available
    pub product_name: Option<String>,
}

impl TransportDeviceInfo {
    /// Name shown to the user, falling back to VID:PID
    pub fn display_name(&self) -> String {
        match &self.product_name {
            Some(name) if !name.is_empty() => name.clone(),
            _ => format!("{:04X}:{:04X}", self.vid, self.pid),
        }
    }
}

/// Discovered device that can be opened
#[derive(Debug, Clone)]
pub struct DiscoveredDevice {
    /// Device information
    pub info: TransportDeviceInfo,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filter_is_via_raw_hid() {
        let filter = DeviceFilter::default();
        assert!(filter.matches(0xFF60, 0x61));
        assert!(!filter.matches(0xFF60, 0x62));
    }

    #[test]
    fn display_name_falls_back_to_ids() {
        let mut info = TransportDeviceInfo {
            vid: 0xD772,
            pid: 0x0002,
            usage_page: 0xFF60,
            usage: 0x61,
            device_path: "/dev/hidraw3".into(),
            serial: None,
            product_name: None,
        };
        assert_eq!(info.display_name(), "D772:0002");
        info.product_name = Some("Svalboard".into());
        assert_eq!(info.display_name(), "Svalboard");
    }
}
