//! USB printer stream over hidapi

use super::DeviceError;
use crate::bidi::PrinterStream;
use crate::core::config::DeviceConfig;
use hidapi::{HidApi, HidDevice};
use tracing::{debug, info, warn};

/// How the monitor opened the device for this call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamAccess {
    ReadWrite,
    /// Status reads during printing; writes are refused
    ReadOnly,
}

/// Printer stream backed by an open HID device
pub struct UsbPrinterStream {
    device: HidDevice,
    access: StreamAccess,
    read_timeout_ms: i32,
}

impl UsbPrinterStream {
    /// Open the first device matching the configured vendor/product id
    pub fn open(config: &DeviceConfig, access: StreamAccess) -> Result<Self, DeviceError> {
        if config.vendor_id == 0 || config.product_id == 0 {
            return Err(DeviceError::NotConfigured);
        }

        let api = HidApi::new()?;
        let device_info = api
            .device_list()
            .find(|d| {
                d.vendor_id() == config.vendor_id
                    && d.product_id() == config.product_id
                    && config
                        .interface
                        .map_or(true, |iface| d.interface_number() == iface)
            })
            .ok_or(DeviceError::NotFound {
                vendor_id: config.vendor_id,
                product_id: config.product_id,
            })?;

        let device = device_info.open_device(&api)?;
        info!(
            "Opened printer: {} {} ({:?})",
            device_info.manufacturer_string().unwrap_or("Unknown"),
            device_info.product_string().unwrap_or("Unknown"),
            access
        );

        Ok(Self {
            device,
            access,
            read_timeout_ms: config.read_timeout_ms,
        })
    }

    pub fn access(&self) -> StreamAccess {
        self.access
    }
}

impl PrinterStream for UsbPrinterStream {
    fn write(&mut self, data: &[u8]) -> usize {
        if self.access == StreamAccess::ReadOnly {
            warn!("Write refused on read-only printer stream");
            return 0;
        }

        #[cfg(any(target_os = "macos", target_os = "windows"))]
        let (report, prefix) = {
            let mut report = Vec::with_capacity(data.len() + 1);
            report.push(0x00); // Report ID
            report.extend_from_slice(data);
            (report, 1)
        };

        #[cfg(not(any(target_os = "macos", target_os = "windows")))]
        let (report, prefix) = (data.to_vec(), 0);

        match self.device.write(&report) {
            Ok(written) => {
                debug!("Wrote {} bytes to printer", written);
                written.saturating_sub(prefix).min(data.len())
            }
            Err(e) => {
                warn!("Printer write failed: {}", e);
                0
            }
        }
    }

    fn read(&mut self, max_len: usize) -> Vec<u8> {
        let mut buffer = vec![0u8; max_len];
        match self.device.read_timeout(&mut buffer, self.read_timeout_ms) {
            Ok(n) => {
                buffer.truncate(n);
                buffer
            }
            Err(e) => {
                warn!("Printer read failed: {}", e);
                Vec::new()
            }
        }
    }
}
