//! Device module - byte streams to the attached printer

mod mock;
mod usb;

pub use mock::MockPrinter;
pub use usb::{StreamAccess, UsbPrinterStream};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("printer vendor/product id not configured")]
    NotConfigured,

    #[error("no printer found with id {vendor_id:04x}:{product_id:04x}")]
    NotFound { vendor_id: u16, product_id: u16 },

    #[error("HID error: {0}")]
    Hid(#[from] hidapi::HidError),
}
