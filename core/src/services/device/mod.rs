//! Device trust service

mod service;

pub use service::{DeviceService, DeviceServiceConfig};
