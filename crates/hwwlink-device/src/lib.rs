//! Serialized request/response sessions with a hardware wallet.
//!
//! This is the layer callers talk to. A [`Communication`] owns the device
//! channel and offers four calls: plain JSON send, encrypted JSON send,
//! bootloader send and close. Every round trip holds the session lock, so
//! concurrent callers never see each other's reports.

pub mod bootloader;
pub mod communication;
pub mod config;
pub mod error;
pub mod redact;
pub mod reply;

#[cfg(test)]
mod testing;

pub use communication::Communication;
pub use config::{
    BootloaderConfig, CommunicationConfig, BOOTLOADER_REQUEST_LEN, BOOTLOADER_RESPONSE_LEN,
};
pub use error::{CommError, DeviceError, FatalError, Result};
pub use redact::{redact, PLACEHOLDER};
pub use reply::Reply;
