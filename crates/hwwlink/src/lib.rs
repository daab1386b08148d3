//! USB-HID transport and encryption envelope for hardware wallets.
//!
//! hwwlink turns JSON command strings into fixed-size HID reports, reassembles
//! the device's replies, and optionally seals both directions under a
//! password-derived key.
//!
//! # Crate Structure
//!
//! - [`channel`]: Duplex device channel abstraction (hidraw, socket pairs)
//! - [`frame`]: Init/continuation report framing
//! - [`envelope`]: Password-derived encryption (behind `device` feature)
//! - [`device`]: Locked request/response sessions (behind `device` feature)

/// Re-export channel types.
pub mod channel {
    pub use hwwlink_channel::*;
}

/// Re-export frame types.
pub mod frame {
    pub use hwwlink_frame::*;
}

/// Re-export envelope types (requires `device` feature).
#[cfg(feature = "device")]
pub mod envelope {
    pub use hwwlink_envelope::*;
}

/// Re-export session types (requires `device` feature).
#[cfg(feature = "device")]
pub mod device {
    pub use hwwlink_device::*;
}
