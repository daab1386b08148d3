//! Duplex device channel abstraction.
//!
//! A channel is the raw link to one hardware wallet: blocking `read`, blocking
//! `write`, and a terminal `close`. Device discovery lives elsewhere; this
//! crate only defines the seam and a couple of concrete links:
//! - hidraw device nodes (Linux `/dev/hidrawN` and friends)
//! - Unix socket pairs, for loopback simulators and tests
//!
//! This is the lowest layer of hwwlink. Everything else builds on top of
//! the [`DeviceChannel`] trait provided here.

pub mod error;
pub mod hidraw;
pub mod traits;

pub use error::{ChannelError, Result};
pub use hidraw::HidrawChannel;
pub use traits::DeviceChannel;
