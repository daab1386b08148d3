use crate::channel::command_name;

/// Errors that can occur during report encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// A report arrived on an unexpected channel identifier.
    #[error("USB channel ID mismatch (got {observed:#010x}, expected {expected:#010x})")]
    ChannelMismatch { observed: u32, expected: u32 },

    /// The init report carries an unexpected command byte.
    #[error(
        "USB command frame mismatch (got {observed:#04x} {}, expected {expected:#04x} {})",
        command_name(*.observed),
        command_name(*.expected)
    )]
    CommandMismatch { observed: u8, expected: u8 },

    /// A read returned fewer bytes than the report header.
    #[error("short read ({got} bytes, expected at least {min})")]
    ShortRead { got: usize, min: usize },

    /// The payload does not fit the 16-bit length field.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// The configured report size cannot carry a header plus payload.
    #[error("report size too small ({size} bytes, min {min})")]
    ReportTooSmall { size: usize, min: usize },

    /// The device stopped accepting reports.
    #[error("connection closed (report not written)")]
    ConnectionClosed,

    /// An I/O error occurred while reading or writing reports.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FrameError>;
