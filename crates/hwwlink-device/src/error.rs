use hwwlink_envelope::CryptoError;
use hwwlink_frame::FrameError;
use serde::Serialize;
use serde_json::Value;

/// Failure reported by the device firmware inside a well-formed reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("device error {code}: {message}")]
pub struct DeviceError {
    pub code: i64,
    pub message: String,
}

/// Violated preconditions. The session must not be used afterwards.
#[derive(Debug, thiserror::Error)]
pub enum FatalError {
    /// A bootloader request longer than the fixed request size.
    #[error("bootloader message too long ({size} bytes, max {max})")]
    BootloaderPayloadTooLarge { size: usize, max: usize },

    /// The device handle could not be released.
    #[error("failed to close device channel: {0}")]
    CloseFailed(std::io::Error),
}

/// Errors that can occur in a device session.
#[derive(Debug, thiserror::Error)]
pub enum CommError {
    /// Channel read or write failed.
    #[error("device I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The report stream is out of sync with the protocol.
    #[error("frame error: {0}")]
    Frame(FrameError),

    /// The reply is not a JSON object.
    #[error("malformed reply: {0}")]
    MalformedResponse(#[from] serde_json::Error),

    /// An `error` object without a usable `code` and `message`.
    #[error("unexpected reply: {reply}")]
    UnexpectedReply { reply: Value },

    /// The device reported an error.
    #[error(transparent)]
    Device(#[from] DeviceError),

    /// Envelope encryption or decryption failed.
    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    /// A precondition was violated; see [`FatalError`].
    #[error("fatal: {0}")]
    Fatal(#[from] FatalError),

    /// The session was closed.
    #[error("device channel closed")]
    ChannelClosed,
}

impl From<FrameError> for CommError {
    fn from(err: FrameError) -> Self {
        match err {
            FrameError::Io(io) => Self::Io(io),
            other => Self::Frame(other),
        }
    }
}

impl CommError {
    /// True when the session is in an undefined state and must be abandoned.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal(_))
    }

    /// The device-reported error, if this is one.
    pub fn device_error(&self) -> Option<&DeviceError> {
        match self {
            Self::Device(err) => Some(err),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, CommError>;
