use std::fmt;
use std::io;

use hwwlink_channel::ChannelError;
use hwwlink_device::CommError;
use hwwlink_frame::FrameError;

// Exit code constants aligned with rsfulmen/DDR-0002 semantics.
pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const DEVICE_ERROR: i32 = 70;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::NotFound | io::ErrorKind::NotConnected => FAILURE,
        io::ErrorKind::UnexpectedEof | io::ErrorKind::BrokenPipe => TRANSPORT_ERROR,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn channel_error(context: &str, err: ChannelError) -> CliError {
    match err {
        ChannelError::Open { path, source } => {
            io_error(&format!("{context} ({})", path.display()), source)
        }
        ChannelError::Io(source) => io_error(context, source),
    }
}

pub fn frame_error(context: &str, err: FrameError) -> CliError {
    match err {
        FrameError::Io(source) => io_error(context, source),
        FrameError::PayloadTooLarge { .. } => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
        FrameError::ReportTooSmall { .. } => CliError::new(USAGE, format!("{context}: {err}")),
        other => CliError::new(TRANSPORT_ERROR, format!("{context}: {other}")),
    }
}

pub fn comm_error(context: &str, err: CommError) -> CliError {
    match err {
        CommError::Io(source) => io_error(context, source),
        CommError::Frame(err) => frame_error(context, err),
        CommError::Device(err) => CliError::new(DEVICE_ERROR, format!("{context}: {err}")),
        CommError::MalformedResponse(_)
        | CommError::UnexpectedReply { .. }
        | CommError::Crypto(_) => CliError::new(DATA_INVALID, format!("{context}: {err}")),
        CommError::ChannelClosed => CliError::new(FAILURE, format!("{context}: {err}")),
        CommError::Fatal(_) => CliError::new(INTERNAL, format!("{context}: {err}")),
    }
}
