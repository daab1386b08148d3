use std::path::PathBuf;

/// Errors that can occur while opening or driving a device channel.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    /// Failed to open the device node.
    #[error("failed to open device {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    /// An I/O error occurred on the channel.
    #[error("channel I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ChannelError>;
