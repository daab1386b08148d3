use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{ChannelError, Result};
use crate::traits::DeviceChannel;

/// Channel backed by a raw HID device node.
///
/// On Linux this is a `/dev/hidrawN` node: every `write` sends one output
/// report and every `read` returns one input report. The node is opened
/// read/write and released on [`DeviceChannel::close`] or drop.
pub struct HidrawChannel {
    file: Option<File>,
    path: PathBuf,
}

impl HidrawChannel {
    /// Open a device node for reading and writing (blocking).
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&path)
            .map_err(|source| ChannelError::Open {
                path: path.clone(),
                source,
            })?;

        debug!(?path, "opened hid device node");

        Ok(Self {
            file: Some(file),
            path,
        })
    }

    /// The device node this channel was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the channel has been closed.
    pub fn is_closed(&self) -> bool {
        self.file.is_none()
    }

    fn file_mut(&mut self) -> std::io::Result<&mut File> {
        self.file
            .as_mut()
            .ok_or_else(|| std::io::Error::new(ErrorKind::NotConnected, "device channel closed"))
    }
}

impl Read for HidrawChannel {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.file_mut()?.read(buf)
    }
}

impl Write for HidrawChannel {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.file_mut()?.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.file_mut()?.flush()
    }
}

impl DeviceChannel for HidrawChannel {
    fn close(&mut self) -> std::io::Result<()> {
        match self.file.take() {
            Some(file) => {
                debug!(path = ?self.path, "closing hid device node");
                drop(file);
                Ok(())
            }
            None => Err(std::io::Error::new(
                ErrorKind::NotConnected,
                "device channel already closed",
            )),
        }
    }
}

impl std::fmt::Debug for HidrawChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HidrawChannel")
            .field("path", &self.path)
            .field("open", &self.file.is_some())
            .finish()
    }
}
