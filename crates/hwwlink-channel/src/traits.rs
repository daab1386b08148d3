use std::io::{Read, Write};

/// A duplex link to one device: `Read` + `Write` plus a terminal close.
///
/// Each `write` call carries exactly one report and each `read` call returns at
/// most one report. Implementations must be `Send` so a session can hand the
/// channel between caller threads behind its lock.
pub trait DeviceChannel: Read + Write + Send {
    /// Release the underlying handle.
    ///
    /// After a successful close every further read or write fails. A failed
    /// close leaves the device in an undefined state.
    fn close(&mut self) -> std::io::Result<()>;
}

impl<T: DeviceChannel + ?Sized> DeviceChannel for Box<T> {
    fn close(&mut self) -> std::io::Result<()> {
        (**self).close()
    }
}

#[cfg(unix)]
impl DeviceChannel for std::os::unix::net::UnixStream {
    fn close(&mut self) -> std::io::Result<()> {
        match self.shutdown(std::net::Shutdown::Both) {
            Ok(()) => Ok(()),
            // The peer already went away; nothing left to release.
            Err(err) if err.kind() == std::io::ErrorKind::NotConnected => Ok(()),
            Err(err) => Err(err),
        }
    }
}
