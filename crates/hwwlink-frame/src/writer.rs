use std::io::{ErrorKind, Write};

use tracing::trace;

use crate::channel::{HWW_CID, HWW_CMD};
use crate::codec::{encode_message, ReportConfig};
use crate::error::{FrameError, Result};

/// Writes messages to any `Write` stream as padded reports.
pub struct FrameWriter<T> {
    inner: T,
    config: ReportConfig,
    cid: u32,
    command: u8,
}

impl<T: Write> FrameWriter<T> {
    /// Create a new frame writer with default report sizes.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, ReportConfig::default())
    }

    /// Create a new frame writer with explicit report sizes.
    pub fn with_config(inner: T, config: ReportConfig) -> Self {
        Self {
            inner,
            config,
            cid: HWW_CID,
            command: HWW_CMD,
        }
    }

    /// Use a different command byte in init reports.
    pub fn with_command(mut self, command: u8) -> Self {
        self.command = command;
        self
    }

    /// Encode a payload and write every report in order (blocking).
    ///
    /// An empty payload writes nothing. Each report goes out in its own
    /// `write` call so HID layers see one report per call.
    pub fn send(&mut self, payload: &[u8]) -> Result<()> {
        let reports = encode_message(
            payload,
            self.cid,
            self.command,
            self.config.write_report_size,
        )?;
        if reports.is_empty() {
            return Ok(());
        }

        for report in &reports {
            self.write_report(report)?;
        }
        trace!(len = payload.len(), reports = reports.len(), "wrote message");

        self.flush()
    }

    /// Write one raw report, retrying partial and interrupted writes.
    pub fn write_report(&mut self, report: &[u8]) -> Result<()> {
        let mut offset = 0usize;
        while offset < report.len() {
            match self.inner.write(&report[offset..]) {
                Ok(0) => return Err(FrameError::ConnectionClosed),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
        Ok(())
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current report configuration.
    pub fn config(&self) -> &ReportConfig {
        &self.config
    }
}
