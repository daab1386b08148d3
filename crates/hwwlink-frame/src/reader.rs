use std::io::{ErrorKind, Read};

use bytes::{Bytes, BytesMut};
use tracing::trace;

use crate::channel::HWW_CMD;
use crate::codec::{
    parse_cont_header, parse_init_header, ReportConfig, CONT_HEADER_SIZE, INIT_HEADER_SIZE,
};
use crate::error::{FrameError, Result};

/// Reassembles messages from a stream of reports.
///
/// Each `read` on the inner stream is treated as one report of at most
/// `read_report_size` bytes. Callers always get a complete payload.
pub struct FrameReader<T> {
    inner: T,
    report: Vec<u8>,
    config: ReportConfig,
    command: u8,
}

impl<T: Read> FrameReader<T> {
    /// Create a new frame reader with default report sizes.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, ReportConfig::default())
    }

    /// Create a new frame reader with explicit report sizes.
    pub fn with_config(inner: T, config: ReportConfig) -> Self {
        Self {
            inner,
            report: vec![0u8; config.read_report_size],
            config,
            command: HWW_CMD,
        }
    }

    /// Expect a different command byte in init reports.
    pub fn with_command(mut self, command: u8) -> Self {
        self.command = command;
        self
    }

    /// Read the next complete message (blocking).
    ///
    /// Bytes past the declared length are report padding and are dropped.
    pub fn read_message(&mut self) -> Result<Bytes> {
        let read_len = self.read_report()?;
        let declared = parse_init_header(&self.report[..read_len], self.command)?;

        let mut data = BytesMut::with_capacity(declared.max(read_len));
        data.extend_from_slice(&self.report[INIT_HEADER_SIZE..read_len]);

        let mut reports = 1usize;
        while data.len() < declared {
            let read_len = self.read_report()?;
            parse_cont_header(&self.report[..read_len])?;
            data.extend_from_slice(&self.report[CONT_HEADER_SIZE..read_len]);
            reports += 1;
        }

        data.truncate(declared);
        trace!(declared, reports, "reassembled message");
        Ok(data.freeze())
    }

    fn read_report(&mut self) -> Result<usize> {
        loop {
            match self.inner.read(&mut self.report) {
                Ok(n) => return Ok(n),
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

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current report configuration.
    pub fn config(&self) -> &ReportConfig {
        &self.config
    }
}
