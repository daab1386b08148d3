use std::io::ErrorKind;

use hwwlink_channel::DeviceChannel;
use hwwlink_frame::FrameWriter;
use tracing::{debug, error};

use crate::communication::Communication;
use crate::error::{CommError, FatalError, Result};

impl<C: DeviceChannel> Communication<C> {
    /// Send a raw request in the fixed-length format the bootloader expects.
    ///
    /// The request is zero-padded to the configured request length and
    /// written in report-sized chunks; reports are read until at least the
    /// configured response length has arrived. Trailing `\0`, `\t`, `\r` and
    /// `\n` are stripped and the rest is returned verbatim.
    ///
    /// A request longer than the request length is a caller bug and fails with
    /// [`FatalError::BootloaderPayloadTooLarge`] before anything is written.
    pub fn send_bootloader(&self, msg: &[u8]) -> Result<Vec<u8>> {
        let boot = self.config().bootloader;
        let reports = self.config().reports;

        if msg.len() > boot.request_len {
            error!(
                message_length = msg.len(),
                max_send_length = boot.request_len,
                "bootloader message too long"
            );
            return Err(FatalError::BootloaderPayloadTooLarge {
                size: msg.len(),
                max: boot.request_len,
            }
            .into());
        }

        let mut padded = Vec::with_capacity(boot.request_len);
        padded.extend_from_slice(msg);
        padded.resize(boot.request_len, 0);

        let mut guard = self.lock();
        let channel = guard.as_mut().ok_or(CommError::ChannelClosed)?;

        {
            let mut writer = FrameWriter::with_config(&mut *channel, reports);
            let mut report = Vec::with_capacity(reports.write_report_size + 1);
            for chunk in padded.chunks(reports.write_report_size) {
                report.clear();
                if boot.report_id_prefix {
                    report.push(0);
                }
                report.extend_from_slice(chunk);
                writer.write_report(&report)?;
            }
            writer.flush()?;
        }

        let mut response = Vec::with_capacity(boot.response_len + reports.read_report_size);
        let mut buf = vec![0u8; reports.read_report_size];
        while response.len() < boot.response_len {
            let n = match channel.read(&mut buf) {
                Ok(0) => {
                    return Err(CommError::Io(std::io::Error::new(
                        ErrorKind::UnexpectedEof,
                        "device stopped mid bootloader response",
                    )))
                }
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(err.into()),
            };
            response.extend_from_slice(&buf[..n]);
        }
        drop(guard);

        let end = response
            .iter()
            .rposition(|&b| !matches!(b, b'\0' | b'\t' | b'\r' | b'\n'))
            .map_or(0, |i| i + 1);
        response.truncate(end);
        debug!(len = response.len(), "bootloader response");
        Ok(response)
    }
}
