use bytes::{BufMut, Bytes, BytesMut};

use crate::channel::HWW_CID;
use crate::error::{FrameError, Result};

/// Init frame header: channel (4) + command (1) + length (2) = 7 bytes.
pub const INIT_HEADER_SIZE: usize = 7;

/// Continuation frame header: channel (4) + sequence (1) = 5 bytes.
pub const CONT_HEADER_SIZE: usize = 5;

/// Padding byte for the unused tail of a report.
pub const FILLER: u8 = 0xEE;

/// Largest payload the 16-bit length field can describe.
pub const MAX_PAYLOAD: usize = u16::MAX as usize;

/// Report size used by full-speed HID devices.
pub const DEFAULT_REPORT_SIZE: usize = 64;

/// Per-device report sizes.
///
/// Different device models expose different report lengths, so these are
/// supplied by whoever enumerated the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportConfig {
    /// Size of every report written to the device.
    pub write_report_size: usize,
    /// Size of the buffer each report is read into.
    pub read_report_size: usize,
}

impl ReportConfig {
    /// Create a validated report configuration.
    pub fn new(write_report_size: usize, read_report_size: usize) -> Result<Self> {
        let config = Self {
            write_report_size,
            read_report_size,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check that both report sizes can carry an init header plus payload.
    pub fn validate(&self) -> Result<()> {
        check_report_size(self.write_report_size)?;
        check_report_size(self.read_report_size)
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            write_report_size: DEFAULT_REPORT_SIZE,
            read_report_size: DEFAULT_REPORT_SIZE,
        }
    }
}

fn check_report_size(size: usize) -> Result<()> {
    if size <= INIT_HEADER_SIZE {
        return Err(FrameError::ReportTooSmall {
            size,
            min: INIT_HEADER_SIZE + 1,
        });
    }
    Ok(())
}

/// Split a payload into padded reports.
///
/// Wire format:
/// ```text
/// init:  ┌────────────┬─────────┬────────────┬─────────────┬──────────┐
///        │ CID (4B BE)│ CMD (1B)│ LEN (2B BE)│ payload     │ 0xEE ... │
///        └────────────┴─────────┴────────────┴─────────────┴──────────┘
/// cont:  ┌────────────┬─────────┬──────────────────────────┬──────────┐
///        │ CID (4B BE)│ SEQ (1B)│ payload                  │ 0xEE ... │
///        └────────────┴─────────┴──────────────────────────┴──────────┘
/// ```
///
/// Every report is exactly `write_size` bytes. An empty payload produces no
/// reports. Sequence numbers start at 0 and wrap after 255; the length field
/// keeps that out of reach unless reports are very small.
pub fn encode_message(payload: &[u8], cid: u32, cmd: u8, write_size: usize) -> Result<Vec<Bytes>> {
    check_report_size(write_size)?;
    if payload.len() > MAX_PAYLOAD {
        return Err(FrameError::PayloadTooLarge {
            size: payload.len(),
            max: MAX_PAYLOAD,
        });
    }

    let mut reports = Vec::new();
    if payload.is_empty() {
        return Ok(reports);
    }

    let mut report = BytesMut::with_capacity(write_size);
    report.put_u32(cid);
    report.put_u8(cmd);
    report.put_u16(payload.len() as u16);
    let mut remaining = fill_report(report, payload, write_size, &mut reports);

    let mut seq = 0u8;
    while !remaining.is_empty() {
        let mut report = BytesMut::with_capacity(write_size);
        report.put_u32(cid);
        report.put_u8(seq);
        remaining = fill_report(report, remaining, write_size, &mut reports);
        seq = seq.wrapping_add(1);
    }

    Ok(reports)
}

fn fill_report<'a>(
    mut report: BytesMut,
    remaining: &'a [u8],
    write_size: usize,
    reports: &mut Vec<Bytes>,
) -> &'a [u8] {
    let take = (write_size - report.len()).min(remaining.len());
    let (chunk, rest) = remaining.split_at(take);
    report.put_slice(chunk);
    report.resize(write_size, FILLER);
    reports.push(report.freeze());
    rest
}

/// Validate an init report and return the declared payload length.
pub fn parse_init_header(report: &[u8], expected_cmd: u8) -> Result<usize> {
    if report.len() < INIT_HEADER_SIZE {
        return Err(FrameError::ShortRead {
            got: report.len(),
            min: INIT_HEADER_SIZE,
        });
    }
    check_cid(report)?;
    if report[4] != expected_cmd {
        return Err(FrameError::CommandMismatch {
            observed: report[4],
            expected: expected_cmd,
        });
    }
    Ok(u16::from_be_bytes([report[5], report[6]]) as usize)
}

/// Validate a continuation report header.
pub fn parse_cont_header(report: &[u8]) -> Result<()> {
    if report.len() < CONT_HEADER_SIZE {
        return Err(FrameError::ShortRead {
            got: report.len(),
            min: CONT_HEADER_SIZE,
        });
    }
    check_cid(report)
}

fn check_cid(report: &[u8]) -> Result<()> {
    let observed = u32::from_be_bytes([report[0], report[1], report[2], report[3]]);
    if observed != HWW_CID {
        return Err(FrameError::ChannelMismatch {
            observed,
            expected: HWW_CID,
        });
    }
    Ok(())
}
