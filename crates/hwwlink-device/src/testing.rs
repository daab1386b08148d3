//! In-memory device used by the session tests.

use std::collections::VecDeque;
use std::io::{ErrorKind, Read, Write};
use std::sync::{Arc, Mutex};

use hwwlink_channel::DeviceChannel;
use hwwlink_frame::{
    encode_message, CONT_HEADER_SIZE, DEFAULT_REPORT_SIZE, HWW_CID, HWW_CMD, INIT_HEADER_SIZE,
};

type Handler = Box<dyn FnMut(&[u8]) -> Vec<u8> + Send>;

#[derive(Default)]
pub(crate) struct DeviceState {
    /// Every report written by the host, in order.
    pub writes: Vec<Vec<u8>>,
    /// Reports waiting to be read by the host.
    pub outgoing: VecDeque<Vec<u8>>,
    /// Complete request payloads reassembled from the host's reports.
    pub requests: Vec<Vec<u8>>,
    /// Set when an init report arrived before the previous request completed.
    pub interleaved: bool,
    pub closed: bool,
    pub fail_writes: bool,
    pub fail_close: bool,
    pending: Vec<u8>,
    expected: Option<usize>,
    handler: Option<Handler>,
}

impl DeviceState {
    fn accept_report(&mut self, report: &[u8]) {
        match self.expected {
            Some(_) if report[4] == HWW_CMD => {
                self.interleaved = true;
                self.start_request(report);
            }
            Some(_) => self
                .pending
                .extend_from_slice(&report[CONT_HEADER_SIZE..]),
            None => self.start_request(report),
        }

        let Some(expected) = self.expected else {
            return;
        };
        if self.pending.len() < expected {
            return;
        }

        self.pending.truncate(expected);
        let request = std::mem::take(&mut self.pending);
        self.expected = None;
        if let Some(handler) = self.handler.as_mut() {
            let reply = handler(&request);
            let reports = encode_message(&reply, HWW_CID, HWW_CMD, DEFAULT_REPORT_SIZE)
                .expect("reply should encode");
            self.outgoing.extend(reports.into_iter().map(|r| r.to_vec()));
        }
        self.requests.push(request);
    }

    fn start_request(&mut self, report: &[u8]) {
        self.expected = Some(u16::from_be_bytes([report[5], report[6]]) as usize);
        self.pending = report[INIT_HEADER_SIZE..].to_vec();
    }
}

/// Channel that behaves like a device speaking the framed protocol.
#[derive(Clone)]
pub(crate) struct SimulatedDevice {
    pub state: Arc<Mutex<DeviceState>>,
    framed: bool,
}

impl SimulatedDevice {
    /// A device answering each reassembled request with `handler(request)`.
    pub fn framed(handler: impl FnMut(&[u8]) -> Vec<u8> + Send + 'static) -> Self {
        let state = DeviceState {
            handler: Some(Box::new(handler)),
            ..DeviceState::default()
        };
        Self {
            state: Arc::new(Mutex::new(state)),
            framed: true,
        }
    }

    /// A device that records writes verbatim and replays queued reports.
    pub fn raw(reports: impl IntoIterator<Item = Vec<u8>>) -> Self {
        let state = DeviceState {
            outgoing: reports.into_iter().collect(),
            ..DeviceState::default()
        };
        Self {
            state: Arc::new(Mutex::new(state)),
            framed: false,
        }
    }

    pub fn with_state(self, f: impl FnOnce(&mut DeviceState)) -> Self {
        f(&mut self.state.lock().unwrap());
        self
    }
}

impl Read for SimulatedDevice {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let mut state = self.state.lock().unwrap();
        if state.closed {
            return Err(std::io::Error::from(ErrorKind::NotConnected));
        }
        match state.outgoing.pop_front() {
            Some(report) => {
                let n = report.len().min(buf.len());
                buf[..n].copy_from_slice(&report[..n]);
                Ok(n)
            }
            None => Ok(0),
        }
    }
}

impl Write for SimulatedDevice {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let mut state = self.state.lock().unwrap();
        if state.closed {
            return Err(std::io::Error::from(ErrorKind::NotConnected));
        }
        if state.fail_writes {
            return Err(std::io::Error::from(ErrorKind::BrokenPipe));
        }
        state.writes.push(buf.to_vec());
        if self.framed {
            state.accept_report(buf);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl DeviceChannel for SimulatedDevice {
    fn close(&mut self) -> std::io::Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.fail_close {
            return Err(std::io::Error::other("usb handle stuck"));
        }
        state.closed = true;
        Ok(())
    }
}
