//! Fixed-size USB-HID report framing for hardware wallet messages.
//!
//! A message is split across reports of a configured size. The first report
//! (init frame) carries:
//! - A 4-byte big-endian channel identifier (`0xFF000000`)
//! - A 1-byte vendor command code
//! - A 2-byte big-endian total payload length
//!
//! Every following report (continuation frame) carries the channel identifier
//! and a 1-byte sequence number. Reports are padded with `0xEE` to exactly the
//! write size. Callers hand in a flat payload and get a flat payload back.

pub mod channel;
pub mod codec;
pub mod error;
pub mod reader;
pub mod writer;

pub use channel::{command_name, HWW_CID, HWW_CMD, U2FHID_TYPE_INIT, U2FHID_VENDOR_FIRST};
pub use codec::{
    encode_message, parse_init_header, ReportConfig, CONT_HEADER_SIZE, DEFAULT_REPORT_SIZE,
    FILLER, INIT_HEADER_SIZE, MAX_PAYLOAD,
};
pub use error::{FrameError, Result};
pub use reader::FrameReader;
pub use writer::FrameWriter;
