//! Channel identifier and command codes.
//!
//! The framing borrows the U2F HID layout: an init frame marks its command
//! byte with the high bit, and vendor commands start at `0xC0`.

/// Broadcast channel identifier used for every hardware wallet exchange.
pub const HWW_CID: u32 = 0xFF00_0000;

/// Init frame marker bit.
pub const U2FHID_TYPE_INIT: u8 = 0x80;

/// First vendor-defined command.
pub const U2FHID_VENDOR_FIRST: u8 = U2FHID_TYPE_INIT | 0x40;

/// Hardware wallet JSON command.
pub const HWW_CMD: u8 = U2FHID_VENDOR_FIRST | 0x01;

/// Returns a human-readable name for a command byte.
pub fn command_name(cmd: u8) -> &'static str {
    match cmd {
        HWW_CMD => "HWW",
        c if c >= U2FHID_VENDOR_FIRST => "VENDOR",
        c if c & U2FHID_TYPE_INIT != 0 => "U2FHID",
        _ => "CONTINUATION",
    }
}
