use hwwlink_frame::ReportConfig;

/// Bootloader requests are always this long; shorter ones are zero-padded.
pub const BOOTLOADER_REQUEST_LEN: usize = 4098;

/// Bootloader responses are at least this long.
pub const BOOTLOADER_RESPONSE_LEN: usize = 256;

/// Fixed-length exchange used while the device runs its bootloader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootloaderConfig {
    /// Total request length after zero padding.
    pub request_len: usize,
    /// Bytes to collect before a response is complete.
    pub response_len: usize,
    /// Prefix each written chunk with a zero report-ID byte.
    ///
    /// hidapi on Windows inserts the report ID itself; elsewhere the host HID
    /// layer strips a leading zero byte, which would otherwise eat padding.
    pub report_id_prefix: bool,
}

impl Default for BootloaderConfig {
    fn default() -> Self {
        Self {
            request_len: BOOTLOADER_REQUEST_LEN,
            response_len: BOOTLOADER_RESPONSE_LEN,
            report_id_prefix: !cfg!(windows),
        }
    }
}

/// Session configuration for one device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CommunicationConfig {
    /// Report sizes reported for the device model.
    pub reports: ReportConfig,
    /// Bootloader-mode lengths.
    pub bootloader: BootloaderConfig,
}
