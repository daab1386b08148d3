use clap::{Args, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};

use hwwlink_channel::HidrawChannel;
use hwwlink_device::{Communication, CommunicationConfig};
use hwwlink_frame::{ReportConfig, DEFAULT_REPORT_SIZE};

use crate::exit::{channel_error, comm_error, frame_error, io_error, CliResult};
use crate::output::OutputFormat;

pub mod bootloader;
pub mod send;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Send one JSON command and print the reply.
    Send(SendArgs),
    /// Send one fixed-length request to a device in bootloader mode.
    Bootloader(BootloaderArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Send(args) => send::run(args, format),
        Command::Bootloader(args) => bootloader::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct DeviceArgs {
    /// HID device node (e.g. /dev/hidraw3).
    pub device: PathBuf,
    /// Size of each report written to the device.
    #[arg(long, value_name = "BYTES", default_value_t = DEFAULT_REPORT_SIZE)]
    pub write_report_size: usize,
    /// Size of each report read from the device.
    #[arg(long, value_name = "BYTES", default_value_t = DEFAULT_REPORT_SIZE)]
    pub read_report_size: usize,
}

#[derive(Args, Debug)]
pub struct SendArgs {
    #[command(flatten)]
    pub device: DeviceArgs,
    /// JSON command.
    #[arg(long, conflicts_with = "file", required_unless_present = "file")]
    pub json: Option<String>,
    /// Read the JSON command from a file.
    #[arg(long, conflicts_with = "json")]
    pub file: Option<PathBuf>,
    /// Encrypt the exchange with the password held in this environment variable.
    #[arg(long, value_name = "VAR")]
    pub password_env: Option<String>,
}

#[derive(Args, Debug)]
pub struct BootloaderArgs {
    #[command(flatten)]
    pub device: DeviceArgs,
    /// Request bytes as hex.
    #[arg(long, conflicts_with = "file", required_unless_present = "file")]
    pub hex: Option<String>,
    /// Read the request bytes from a file.
    #[arg(long, conflicts_with = "hex")]
    pub file: Option<PathBuf>,
    /// Do not prefix each written report with a zero report ID.
    #[arg(long)]
    pub no_report_id: bool,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Open the device node and wrap it in a session.
pub fn open_session(
    args: &DeviceArgs,
    configure: impl FnOnce(&mut CommunicationConfig),
) -> CliResult<Communication<HidrawChannel>> {
    let reports = ReportConfig::new(args.write_report_size, args.read_report_size)
        .map_err(|err| frame_error("invalid report size", err))?;
    let mut config = CommunicationConfig {
        reports,
        ..CommunicationConfig::default()
    };
    configure(&mut config);

    let channel =
        HidrawChannel::open(&args.device).map_err(|err| channel_error("open failed", err))?;
    Communication::with_config(channel, config).map_err(|err| comm_error("open failed", err))
}

/// Release the device once the exchange is done.
pub fn close_session(comm: &Communication<HidrawChannel>) -> CliResult<()> {
    comm.close().map_err(|err| comm_error("close failed", err))
}

pub fn read_file(path: &Path) -> CliResult<Vec<u8>> {
    fs::read(path).map_err(|err| io_error(&format!("failed reading {}", path.display()), err))
}
