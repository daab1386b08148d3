use tracing::info;

use crate::cmd::{close_session, open_session, read_file, BootloaderArgs};
use crate::exit::{comm_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_bootloader_response, OutputFormat};

pub fn run(args: BootloaderArgs, format: OutputFormat) -> CliResult<i32> {
    let request = resolve_request(&args)?;

    let comm = open_session(&args.device, |config| {
        if args.no_report_id {
            config.bootloader.report_id_prefix = false;
        }
    })?;
    let response = comm
        .send_bootloader(&request)
        .map_err(|err| comm_error("bootloader send failed", err))?;
    close_session(&comm)?;

    info!(
        device = %args.device.device.display(),
        request_size = request.len(),
        response_size = response.len(),
        "bootloader response received"
    );
    print_bootloader_response(&response, format);
    Ok(SUCCESS)
}

fn resolve_request(args: &BootloaderArgs) -> CliResult<Vec<u8>> {
    match (&args.hex, &args.file) {
        (Some(hex), _) => decode_hex(hex),
        (None, Some(path)) => read_file(path),
        (None, None) => Err(CliError::new(USAGE, "one of --hex or --file is required")),
    }
}

fn decode_hex(input: &str) -> CliResult<Vec<u8>> {
    let digits: String = input.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    hex::decode(digits)
        .map_err(|err| CliError::new(USAGE, format!("invalid hex request: {err}")))
}
