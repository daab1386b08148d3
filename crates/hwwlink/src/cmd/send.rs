use tracing::info;

use crate::cmd::{close_session, open_session, read_file, SendArgs};
use crate::exit::{comm_error, CliError, CliResult, DATA_INVALID, SUCCESS, USAGE};
use crate::output::{print_reply, OutputFormat};

pub fn run(args: SendArgs, format: OutputFormat) -> CliResult<i32> {
    let command = resolve_command(&args)?;
    let password = resolve_password(args.password_env.as_deref())?;

    let comm = open_session(&args.device, |_| {})?;
    let reply = match &password {
        Some(password) => comm.send_encrypted(&command, password),
        None => comm.send_plain(&command),
    }
    .map_err(|err| comm_error("send failed", err))?;
    close_session(&comm)?;

    info!(
        device = %args.device.device.display(),
        encrypted = password.is_some(),
        fields = reply.len(),
        "reply received"
    );
    print_reply(&reply, format);
    Ok(SUCCESS)
}

fn resolve_command(args: &SendArgs) -> CliResult<String> {
    let command = match (&args.json, &args.file) {
        (Some(json), _) => json.clone(),
        (None, Some(path)) => String::from_utf8(read_file(path)?).map_err(|_| {
            CliError::new(
                DATA_INVALID,
                format!("{} is not valid UTF-8", path.display()),
            )
        })?,
        (None, None) => return Err(CliError::new(USAGE, "one of --json or --file is required")),
    };

    serde_json::from_str::<serde_json::Value>(&command)
        .map_err(|err| CliError::new(USAGE, format!("command is not valid JSON: {err}")))?;
    Ok(command)
}

fn resolve_password(var: Option<&str>) -> CliResult<Option<String>> {
    let Some(var) = var else {
        return Ok(None);
    };
    std::env::var(var)
        .map(Some)
        .map_err(|err| CliError::new(USAGE, format!("password variable {var}: {err}")))
}
