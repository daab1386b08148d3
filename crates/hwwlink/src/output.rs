use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct BootloaderOutput<'a> {
    schema_id: &'a str,
    size: usize,
    response: String,
}

/// Print a decoded reply object.
pub fn print_reply(reply: &Map<String, Value>, format: OutputFormat) {
    match format {
        OutputFormat::Json | OutputFormat::Raw => {
            println!(
                "{}",
                serde_json::to_string(reply).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["FIELD", "VALUE"]);
            for (key, value) in reply {
                table.add_row(vec![key.clone(), cell(value)]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "{}",
                serde_json::to_string_pretty(reply).unwrap_or_else(|_| "{}".to_string())
            );
        }
    }
}

/// Print a bootloader response.
pub fn print_bootloader_response(response: &[u8], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = BootloaderOutput {
                schema_id: "https://schemas.3leaps.dev/hwwlink/cli/v1/bootloader-response.schema.json",
                size: response.len(),
                response: String::from_utf8_lossy(response).into_owned(),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["SIZE", "RESPONSE"])
                .add_row(vec![
                    response.len().to_string(),
                    String::from_utf8_lossy(response).into_owned(),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!("{}", String::from_utf8_lossy(response));
        }
        OutputFormat::Raw => print_raw(response),
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

// Strings print bare; nested values print as compact JSON.
fn cell(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
