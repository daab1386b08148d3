//! Censored diagnostics for commands and replies.
//!
//! Commands carry passwords, seeds and signatures, so only their shape is
//! ever logged.

use std::fmt;

use serde_json::Value;
use tracing::{debug, Level};

/// Replacement for every leaf value.
pub const PLACEHOLDER: &str = "****";

/// Replace every leaf with [`PLACEHOLDER`], keeping keys and nesting.
pub fn redact(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, value)| (key.clone(), redact(value)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(redact).collect()),
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {
            Value::String(PLACEHOLDER.to_string())
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum Direction {
    Sending,
    Receiving,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Sending => f.write_str("Sending"),
            Direction::Receiving => f.write_str("Receiving"),
        }
    }
}

/// Log a censored copy of `msg` at DEBUG. Never touches the bytes on the wire.
pub(crate) fn log_redacted(direction: Direction, msg: &[u8]) {
    if !tracing::enabled!(Level::DEBUG) {
        return;
    }
    match serde_json::from_slice::<Value>(msg) {
        Ok(value) => debug!(msg = %redact(&value), "{direction} message"),
        // Base64 envelopes and garbage: length only.
        Err(_) => debug!(len = msg.len(), "{direction} opaque message"),
    }
}
