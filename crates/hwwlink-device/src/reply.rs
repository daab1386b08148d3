use serde_json::{Map, Value};

use crate::error::{CommError, DeviceError, Result};

/// A decoded reply object, classified by shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply<'a> {
    /// `{"error": {"code": n, "message": "..."}}`
    Error(DeviceError),
    /// `{"ciphertext": "<base64>"}` from an encrypted exchange.
    Ciphertext(&'a str),
    /// Anything else.
    Data(&'a Map<String, Value>),
}

impl<'a> Reply<'a> {
    /// Classify a reply object.
    ///
    /// An object-valued `error` key always wins. If it lacks a numeric `code`
    /// or a string `message` the raw error object is returned as
    /// [`CommError::UnexpectedReply`].
    pub fn classify(object: &'a Map<String, Value>) -> Result<Self> {
        if let Some(Value::Object(fields)) = object.get("error") {
            let code = fields.get("code").and_then(integer_code);
            return match (code, fields.get("message")) {
                (Some(code), Some(Value::String(message))) => Ok(Reply::Error(DeviceError {
                    code,
                    message: message.clone(),
                })),
                _ => Err(CommError::UnexpectedReply {
                    reply: Value::Object(fields.clone()),
                }),
            };
        }

        if let Some(Value::String(text)) = object.get("ciphertext") {
            return Ok(Reply::Ciphertext(text));
        }

        Ok(Reply::Data(object))
    }
}

/// Firmware sends codes as JSON numbers; accept integral floats too.
fn integer_code(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.fract() == 0.0 && f.abs() <= i64::MAX as f64)
            .map(|f| f as i64)
    })
}

/// Turn an error-shaped reply into an error, pass anything else through.
pub(crate) fn check_device_error(object: &Map<String, Value>) -> Result<()> {
    match Reply::classify(object)? {
        Reply::Error(err) => Err(err.into()),
        Reply::Ciphertext(_) | Reply::Data(_) => Ok(()),
    }
}
