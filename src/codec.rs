// src/codec.rs

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

/// A request the gateway could not turn into a typed value. Always client-caused.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("invalid request body: {0}")]
    Body(String),

    #[error("missing task id in path")]
    EmptyId,
}

/// Decodes a JSON request body. Unknown fields are ignored; syntax errors,
/// type mismatches and missing required fields all come back as one error.
///
/// Only objects are accepted: derived structs would otherwise fill their
/// fields positionally from a JSON array.
pub fn decode_json<T: DeserializeOwned>(body: &[u8]) -> Result<T, DecodeError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(DecodeError::Body("request body is empty".to_string()));
    }
    let value: Value =
        serde_json::from_slice(body).map_err(|e| DecodeError::Body(e.to_string()))?;
    if !value.is_object() {
        return Err(DecodeError::Body(format!(
            "expected a JSON object, found {}",
            json_kind(&value)
        )));
    }
    serde_json::from_value(value).map_err(|e| DecodeError::Body(e.to_string()))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

pub fn decode_path_id(raw: &str) -> Result<String, DecodeError> {
    let id = raw.trim();
    if id.is_empty() {
        return Err(DecodeError::EmptyId);
    }
    Ok(id.to_string())
}
