//! Validation of client-supplied store documents.

use crate::errors::{AppError, AppResult};
use crate::store::Entry;
use serde_json::Value;

/// Parses a request body into entries.
///
/// The body must be a JSON array; each element must be an object with an
/// integer `id`. Anything else is `AppError::InvalidPayload`, and nothing is
/// written.
pub fn parse_entries_payload(body: &[u8]) -> AppResult<Vec<Entry>> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| AppError::InvalidPayload(format!("Body is not valid JSON: {}", e)))?;

    if !value.is_array() {
        return Err(AppError::InvalidPayload(format!(
            "Expected a JSON array of entries, got {}",
            json_type_name(&value)
        )));
    }

    serde_json::from_value(value)
        .map_err(|e| AppError::InvalidPayload(format!("Malformed entry: {}", e)))
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
