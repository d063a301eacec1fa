//! Decoding API responses

use crate::error::{Result, UploaderError};
use crate::types::RemotePhotoId;
use serde_json::Value;

/// Parse a response body
///
/// A body that is not JSON is `MalformedResponse`. An object carrying
/// `error_code` is a `ServerError` with the accompanying `error_msg`.
pub fn parse_response(body: &str) -> Result<Value> {
    let value: Value = serde_json::from_str(body).map_err(|e| {
        UploaderError::malformed_response(format!("Failed to parse JSON: {}", e), body)
    })?;

    if let Some(code) = value.get("error_code") {
        let code = code
            .as_i64()
            .or_else(|| code.as_str().and_then(|s| s.parse().ok()))
            .unwrap_or(-1);
        let message = value
            .get("error_msg")
            .and_then(Value::as_str)
            .unwrap_or("Unknown error");
        return Err(UploaderError::server_error(code, message));
    }

    Ok(value)
}

/// The new photo's id from an upload response
pub fn photo_id(response: &Value) -> Result<RemotePhotoId> {
    match response.get("pid") {
        Some(Value::String(pid)) if !pid.is_empty() => Ok(RemotePhotoId::new(pid.clone())),
        Some(Value::Number(pid)) => Ok(RemotePhotoId::new(pid.to_string())),
        _ => Err(UploaderError::malformed_response(
            "Upload response has no photo id",
            response.to_string(),
        )),
    }
}

/// Render a scalar response the way it was sent, e.g. `1` and `"1"` both as `1`
pub fn scalar_text(response: &Value) -> String {
    match response {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
