//! Detection of error envelopes embedded in control plane responses.
//!
//! UCP does not reliably signal failure through the HTTP status. The engine
//! proxy answers `{"message": "..."}`, the auth service answers
//! `{"errors": [{"code": "...", "message": "..."}]}`, and either may arrive
//! with a 200.

use serde::Deserialize;
use serde_json::Value;

use crate::error::{ApplicationError, DecodeError};

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: String,
}

/// Inspect a response body for a control plane error envelope.
///
/// Returns `Ok(None)` when the body is empty or holds any other JSON shape,
/// so the caller can continue with its own unmarshal step.
pub fn parse_ucp_error(body: &[u8]) -> Result<Option<ApplicationError>, DecodeError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }

    let value: Value = serde_json::from_slice(body)
        .map_err(|source| DecodeError::new("control plane response", source))?;

    let Value::Object(fields) = value else {
        return Ok(None);
    };

    if let Some(message) = fields.get("message").and_then(Value::as_str) {
        return Ok(Some(ApplicationError::new(message)));
    }

    let Some(errors) = fields.get("errors").filter(|errors| errors.is_array()) else {
        return Ok(None);
    };

    let details: Vec<ErrorDetail> = serde_json::from_value(errors.clone())
        .map_err(|source| DecodeError::new("control plane error envelope", source))?;
    if details.is_empty() {
        return Ok(None);
    }

    let message = details
        .iter()
        .map(|detail| detail.message.as_str())
        .filter(|message| !message.is_empty())
        .collect::<Vec<_>>()
        .join("; ");
    let code = details.into_iter().find_map(|detail| detail.code);

    Ok(Some(ApplicationError { message, code }))
}
