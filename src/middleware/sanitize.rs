use axum::{
    body::{to_bytes, Body},
    extract::Request,
    http::header::{CONTENT_LENGTH, CONTENT_TYPE},
    middleware::Next,
    response::Response,
};
use serde_json::Value;

use crate::error::ApiError;

/// Matches the JSON body size limit enforced by the previous deployment.
const BODY_LIMIT: usize = 10 * 1024;

/// Replace characters with query-language meaning in the document store
/// (`$` operator prefix, `.` field-path separator) with `_`.
pub fn sanitize_text(input: &str) -> String {
    input.replace(['$', '.'], "_")
}

/// Recursively sanitize a parsed JSON value: strings, array elements and
/// object entries are walked; object keys are rewritten too, since the key
/// position is where query operators are injected. Non-string leaves pass
/// through untouched.
pub fn sanitize_value(value: Value) -> Value {
    match value {
        Value::String(s) => Value::String(sanitize_text(&s)),
        Value::Array(items) => Value::Array(items.into_iter().map(sanitize_value).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (sanitize_text(&k), sanitize_value(v)))
                .collect(),
        ),
        other => other,
    }
}

/// Request-wide sanitization stage. Runs before routing on every request;
/// JSON bodies are buffered, sanitized and re-attached, everything else
/// passes through unchanged. Malformed JSON is forwarded as-is so the
/// `Json` extractor reports it.
pub async fn sanitize_request(request: Request, next: Next) -> Result<Response, ApiError> {
    let (mut parts, body) = request.into_parts();

    let is_json = parts
        .headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.starts_with("application/json"))
        .unwrap_or(false);

    if !is_json {
        return Ok(next.run(Request::from_parts(parts, body)).await);
    }

    let bytes = to_bytes(body, BODY_LIMIT)
        .await
        .map_err(|_| ApiError::Validation("Request body too large".into()))?;

    let body = match serde_json::from_slice::<Value>(&bytes) {
        Ok(value) => {
            let clean = serde_json::to_vec(&sanitize_value(value))
                .map_err(|e| ApiError::Internal(e.into()))?;
            parts.headers.remove(CONTENT_LENGTH);
            parts
                .headers
                .insert(CONTENT_LENGTH, clean.len().into());
            Body::from(clean)
        }
        Err(_) => Body::from(bytes),
    };

    Ok(next.run(Request::from_parts(parts, body)).await)
}
