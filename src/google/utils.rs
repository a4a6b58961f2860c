use reqwest::Response;
use serde_json::Value;

use crate::error::{Error, Result};

/// Passes successful responses through and turns everything else into
/// `Error::Status` carrying Google's error message.
pub async fn check(res: Response) -> Result<Response> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }

    let body = res.text().await.unwrap_or_default();
    Err(Error::Status {
        status,
        message: error_message(&body),
    })
}

/// Extracts a readable message from a Google error body.
///
/// API errors look like `{"error": {"code": 403, "message": "..."}}`, the
/// token endpoint uses `{"error": "invalid_grant", "error_description": "..."}`.
pub fn error_message(body: &str) -> String {
    let fallback = || match body.trim() {
        "" => "no details".to_string(),
        b => b.to_string(),
    };

    let v = match serde_json::from_str::<Value>(body) {
        Ok(v) => v,
        Err(_) => return fallback(),
    };

    match v.get("error") {
        Some(Value::Object(e)) => e
            .get("message")
            .and_then(Value::as_str)
            .map(String::from)
            .unwrap_or_else(fallback),
        Some(Value::String(code)) => match v.get("error_description").and_then(Value::as_str) {
            Some(d) => format!("{code}: {d}"),
            None => code.clone(),
        },
        _ => fallback(),
    }
}
