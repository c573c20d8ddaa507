//! Response status handling for the REST client.

use std::time::Duration;

use reqwest::header::RETRY_AFTER;
use reqwest::Response;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

use crate::errors::SearchServiceError;

/// Turn a non-success response into the matching [`SearchServiceError`].
///
/// `resource` is the request path without the query string, used to name the
/// missing or conflicting resource.
pub(crate) async fn error_for_status(
    response: Response,
    resource: &str,
) -> Result<Response, SearchServiceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let retry_after = response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_retry_after);
    let body = response.text().await.unwrap_or_default();
    let message = service_message(&body);

    warn!(status = %status, resource = %resource, message = %message, "Search service request failed");

    Err(match status.as_u16() {
        404 => SearchServiceError::not_found(resource),
        409 | 412 => SearchServiceError::conflict(resource, message),
        429 => SearchServiceError::rate_limited(retry_after, message),
        code => SearchServiceError::request(code, message),
    })
}

/// Read a JSON body into `T`.
pub(crate) async fn json_body<T: DeserializeOwned>(
    response: Response,
) -> Result<T, SearchServiceError> {
    let body = response
        .text()
        .await
        .map_err(|e| SearchServiceError::connection(e.to_string()))?;
    serde_json::from_str(&body).map_err(|e| SearchServiceError::parse(e.to_string()))
}

/// `Retry-After` in delta-seconds form. HTTP-date values are ignored.
fn parse_retry_after(value: &str) -> Option<Duration> {
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}

/// Pull `error.message` out of the service's error envelope, falling back to
/// the raw body.
fn service_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_message_from_envelope() {
        let body = r#"{"error":{"code":"","message":"Index 'geonames' was not found"}}"#;
        assert_eq!(service_message(body), "Index 'geonames' was not found");
    }

    #[test]
    fn test_service_message_falls_back_to_body() {
        assert_eq!(service_message("Bad gateway"), "Bad gateway");
        assert_eq!(service_message(""), "");
    }

    #[test]
    fn test_parse_retry_after() {
        assert_eq!(parse_retry_after(" 12 "), Some(Duration::from_secs(12)));
        assert_eq!(parse_retry_after("Wed, 21 Oct 2015 07:28:00 GMT"), None);
    }
}
