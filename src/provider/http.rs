//! Shared HTTP client construction, headers, and status mapping.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};

use crate::error::{ErrorCode, ErrorDetails, ScoutError};

/// User agent sent with page fetches and search requests.
pub const USER_AGENT: &str = concat!(
    "Mozilla/5.0 (compatible; webscout/",
    env!("CARGO_PKG_VERSION"),
    "; +https://github.com/webscout)"
);

/// Build a reqwest client with the given overall request timeout.
pub fn build_client(timeout: Duration) -> Result<reqwest::Client, ScoutError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .pool_max_idle_per_host(10)
        .build()
        .map_err(ScoutError::Network)
}

/// Classify a transport failure. Client timeouts become [`ScoutError::Timeout`].
pub fn transport_error(err: reqwest::Error, timeout: Duration) -> ScoutError {
    if err.is_timeout() {
        ScoutError::Timeout(timeout.as_millis() as u64)
    } else {
        ScoutError::Network(err)
    }
}

/// Build default headers for a Bearer-token API.
pub fn bearer_headers(api_key: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    if let Ok(val) = HeaderValue::from_str(&format!("Bearer {api_key}")) {
        headers.insert(AUTHORIZATION, val);
    }
    headers
}

/// Map a non-success provider status and body to an error.
pub fn status_to_error(status: u16, body: &str) -> ScoutError {
    match status {
        401 | 403 => ScoutError::Authentication(error_message(body)),
        429 => ScoutError::RateLimited {
            retry_after_ms: extract_retry_after(body),
        },
        _ => match extract_details(body) {
            Some(details) => ScoutError::api_with_details(status, error_message(body), details),
            None => ScoutError::api(status, body),
        },
    }
}

fn error_object(body: &str) -> Option<serde_json::Value> {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("error").cloned())
}

fn error_message(body: &str) -> String {
    error_object(body)
        .and_then(|e| e.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}

fn extract_details(body: &str) -> Option<ErrorDetails> {
    let err = error_object(body)?;
    let provider_code = err
        .get("code")
        .and_then(|c| c.as_str())
        .or_else(|| err.get("type").and_then(|t| t.as_str()))
        .map(str::to_string);
    Some(ErrorDetails {
        code: provider_code.as_deref().map(ErrorCode::from_provider_code),
        provider_code,
        param: err.get("param").and_then(|p| p.as_str()).map(str::to_string),
    })
}

fn extract_retry_after(body: &str) -> Option<u64> {
    error_object(body)
        .and_then(|e| e.get("retry_after").and_then(|r| r.as_f64()))
        .map(|s| (s * 1000.0) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_maps_to_authentication_with_message() {
        let body = r#"{"error":{"message":"Incorrect API key provided","code":"invalid_api_key"}}"#;
        match status_to_error(401, body) {
            ScoutError::Authentication(msg) => assert_eq!(msg, "Incorrect API key provided"),
            other => panic!("expected Authentication, got {other:?}"),
        }
    }

    #[test]
    fn rate_limit_reads_retry_after() {
        let body = r#"{"error":{"message":"slow down","retry_after":1.5}}"#;
        assert!(matches!(
            status_to_error(429, body),
            ScoutError::RateLimited { retry_after_ms: Some(1500) }
        ));
    }

    #[test]
    fn other_status_carries_details() {
        let body = r#"{"error":{"message":"too long","code":"context_length_exceeded","param":"messages"}}"#;
        match status_to_error(400, body) {
            ScoutError::Api { status, message, details } => {
                assert_eq!(status, 400);
                assert_eq!(message, "too long");
                let details = details.expect("details");
                assert_eq!(details.code, Some(ErrorCode::ContextLengthExceeded));
                assert_eq!(details.param.as_deref(), Some("messages"));
            }
            other => panic!("expected Api, got {other:?}"),
        }
    }

    #[test]
    fn non_json_body_is_kept_verbatim() {
        match status_to_error(502, "Bad Gateway") {
            ScoutError::Api { message, details, .. } => {
                assert_eq!(message, "Bad Gateway");
                assert!(details.is_none());
            }
            other => panic!("expected Api, got {other:?}"),
        }
    }
}
