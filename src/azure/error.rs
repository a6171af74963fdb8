//! Errors returned by Azure Resource Manager calls.

use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;

/// Seconds to wait before retrying a rate limited cost query.
pub const COST_RETRY_AFTER_HEADER: &str =
    "x-ms-ratelimit-microsoft.costmanagement-entity-retry-after";
/// Remaining cost queries for this client type, logged when throttled.
pub const COST_REMAINING_HEADER: &str =
    "x-ms-ratelimit-remaining-microsoft.costmanagement-clienttype-requests";
pub const RETRY_AFTER_HEADER: &str = "retry-after";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("rate limited (HTTP 429) on {url}")]
    RateLimited {
        url: String,
        retry_after: Option<u64>,
        remaining: Option<String>,
    },

    #[error("service unavailable (HTTP 503) on {url}")]
    ServiceUnavailable {
        url: String,
        retry_after: Option<u64>,
    },

    #[error("HTTP {status} from {url}: {message}")]
    Http {
        status: u16,
        url: String,
        message: String,
    },

    #[error("credential error: {0}")]
    Auth(String),

    #[error("request failed: {0}")]
    Transport(String),

    #[error("invalid response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Classify a non-success response.
    pub fn from_response(status: StatusCode, headers: &HeaderMap, url: &str, body: &str) -> Self {
        match status {
            StatusCode::TOO_MANY_REQUESTS => ApiError::RateLimited {
                url: url.to_string(),
                retry_after: header_secs(headers, COST_RETRY_AFTER_HEADER)
                    .or_else(|| header_secs(headers, RETRY_AFTER_HEADER)),
                remaining: header_str(headers, COST_REMAINING_HEADER),
            },
            StatusCode::SERVICE_UNAVAILABLE => ApiError::ServiceUnavailable {
                url: url.to_string(),
                retry_after: header_secs(headers, RETRY_AFTER_HEADER),
            },
            _ => ApiError::Http {
                status: status.as_u16(),
                url: url.to_string(),
                message: error_message(body),
            },
        }
    }

    /// Wait before the next attempt: the server hint when there is one, else `default`.
    pub fn backoff(&self, default: Duration) -> Duration {
        match self {
            ApiError::RateLimited {
                retry_after: Some(secs),
                ..
            }
            | ApiError::ServiceUnavailable {
                retry_after: Some(secs),
                ..
            } => Duration::from_secs(*secs),
            _ => default,
        }
    }
}

fn header_str(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.trim().to_string())
}

fn header_secs(headers: &HeaderMap, name: &str) -> Option<u64> {
    header_str(headers, name).and_then(|s| s.parse::<u64>().ok())
}

/// Pull `error.message` out of an ARM error body, else return the body itself.
fn error_message(body: &str) -> String {
    let parsed: Option<String> = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .and_then(|m| m.as_str())
                .map(str::to_string)
        });
    match parsed {
        Some(message) => message,
        None if body.chars().count() > 500 => {
            format!("{}...", body.chars().take(500).collect::<String>())
        }
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_rate_limited_reads_cost_header() {
        let mut headers = HeaderMap::new();
        headers.insert(COST_RETRY_AFTER_HEADER, HeaderValue::from_static("3"));
        headers.insert(COST_REMAINING_HEADER, HeaderValue::from_static("0"));
        headers.insert(RETRY_AFTER_HEADER, HeaderValue::from_static("60"));

        let err = ApiError::from_response(StatusCode::TOO_MANY_REQUESTS, &headers, "u", "");
        match &err {
            ApiError::RateLimited {
                retry_after,
                remaining,
                ..
            } => {
                assert_eq!(*retry_after, Some(3));
                assert_eq!(remaining.as_deref(), Some("0"));
            }
            other => panic!("Expected RateLimited, got {other:?}"),
        }
        assert_eq!(err.backoff(Duration::from_secs(5)), Duration::from_secs(3));
    }

    #[test]
    fn test_rate_limited_falls_back_to_retry_after() {
        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER_HEADER, HeaderValue::from_static("7"));
        let err = ApiError::from_response(StatusCode::TOO_MANY_REQUESTS, &headers, "u", "");
        assert_eq!(err.backoff(Duration::from_secs(5)), Duration::from_secs(7));
    }

    #[test]
    fn test_service_unavailable() {
        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER_HEADER, HeaderValue::from_static(" 12 "));
        let err = ApiError::from_response(StatusCode::SERVICE_UNAVAILABLE, &headers, "u", "");
        assert!(matches!(err, ApiError::ServiceUnavailable { .. }));
        assert_eq!(err.backoff(Duration::from_secs(5)), Duration::from_secs(12));
    }

    #[test]
    fn test_missing_hint_uses_default() {
        let headers = HeaderMap::new();
        let err = ApiError::from_response(StatusCode::SERVICE_UNAVAILABLE, &headers, "u", "");
        assert_eq!(err.backoff(Duration::from_secs(5)), Duration::from_secs(5));
    }

    #[test]
    fn test_other_status_keeps_arm_message() {
        let body = r#"{"error":{"code":"AuthorizationFailed","message":"no access"}}"#;
        let err = ApiError::from_response(StatusCode::FORBIDDEN, &HeaderMap::new(), "u", body);
        match &err {
            ApiError::Http {
                status, message, ..
            } => {
                assert_eq!(*status, 403);
                assert_eq!(message, "no access");
            }
            other => panic!("Expected Http, got {other:?}"),
        }
        assert_eq!(err.backoff(Duration::from_secs(5)), Duration::from_secs(5));
    }

    #[test]
    fn test_long_plain_body_is_truncated() {
        let body = "x".repeat(800);
        let err = ApiError::from_response(StatusCode::BAD_GATEWAY, &HeaderMap::new(), "u", &body);
        let ApiError::Http { message, .. } = err else {
            panic!("Expected Http");
        };
        assert_eq!(message.len(), 503);
    }
}
