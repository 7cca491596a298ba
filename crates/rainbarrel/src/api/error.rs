//! Raindrop API error types and retry classification.

use std::time::Duration;

use chrono::Utc;
use thiserror::Error;

use crate::http::HttpError;
use crate::retry::RetryHint;

/// HTTP statuses retried by the client.
pub const RETRYABLE_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];

/// Whether a status code belongs to the retryable set.
#[inline]
#[must_use]
pub fn is_retryable_status(status: u16) -> bool {
    RETRYABLE_STATUSES.contains(&status)
}

/// Errors that can occur when talking to the Raindrop API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network-level failure before any HTTP status was seen.
    #[error("transport failure: {0}")]
    Transport(#[from] HttpError),

    /// Transient HTTP status (429 or selected 5xx), retried by the runner.
    #[error("Raindrop API {status} for {url}")]
    Transient {
        status: u16,
        url: String,
        /// Server-supplied wait from `Retry-After`, if present.
        retry_after: Option<Duration>,
    },

    /// Any other non-2xx status. Fatal for the run.
    #[error("Raindrop API {status} for {url}")]
    Status { status: u16, url: String },

    /// The response body did not match the expected shape.
    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ApiError {
    /// Retry classification used with the retry runner: transient statuses and
    /// transport failures are retryable, everything else is fatal.
    #[must_use]
    pub fn retry_hint(&self) -> Option<RetryHint> {
        match self {
            ApiError::Transient {
                status,
                url,
                retry_after,
            } => Some(RetryHint {
                retry_after: *retry_after,
                context: vec![
                    ("url".to_string(), url.clone()),
                    ("status".to_string(), status.to_string()),
                ],
            }),
            ApiError::Transport(err) => Some(RetryHint {
                retry_after: None,
                context: vec![("error".to_string(), err.to_string())],
            }),
            _ => None,
        }
    }
}

/// Parse a `Retry-After` header value: either seconds (possibly fractional)
/// or an HTTP-date. Unparseable values yield `None`.
#[must_use]
pub fn parse_retry_after(value: Option<&str>) -> Option<Duration> {
    let value = value?.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(seconds) = value.parse::<f64>() {
        if seconds >= 0.0 && seconds.is_finite() {
            return Some(Duration::from_secs_f64(seconds));
        }
        return None;
    }

    let when = chrono::DateTime::parse_from_rfc2822(value).ok()?;
    let delta = when.with_timezone(&Utc) - Utc::now();
    Some(delta.to_std().unwrap_or(Duration::ZERO))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_statuses_match_the_contract() {
        for status in [429, 500, 502, 503, 504] {
            assert!(is_retryable_status(status), "{status} should be retryable");
        }
        for status in [400, 401, 403, 404, 501] {
            assert!(!is_retryable_status(status), "{status} should be fatal");
        }
    }

    #[test]
    fn transient_errors_carry_a_retry_hint() {
        let err = ApiError::Transient {
            status: 429,
            url: "https://api.raindrop.io/rest/v1/collections".to_string(),
            retry_after: Some(Duration::from_secs(3)),
        };
        let hint = err.retry_hint().expect("should be retryable");
        assert_eq!(hint.retry_after, Some(Duration::from_secs(3)));
        assert!(hint
            .context
            .iter()
            .any(|(k, v)| k == "status" && v == "429"));
    }

    #[test]
    fn fatal_errors_have_no_retry_hint() {
        let err = ApiError::Status {
            status: 404,
            url: "https://api.raindrop.io/rest/v1/raindrop/1".to_string(),
        };
        assert!(err.retry_hint().is_none());
    }

    #[test]
    fn transport_errors_are_retryable() {
        let err = ApiError::Transport(HttpError::Transport("connection reset".to_string()));
        assert!(err.retry_hint().is_some());
    }

    #[test]
    fn parse_retry_after_accepts_seconds() {
        assert_eq!(
            parse_retry_after(Some("2")),
            Some(Duration::from_secs(2))
        );
        assert_eq!(
            parse_retry_after(Some("0.5")),
            Some(Duration::from_millis(500))
        );
    }

    #[test]
    fn parse_retry_after_accepts_http_date() {
        let future = (Utc::now() + chrono::Duration::seconds(90)).to_rfc2822();
        let parsed = parse_retry_after(Some(&future)).expect("should parse");
        assert!(parsed <= Duration::from_secs(90));
        assert!(parsed >= Duration::from_secs(80));
    }

    #[test]
    fn parse_retry_after_rejects_garbage() {
        assert_eq!(parse_retry_after(None), None);
        assert_eq!(parse_retry_after(Some("")), None);
        assert_eq!(parse_retry_after(Some("soon")), None);
        assert_eq!(parse_retry_after(Some("-5")), None);
    }

    #[test]
    fn past_http_date_clamps_to_zero() {
        let past = (Utc::now() - chrono::Duration::seconds(60)).to_rfc2822();
        assert_eq!(parse_retry_after(Some(&past)), Some(Duration::ZERO));
    }
}
