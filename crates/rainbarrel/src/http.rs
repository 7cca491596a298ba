//! HTTP transport seam for all remote I/O.
//!
//! The Raindrop mirror is strictly read-only against the remote API, so the
//! transport exposes a single `get` operation. Production code uses the
//! reqwest-backed transport; unit tests register canned responses on the
//! in-memory mock and never open sockets.

use async_trait::async_trait;
use thiserror::Error;

/// HTTP headers represented as key/value pairs.
///
/// Header names are treated case-insensitively by helper functions.
pub type HttpHeaders = Vec<(String, String)>;

/// A minimal HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HttpHeaders,
    pub body: Vec<u8>,
}

impl HttpResponse {
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        header_get(&self.headers, name)
    }
}

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("http transport error: {0}")]
    Transport(String),

    #[error("no mock response registered for GET {url}")]
    NoMockResponse { url: String },
}

/// Transport boundary for all HTTP I/O.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Issue a GET request with the given headers.
    ///
    /// `url` carries the full URL including any query string. Implementations
    /// return the response regardless of status code; status handling belongs
    /// to the caller.
    async fn get(&self, url: &str, headers: &HttpHeaders) -> Result<HttpResponse, HttpError>;
}

/// Get the first header value matching `name` (case-insensitive).
#[must_use]
pub fn header_get<'a>(headers: &'a HttpHeaders, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

/// A real HTTP transport backed by reqwest.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Build a transport with a per-request timeout.
    pub fn with_timeout(timeout: std::time::Duration) -> Result<Self, HttpError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| HttpError::Transport(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str, headers: &HttpHeaders) -> Result<HttpResponse, HttpError> {
        let mut builder = self.client.get(url);
        for (k, v) in headers {
            builder = builder.header(k, v);
        }

        let resp = builder
            .send()
            .await
            .map_err(|e| HttpError::Transport(e.to_string()))?;

        let status = resp.status().as_u16();
        let mut response_headers: HttpHeaders = Vec::new();
        for (name, value) in resp.headers().iter() {
            response_headers.push((
                name.as_str().to_string(),
                value.to_str().unwrap_or_default().to_string(),
            ));
        }

        let body = resp
            .bytes()
            .await
            .map_err(|e| HttpError::Transport(e.to_string()))?
            .to_vec();

        Ok(HttpResponse {
            status,
            headers: response_headers,
            body,
        })
    }
}

// ---------- Test-only mock transport ----------

#[cfg(test)]
use std::collections::{HashMap, VecDeque};
#[cfg(test)]
use std::sync::{Arc, Mutex};

/// In-memory mock transport keyed by full URL.
///
/// Multiple responses registered for the same URL are returned in FIFO
/// order, which makes retry sequences (429 then 200) easy to script.
#[cfg(test)]
#[derive(Clone, Default)]
pub struct MockTransport {
    inner: Arc<Mutex<MockTransportInner>>,
}

#[cfg(test)]
#[derive(Default)]
struct MockTransportInner {
    routes: HashMap<String, VecDeque<HttpResponse>>,
    requests: Vec<String>,
}

#[cfg(test)]
impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a response for a URL.
    pub fn push_response(&self, url: impl Into<String>, response: HttpResponse) {
        let mut inner = self
            .inner
            .lock()
            .expect("mock transport lock should not be poisoned");
        inner
            .routes
            .entry(url.into())
            .or_default()
            .push_back(response);
    }

    /// Register a 200 response with a JSON body and optional extra headers.
    pub fn push_json(&self, url: impl Into<String>, body: &str, headers: HttpHeaders) {
        self.push_response(
            url,
            HttpResponse {
                status: 200,
                headers,
                body: body.as_bytes().to_vec(),
            },
        );
    }

    /// URLs requested so far, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<String> {
        let inner = self
            .inner
            .lock()
            .expect("mock transport lock should not be poisoned");
        inner.requests.clone()
    }
}

#[cfg(test)]
#[async_trait]
impl HttpTransport for MockTransport {
    async fn get(&self, url: &str, _headers: &HttpHeaders) -> Result<HttpResponse, HttpError> {
        let mut inner = self
            .inner
            .lock()
            .expect("mock transport lock should not be poisoned");
        inner.requests.push(url.to_string());

        match inner.routes.get_mut(url).and_then(|q| q.pop_front()) {
            Some(resp) => Ok(resp),
            None => Err(HttpError::NoMockResponse {
                url: url.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_get_is_case_insensitive_and_returns_first_match() {
        let headers: HttpHeaders = vec![
            ("X-RateLimit-Remaining".to_string(), "119".to_string()),
            ("x-ratelimit-remaining".to_string(), "42".to_string()),
        ];
        assert_eq!(header_get(&headers, "x-ratelimit-remaining"), Some("119"));
        assert_eq!(header_get(&headers, "X-RATELIMIT-REMAINING"), Some("119"));
        assert_eq!(header_get(&headers, "missing"), None);
    }

    #[test]
    fn http_response_header_delegates_to_helper() {
        let resp = HttpResponse {
            status: 200,
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: Vec::new(),
        };
        assert_eq!(resp.header("content-type"), Some("application/json"));
        assert_eq!(resp.header("missing"), None);
    }

    #[tokio::test]
    async fn mock_transport_returns_responses_in_fifo_order() {
        let transport = MockTransport::new();
        let url = "https://example.com/api";

        transport.push_response(
            url,
            HttpResponse {
                status: 429,
                headers: Vec::new(),
                body: Vec::new(),
            },
        );
        transport.push_json(url, r#"{"ok":true}"#, Vec::new());

        let first = transport.get(url, &Vec::new()).await.expect("first");
        assert_eq!(first.status, 429);

        let second = transport.get(url, &Vec::new()).await.expect("second");
        assert_eq!(second.status, 200);
        assert_eq!(second.body, br#"{"ok":true}"#.to_vec());

        assert_eq!(transport.requests(), vec![url.to_string(), url.to_string()]);
    }

    #[tokio::test]
    async fn mock_transport_errors_when_no_response_is_registered() {
        let transport = MockTransport::new();
        let err = transport
            .get("https://example.com/missing", &Vec::new())
            .await
            .expect_err("missing mock should error");
        match err {
            HttpError::NoMockResponse { url } => {
                assert_eq!(url, "https://example.com/missing");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn reqwest_transport_with_timeout_builds_client() {
        let transport = ReqwestTransport::with_timeout(std::time::Duration::from_secs(30))
            .expect("reqwest transport should build");
        let _ = transport;
    }
}
