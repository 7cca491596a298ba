//! Rate-limit-aware paginated client for the Raindrop REST API.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::DeserializeOwned;

use crate::http::{HttpHeaders, HttpTransport};
use crate::retry::{RetryCallback, RetryRunner, Sleeper, TokioSleeper};

use super::error::{is_retryable_status, parse_retry_after, ApiError};
use super::pacer::RequestPacer;
use super::types::{
    CollectionPayload, ItemEnvelope, ListEnvelope, RaindropPayload, RateLimitSnapshot,
};

/// Public Raindrop REST endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.raindrop.io/rest/v1";

/// Default listing page size.
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Contract the sync engine consumes.
///
/// Implementations handle pagination internally and surface rate-limit
/// telemetry alongside every result; retries happen below this interface.
#[async_trait]
pub trait RemoteClient: Send + Sync {
    /// List all collections.
    async fn list_collections(
        &self,
    ) -> Result<(Vec<CollectionPayload>, RateLimitSnapshot), ApiError>;

    /// List all raindrops in a collection, optionally bounded by a cursor.
    ///
    /// Pages are fetched until one comes back shorter than `page_size`.
    async fn list_raindrops(
        &self,
        collection_id: i64,
        since: Option<DateTime<Utc>>,
        page_size: u32,
    ) -> Result<(Vec<RaindropPayload>, RateLimitSnapshot), ApiError>;

    /// Fetch a single raindrop for reprocessing.
    async fn fetch_raindrop(
        &self,
        raindrop_id: i64,
    ) -> Result<(RaindropPayload, RateLimitSnapshot), ApiError>;
}

/// Production client over an injectable [`HttpTransport`].
pub struct RaindropClient<T> {
    transport: T,
    token: String,
    base_url: String,
    runner: RetryRunner,
    sleeper: Box<dyn Sleeper>,
    pacer: Option<RequestPacer>,
    on_retry: Option<RetryCallback>,
}

impl<T: HttpTransport> RaindropClient<T> {
    /// Create a client with default retry policy and no proactive pacing.
    pub fn new(transport: T, token: impl Into<String>) -> Self {
        Self {
            transport,
            token: token.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            runner: RetryRunner::default(),
            sleeper: Box::new(TokioSleeper),
            pacer: None,
            on_retry: None,
        }
    }

    /// Override the API base URL (tests, self-hosted proxies).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Override the retry policy.
    #[must_use]
    pub fn with_runner(mut self, runner: RetryRunner) -> Self {
        self.runner = runner;
        self
    }

    /// Inject a sleeper (tests pass a recording sleeper).
    #[must_use]
    pub fn with_sleeper(mut self, sleeper: Box<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Enable proactive request pacing.
    #[must_use]
    pub fn with_pacer(mut self, pacer: RequestPacer) -> Self {
        self.pacer = Some(pacer);
        self
    }

    /// Receive retry telemetry (attempt index, delay, wait hint, context).
    #[must_use]
    pub fn with_retry_callback(mut self, callback: RetryCallback) -> Self {
        self.on_retry = Some(callback);
        self
    }

    fn request_headers(&self) -> HttpHeaders {
        vec![
            (
                "Authorization".to_string(),
                format!("Bearer {}", self.token),
            ),
            ("Accept".to_string(), "application/json".to_string()),
            (
                "User-Agent".to_string(),
                format!("rainbarrel/{}", env!("CARGO_PKG_VERSION")),
            ),
        ]
    }

    /// One GET with status classification, run under the retry budget.
    async fn get_json<D: DeserializeOwned>(
        &self,
        url: &str,
    ) -> Result<(D, RateLimitSnapshot), ApiError> {
        let headers = self.request_headers();
        let headers = &headers;

        let operation = move || async move {
            if let Some(pacer) = &self.pacer {
                pacer.wait().await;
            }

            tracing::debug!(url, "GET");
            let response = self.transport.get(url, headers).await?;

            if is_retryable_status(response.status) {
                let retry_after = parse_retry_after(response.header("retry-after"));
                return Err(ApiError::Transient {
                    status: response.status,
                    url: url.to_string(),
                    retry_after,
                });
            }
            if !(200..300).contains(&response.status) {
                return Err(ApiError::Status {
                    status: response.status,
                    url: url.to_string(),
                });
            }

            let snapshot = RateLimitSnapshot::from_headers(&response.headers);
            let data = serde_json::from_slice(&response.body).map_err(|e| ApiError::Decode {
                url: url.to_string(),
                source: e,
            })?;
            Ok((data, snapshot))
        };

        self.runner
            .run(
                operation,
                ApiError::retry_hint,
                self.sleeper.as_ref(),
                self.on_retry.as_ref(),
            )
            .await
    }
}

#[async_trait]
impl<T: HttpTransport> RemoteClient for RaindropClient<T> {
    async fn list_collections(
        &self,
    ) -> Result<(Vec<CollectionPayload>, RateLimitSnapshot), ApiError> {
        let url = format!("{}/collections", self.base_url);
        let (envelope, snapshot): (ListEnvelope<CollectionPayload>, _) =
            self.get_json(&url).await?;
        Ok((envelope.items, snapshot))
    }

    async fn list_raindrops(
        &self,
        collection_id: i64,
        since: Option<DateTime<Utc>>,
        page_size: u32,
    ) -> Result<(Vec<RaindropPayload>, RateLimitSnapshot), ApiError> {
        let mut items: Vec<RaindropPayload> = Vec::new();
        let mut snapshot = RateLimitSnapshot::default();
        let mut page = 0u32;

        loop {
            let mut url = format!(
                "{}/raindrops/{}?perpage={}&page={}",
                self.base_url, collection_id, page_size, page
            );
            if let Some(since) = since {
                url.push_str(&format!(
                    "&lastUpdate={}",
                    since.to_rfc3339_opts(SecondsFormat::Secs, true)
                ));
            }

            let (envelope, page_snapshot): (ListEnvelope<RaindropPayload>, _) =
                self.get_json(&url).await?;
            if !page_snapshot.is_empty() {
                snapshot = page_snapshot;
            }

            let batch_len = envelope.items.len();
            items.extend(envelope.items);

            // Short page (or an unhappy result flag) means end of results.
            if !envelope.result || (batch_len as u32) < page_size {
                break;
            }
            page += 1;
        }

        Ok((items, snapshot))
    }

    async fn fetch_raindrop(
        &self,
        raindrop_id: i64,
    ) -> Result<(RaindropPayload, RateLimitSnapshot), ApiError> {
        let url = format!("{}/raindrop/{}", self.base_url, raindrop_id);
        let (envelope, snapshot): (ItemEnvelope<RaindropPayload>, _) = self.get_json(&url).await?;
        Ok((envelope.item, snapshot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{HttpResponse, MockTransport};
    use crate::retry::{BackoffPolicy, RetryEvent};
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    const BASE: &str = "https://api.test/rest/v1";

    #[derive(Clone, Default)]
    struct RecordingSleeper {
        slept: Arc<Mutex<Vec<Duration>>>,
    }

    impl RecordingSleeper {
        fn delays(&self) -> Vec<Duration> {
            self.slept.lock().expect("sleeper lock").clone()
        }
    }

    #[async_trait]
    impl Sleeper for RecordingSleeper {
        async fn sleep(&self, duration: Duration) {
            self.slept.lock().expect("sleeper lock").push(duration);
        }
    }

    fn client(transport: MockTransport) -> RaindropClient<MockTransport> {
        RaindropClient::new(transport, "test-token").with_base_url(BASE)
    }

    #[tokio::test]
    async fn list_collections_parses_items_and_telemetry() {
        let transport = MockTransport::new();
        transport.push_json(
            format!("{BASE}/collections"),
            r#"{"result": true, "items": [
                {"_id": 1, "title": "Reading", "lastUpdate": "2024-02-01T00:00:00Z"},
                {"_id": 2, "title": "Research"}
            ]}"#,
            vec![
                ("X-RateLimit-Limit".to_string(), "120".to_string()),
                ("X-RateLimit-Remaining".to_string(), "118".to_string()),
                ("X-RateLimit-Reset".to_string(), "1700000000".to_string()),
            ],
        );

        let (collections, snapshot) = client(transport)
            .list_collections()
            .await
            .expect("should succeed");

        assert_eq!(collections.len(), 2);
        assert_eq!(collections[0].title, "Reading");
        assert_eq!(snapshot.limit, Some(120));
        assert_eq!(snapshot.remaining, Some(118));
        assert_eq!(snapshot.reset_epoch, Some(1_700_000_000));
    }

    #[tokio::test]
    async fn list_raindrops_paginates_until_short_page() {
        let transport = MockTransport::new();
        transport.push_json(
            format!("{BASE}/raindrops/1?perpage=2&page=0"),
            r#"{"items": [
                {"_id": 101, "link": "https://example.com/a"},
                {"_id": 102, "link": "https://example.com/b"}
            ]}"#,
            Vec::new(),
        );
        transport.push_json(
            format!("{BASE}/raindrops/1?perpage=2&page=1"),
            r#"{"items": [{"_id": 103, "link": "https://example.com/c"}]}"#,
            vec![("X-RateLimit-Remaining".to_string(), "99".to_string())],
        );

        let raindrop_client = client(transport.clone());
        let (items, snapshot) = raindrop_client
            .list_raindrops(1, None, 2)
            .await
            .expect("should succeed");

        assert_eq!(items.len(), 3);
        assert_eq!(
            items.iter().map(|i| i.id).collect::<Vec<_>>(),
            vec![101, 102, 103]
        );
        assert_eq!(snapshot.remaining, Some(99));
        assert_eq!(transport.requests().len(), 2);
    }

    #[tokio::test]
    async fn list_raindrops_appends_cursor_parameter() {
        let transport = MockTransport::new();
        let since = "2024-01-01T00:00:00Z";
        transport.push_json(
            format!("{BASE}/raindrops/7?perpage=50&page=0&lastUpdate={since}"),
            r#"{"items": []}"#,
            Vec::new(),
        );

        let cursor = DateTime::parse_from_rfc3339(since)
            .expect("valid timestamp")
            .with_timezone(&Utc);
        let (items, _) = client(transport.clone())
            .list_raindrops(7, Some(cursor), 50)
            .await
            .expect("should succeed");

        assert!(items.is_empty());
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn rate_limited_request_retries_once_then_succeeds() {
        let transport = MockTransport::new();
        let url = format!("{BASE}/collections");
        transport.push_response(
            url.clone(),
            HttpResponse {
                status: 429,
                headers: vec![("Retry-After".to_string(), "2".to_string())],
                body: Vec::new(),
            },
        );
        transport.push_json(url, r#"{"items": [{"_id": 1, "title": "ok"}]}"#, Vec::new());

        let sleeper = RecordingSleeper::default();
        let events: Arc<Mutex<Vec<RetryEvent>>> = Arc::new(Mutex::new(Vec::new()));
        let events_capture = Arc::clone(&events);

        let raindrop_client = RaindropClient::new(transport.clone(), "token")
            .with_base_url(BASE)
            .with_sleeper(Box::new(sleeper.clone()))
            .with_retry_callback(Box::new(move |event| {
                events_capture.lock().expect("events lock").push(event);
            }));

        let (collections, _) = raindrop_client
            .list_collections()
            .await
            .expect("should succeed after retry");

        assert_eq!(collections.len(), 1);
        assert_eq!(transport.requests().len(), 2);
        // Server wait hint honored verbatim over computed backoff.
        assert_eq!(sleeper.delays(), vec![Duration::from_secs(2)]);

        let events = events.lock().expect("events lock");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].attempt, 1);
        assert_eq!(events[0].retry_after, Some(Duration::from_secs(2)));
    }

    #[tokio::test]
    async fn server_errors_exhaust_the_retry_budget() {
        let transport = MockTransport::new();
        let url = format!("{BASE}/collections");
        for _ in 0..3 {
            transport.push_response(
                url.clone(),
                HttpResponse {
                    status: 503,
                    headers: Vec::new(),
                    body: Vec::new(),
                },
            );
        }

        let raindrop_client = RaindropClient::new(transport.clone(), "token")
            .with_base_url(BASE)
            .with_runner(RetryRunner::new(
                3,
                BackoffPolicy::new(Duration::from_millis(1), Duration::from_millis(1)),
            ))
            .with_sleeper(Box::new(RecordingSleeper::default()));

        let err = raindrop_client
            .list_collections()
            .await
            .expect_err("budget should exhaust");

        assert!(matches!(err, ApiError::Transient { status: 503, .. }));
        assert_eq!(transport.requests().len(), 3);
    }

    #[tokio::test]
    async fn non_retryable_status_fails_immediately() {
        let transport = MockTransport::new();
        let url = format!("{BASE}/raindrop/42");
        transport.push_response(
            url,
            HttpResponse {
                status: 404,
                headers: Vec::new(),
                body: Vec::new(),
            },
        );

        let err = client(transport.clone())
            .fetch_raindrop(42)
            .await
            .expect_err("404 is fatal");

        assert!(matches!(err, ApiError::Status { status: 404, .. }));
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn malformed_body_is_a_decode_error() {
        let transport = MockTransport::new();
        transport.push_json(format!("{BASE}/collections"), "not json", Vec::new());

        let err = client(transport)
            .list_collections()
            .await
            .expect_err("should fail to decode");
        assert!(matches!(err, ApiError::Decode { .. }));
    }

    #[tokio::test]
    async fn fetch_raindrop_unwraps_item_envelope() {
        let transport = MockTransport::new();
        transport.push_json(
            format!("{BASE}/raindrop/101"),
            r#"{"result": true, "item": {"_id": 101, "link": "https://example.com/a", "title": "A"}}"#,
            Vec::new(),
        );

        let (item, _) = client(transport)
            .fetch_raindrop(101)
            .await
            .expect("should succeed");
        assert_eq!(item.id, 101);
        assert_eq!(item.title, "A");
    }
}
