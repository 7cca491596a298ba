//! Typed wire payloads for the Raindrop REST API.
//!
//! The API's loosely-shaped JSON is parsed into explicit structs right here
//! at the client boundary; nothing downstream sees untyped maps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::http::{header_get, HttpHeaders};

fn default_true() -> bool {
    true
}

/// Envelope returned by listing endpoints (`{"result": true, "items": [...]}`).
#[derive(Debug, Clone, Deserialize)]
pub struct ListEnvelope<T> {
    #[serde(default = "default_true")]
    pub result: bool,
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

/// Envelope returned by single-item endpoints (`{"result": true, "item": {...}}`).
#[derive(Debug, Clone, Deserialize)]
pub struct ItemEnvelope<T> {
    #[serde(default = "default_true")]
    pub result: bool,
    pub item: T,
}

/// Nested id reference as the API encodes it (`{"$id": 42}`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct IdRef {
    #[serde(rename = "$id")]
    pub id: i64,
}

/// A collection as returned by `GET /collections`.
#[derive(Debug, Clone, Deserialize)]
pub struct CollectionPayload {
    #[serde(rename = "_id")]
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub parent: Option<IdRef>,
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
    #[serde(rename = "lastUpdate", default)]
    pub last_update: Option<DateTime<Utc>>,
    #[serde(default)]
    pub count: Option<u64>,
}

impl CollectionPayload {
    #[must_use]
    pub fn parent_id(&self) -> Option<i64> {
        self.parent.map(|p| p.id)
    }
}

/// A bookmark as returned by `GET /raindrops/{collection}` and `GET /raindrop/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct RaindropPayload {
    #[serde(rename = "_id")]
    pub id: i64,
    #[serde(default, alias = "url")]
    pub link: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
    #[serde(rename = "lastUpdate", default)]
    pub last_update: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub collection: Option<IdRef>,
    #[serde(rename = "collectionId", default)]
    pub collection_id: Option<i64>,
    #[serde(default)]
    pub removed: bool,
    #[serde(default)]
    pub duplicate: bool,
    #[serde(default)]
    pub broken: bool,
}

impl RaindropPayload {
    /// The owning collection, from whichever field the API populated.
    #[must_use]
    pub fn owning_collection(&self) -> Option<i64> {
        self.collection.map(|c| c.id).or(self.collection_id)
    }

    /// Excerpt or note, whichever is present and non-empty.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.excerpt
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.note.as_deref().filter(|s| !s.is_empty()))
    }

    /// Whether this bookmark should participate in a sync at all.
    ///
    /// Items flagged removed/duplicate/broken, and items without a valid
    /// http(s) URL, are discarded before diffing.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !(self.removed || self.duplicate || self.broken) && is_valid_url(&self.link)
    }
}

fn is_valid_url(candidate: &str) -> bool {
    match url::Url::parse(candidate) {
        Ok(parsed) => {
            matches!(parsed.scheme(), "http" | "https") && parsed.host_str().is_some()
        }
        Err(_) => false,
    }
}

/// Rate-limit telemetry parsed best-effort from `X-RateLimit-*` response
/// headers. A missing header yields an absent field, never an error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitSnapshot {
    pub limit: Option<i64>,
    pub remaining: Option<i64>,
    pub reset_epoch: Option<i64>,
}

impl RateLimitSnapshot {
    #[must_use]
    pub fn from_headers(headers: &HttpHeaders) -> Self {
        let parse = |name: &str| {
            header_get(headers, name).and_then(|value| value.trim().parse::<i64>().ok())
        };
        Self {
            limit: parse("x-ratelimit-limit"),
            remaining: parse("x-ratelimit-remaining"),
            reset_epoch: parse("x-ratelimit-reset"),
        }
    }

    /// True when no header was observed at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.limit.is_none() && self.remaining.is_none() && self.reset_epoch.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_collection_payload_with_nested_parent() {
        let json = r##"{
            "_id": 12,
            "title": "Reading",
            "color": "#0088ff",
            "parent": {"$id": 3},
            "created": "2024-01-01T00:00:00Z",
            "lastUpdate": "2024-02-01T12:30:00Z",
            "count": 17
        }"##;
        let payload: CollectionPayload = serde_json::from_str(json).expect("parse");
        assert_eq!(payload.id, 12);
        assert_eq!(payload.title, "Reading");
        assert_eq!(payload.parent_id(), Some(3));
        assert_eq!(payload.count, Some(17));
        assert!(payload.last_update.is_some());
    }

    #[test]
    fn parses_raindrop_payload_and_resolves_collection() {
        let json = r#"{
            "_id": 101,
            "link": "https://example.com/post",
            "title": "A post",
            "excerpt": "Short summary",
            "created": "2024-01-01T00:00:00Z",
            "lastUpdate": "2024-01-02T00:00:00Z",
            "tags": ["rust"],
            "collection": {"$id": 1}
        }"#;
        let payload: RaindropPayload = serde_json::from_str(json).expect("parse");
        assert_eq!(payload.id, 101);
        assert_eq!(payload.owning_collection(), Some(1));
        assert_eq!(payload.description(), Some("Short summary"));
        assert!(payload.is_active());
    }

    #[test]
    fn collection_id_field_is_a_fallback() {
        let json = r#"{"_id": 5, "link": "https://example.com", "collectionId": 9}"#;
        let payload: RaindropPayload = serde_json::from_str(json).expect("parse");
        assert_eq!(payload.owning_collection(), Some(9));
    }

    #[test]
    fn description_falls_back_to_note() {
        let json = r#"{"_id": 5, "link": "https://example.com", "excerpt": "", "note": "kept"}"#;
        let payload: RaindropPayload = serde_json::from_str(json).expect("parse");
        assert_eq!(payload.description(), Some("kept"));
    }

    #[test]
    fn flagged_or_invalid_items_are_inactive() {
        let removed = r#"{"_id": 1, "link": "https://example.com", "removed": true}"#;
        let payload: RaindropPayload = serde_json::from_str(removed).expect("parse");
        assert!(!payload.is_active());

        let bad_url = r#"{"_id": 2, "link": "not a url"}"#;
        let payload: RaindropPayload = serde_json::from_str(bad_url).expect("parse");
        assert!(!payload.is_active());

        let ftp = r#"{"_id": 3, "link": "ftp://example.com/file"}"#;
        let payload: RaindropPayload = serde_json::from_str(ftp).expect("parse");
        assert!(!payload.is_active());
    }

    #[test]
    fn list_envelope_defaults_result_to_true() {
        let envelope: ListEnvelope<RaindropPayload> =
            serde_json::from_str(r#"{"items": []}"#).expect("parse");
        assert!(envelope.result);
        assert!(envelope.items.is_empty());
    }

    #[test]
    fn rate_limit_snapshot_parses_present_headers_only() {
        let headers: HttpHeaders = vec![
            ("X-RateLimit-Limit".to_string(), "120".to_string()),
            ("X-RateLimit-Remaining".to_string(), "119".to_string()),
        ];
        let snapshot = RateLimitSnapshot::from_headers(&headers);
        assert_eq!(snapshot.limit, Some(120));
        assert_eq!(snapshot.remaining, Some(119));
        assert_eq!(snapshot.reset_epoch, None);
        assert!(!snapshot.is_empty());
    }

    #[test]
    fn rate_limit_snapshot_tolerates_garbage_values() {
        let headers: HttpHeaders = vec![
            ("X-RateLimit-Limit".to_string(), "not-a-number".to_string()),
        ];
        let snapshot = RateLimitSnapshot::from_headers(&headers);
        assert!(snapshot.is_empty());
    }
}
