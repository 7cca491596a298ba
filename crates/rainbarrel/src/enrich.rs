//! Enrichment capabilities: content fetching, hashing, and tag suggestion.
//!
//! The sync engine consumes the [`ContentFetcher`] and [`Tagger`] traits and
//! treats their failures uniformly as "this candidate could not be enriched".
//! Built-in implementations cover HTML text extraction and metadata-derived
//! tags; model-backed taggers plug in behind the same trait.

use std::collections::HashMap;
use std::fmt::Write as _;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::entity::tag_source::TagSource;
use crate::http::{HttpHeaders, HttpTransport};

/// Why a candidate's content could not be fetched.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network failure for {url}: {message}")]
    Network { url: String, message: String },

    #[error("HTTP {status} for {url}")]
    Status { status: u16, url: String },

    #[error("no readable content extracted from {url}")]
    EmptyContent { url: String },
}

/// Fetches and extracts the readable text of a page.
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// Document handed to the tagger for one link.
#[derive(Debug, Clone)]
pub struct TagDocument {
    pub id: i64,
    pub url: String,
    pub title: String,
    pub content: String,
    pub created_at: Option<DateTime<Utc>>,
}

/// A raw tag suggestion before the engine's filtering.
#[derive(Debug, Clone, PartialEq)]
pub struct SuggestedTag {
    pub tag: String,
    pub confidence: f64,
    pub source: TagSource,
}

/// Per-item results of a tagging batch.
///
/// An id appears in `suggestions` or `failures`, never both; entries present
/// only in `failures` are routed to manual review by the engine.
#[derive(Debug, Default)]
pub struct TagBatch {
    pub suggestions: HashMap<i64, Vec<SuggestedTag>>,
    pub failures: HashMap<i64, String>,
}

/// Generates tag suggestions for a batch of documents.
#[async_trait]
pub trait Tagger: Send + Sync {
    async fn generate(&self, documents: &[TagDocument]) -> TagBatch;

    /// Version tag recorded on links enriched by this tagger.
    fn version(&self) -> String;
}

/// sha256 hex digest of fetched content.
#[must_use]
pub fn content_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        let _ = write!(out, "{byte:02x}");
    }
    out
}

/// Apply the engine's confidence threshold and tag cap.
///
/// Suggestions below `threshold` are dropped; the rest are sorted by
/// descending confidence and truncated to `max_tags`.
#[must_use]
pub fn filter_suggestions(
    mut tags: Vec<SuggestedTag>,
    threshold: f64,
    max_tags: usize,
) -> Vec<SuggestedTag> {
    tags.retain(|t| t.confidence >= threshold);
    tags.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    tags.truncate(max_tags);
    tags
}

/// Fetches a page over the HTTP transport and extracts readable text from
/// paragraph and heading elements.
pub struct HtmlContentFetcher<T> {
    transport: T,
}

impl<T> HtmlContentFetcher<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl<T: HttpTransport> ContentFetcher for HtmlContentFetcher<T> {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let headers: HttpHeaders = vec![
            (
                "Accept".to_string(),
                "text/html,application/xhtml+xml".to_string(),
            ),
            (
                "User-Agent".to_string(),
                format!("rainbarrel/{}", env!("CARGO_PKG_VERSION")),
            ),
        ];

        let response =
            self.transport
                .get(url, &headers)
                .await
                .map_err(|e| FetchError::Network {
                    url: url.to_string(),
                    message: e.to_string(),
                })?;

        if !(200..300).contains(&response.status) {
            return Err(FetchError::Status {
                status: response.status,
                url: url.to_string(),
            });
        }

        let html = String::from_utf8_lossy(&response.body);
        let text = extract_text(&html);
        if text.is_empty() {
            return Err(FetchError::EmptyContent {
                url: url.to_string(),
            });
        }
        Ok(text)
    }
}

/// Pull visible text out of paragraph, heading, and list elements.
fn extract_text(html: &str) -> String {
    let document = scraper::Html::parse_document(html);
    let Ok(selector) = scraper::Selector::parse("p, h1, h2, h3, li") else {
        return String::new();
    };

    let mut parts: Vec<String> = Vec::new();
    for element in document.select(&selector) {
        let joined = element.text().collect::<Vec<_>>().join(" ");
        let normalized = joined.split_whitespace().collect::<Vec<_>>().join(" ");
        if !normalized.is_empty() {
            parts.push(normalized);
        }
    }
    parts.join("\n")
}

/// Built-in tagger deriving suggestions from bookmark metadata: the URL host
/// plus keywords from the title. Model-backed taggers replace this behind the
/// [`Tagger`] trait.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetadataTagger;

const METADATA_TAGGER_VERSION: &str = "metadata-v1";

/// Words too generic to be useful tags.
const STOPWORDS: &[&str] = &[
    "about", "after", "also", "been", "for", "from", "have", "how", "into", "that", "the", "this",
    "what", "when", "where", "which", "will", "with", "your",
];

const MAX_TAG_LEN: usize = 40;

#[async_trait]
impl Tagger for MetadataTagger {
    async fn generate(&self, documents: &[TagDocument]) -> TagBatch {
        let mut batch = TagBatch::default();
        for doc in documents {
            let tags = metadata_tags(doc);
            if tags.is_empty() {
                batch
                    .failures
                    .insert(doc.id, "no usable metadata keywords".to_string());
            } else {
                batch.suggestions.insert(doc.id, tags);
            }
        }
        batch
    }

    fn version(&self) -> String {
        METADATA_TAGGER_VERSION.to_string()
    }
}

fn metadata_tags(doc: &TagDocument) -> Vec<SuggestedTag> {
    let mut tags: Vec<SuggestedTag> = Vec::new();
    let mut seen: Vec<String> = Vec::new();

    if let Ok(parsed) = url::Url::parse(&doc.url) {
        if let Some(host) = parsed.host_str() {
            let host = host.trim_start_matches("www.");
            if !host.is_empty() {
                seen.push(host.to_lowercase());
                tags.push(SuggestedTag {
                    tag: normalize_tag(host),
                    confidence: 0.9,
                    source: TagSource::Metadata,
                });
            }
        }
    }

    for word in doc.title.split(|c: char| !c.is_alphanumeric()) {
        let lower = word.to_lowercase();
        if lower.len() < 4 || STOPWORDS.contains(&lower.as_str()) || seen.contains(&lower) {
            continue;
        }
        seen.push(lower.clone());
        tags.push(SuggestedTag {
            tag: normalize_tag(&lower),
            confidence: 0.6,
            source: TagSource::Metadata,
        });
        if tags.len() >= 10 {
            break;
        }
    }

    tags
}

fn normalize_tag(raw: &str) -> String {
    let mut tag = raw.trim().to_lowercase();
    if tag.len() > MAX_TAG_LEN {
        tag.truncate(MAX_TAG_LEN);
    }
    tag
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: i64, url: &str, title: &str) -> TagDocument {
        TagDocument {
            id,
            url: url.to_string(),
            title: title.to_string(),
            content: String::new(),
            created_at: None,
        }
    }

    #[test]
    fn content_hash_matches_known_digest() {
        assert_eq!(
            content_hash("hello"),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[test]
    fn content_hash_differs_for_different_content() {
        assert_ne!(content_hash("a"), content_hash("b"));
    }

    #[test]
    fn filter_sorts_by_confidence_and_truncates() {
        let tags = vec![
            SuggestedTag {
                tag: "low".to_string(),
                confidence: 0.61,
                source: TagSource::Llm,
            },
            SuggestedTag {
                tag: "high".to_string(),
                confidence: 0.95,
                source: TagSource::Llm,
            },
            SuggestedTag {
                tag: "mid".to_string(),
                confidence: 0.8,
                source: TagSource::Llm,
            },
        ];

        let filtered = filter_suggestions(tags, 0.6, 2);
        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered[0].tag, "high");
        assert_eq!(filtered[1].tag, "mid");
    }

    #[test]
    fn filter_drops_below_threshold() {
        let tags = vec![
            SuggestedTag {
                tag: "weak".to_string(),
                confidence: 0.2,
                source: TagSource::Llm,
            },
            SuggestedTag {
                tag: "strong".to_string(),
                confidence: 0.9,
                source: TagSource::Llm,
            },
        ];

        let filtered = filter_suggestions(tags, 0.6, 10);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].tag, "strong");
    }

    #[test]
    fn extract_text_reads_paragraphs_and_headings() {
        let html = r#"<html><head><title>t</title><style>.x{}</style></head>
            <body><h1>Welcome</h1><p>First   paragraph.</p>
            <script>var x = 1;</script><li>item one</li></body></html>"#;
        let text = extract_text(html);
        assert!(text.contains("Welcome"));
        assert!(text.contains("First paragraph."));
        assert!(text.contains("item one"));
        assert!(!text.contains("var x"));
    }

    #[test]
    fn extract_text_of_empty_page_is_empty() {
        assert_eq!(extract_text("<html><body></body></html>"), "");
    }

    #[tokio::test]
    async fn metadata_tagger_derives_host_and_title_keywords() {
        let tagger = MetadataTagger;
        let docs = vec![doc(
            1,
            "https://www.example.com/posts/1",
            "Understanding Async Runtimes",
        )];
        let batch = tagger.generate(&docs).await;

        let tags = batch.suggestions.get(&1).expect("should have suggestions");
        assert!(tags.iter().any(|t| t.tag == "example.com"));
        assert!(tags.iter().any(|t| t.tag == "understanding"));
        assert!(tags.iter().any(|t| t.tag == "async"));
        assert!(tags.iter().all(|t| t.source == TagSource::Metadata));
        assert!(batch.failures.is_empty());
    }

    #[tokio::test]
    async fn metadata_tagger_reports_failure_for_bare_documents() {
        let tagger = MetadataTagger;
        let docs = vec![doc(2, "not a url", "a an it")];
        let batch = tagger.generate(&docs).await;

        assert!(batch.suggestions.is_empty());
        assert!(batch.failures.contains_key(&2));
    }

    #[test]
    fn normalize_tag_truncates_long_values() {
        let long = "x".repeat(80);
        assert_eq!(normalize_tag(&long).len(), MAX_TAG_LEN);
    }
}
