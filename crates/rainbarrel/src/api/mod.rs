//! Raindrop REST API surface: typed wire payloads, error taxonomy, and the
//! rate-limit-aware paginated client.

mod client;
mod error;
mod pacer;
mod types;

pub use client::{RaindropClient, RemoteClient, DEFAULT_BASE_URL, DEFAULT_PAGE_SIZE};
pub use error::{is_retryable_status, parse_retry_after, ApiError};
pub use pacer::RequestPacer;
pub use types::{
    CollectionPayload, IdRef, ItemEnvelope, ListEnvelope, RaindropPayload, RateLimitSnapshot,
};
