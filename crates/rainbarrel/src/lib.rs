//! rainbarrel - a durable local mirror for Raindrop bookmarks.
//!
//! The library syncs a Raindrop.io account (collections and saved links) into
//! a local SQLite store, enriches each link with extracted page content and
//! suggested tags, and exports a versioned JSON snapshot after every run.
//!
//! # Features
//!
//! - `migrate` - Enables schema migration support and [`connect_and_migrate`].
//!
//! # Example
//!
//! ```ignore
//! use rainbarrel::api::{RaindropClient, RequestPacer};
//! use rainbarrel::enrich::{HtmlContentFetcher, MetadataTagger};
//! use rainbarrel::http::ReqwestTransport;
//! use rainbarrel::sync::{SyncEngine, SyncOptions};
//! use rainbarrel::RunMode;
//!
//! let db = rainbarrel::connect_and_migrate("sqlite://rainbarrel.db?mode=rwc").await?;
//! let transport = ReqwestTransport::with_timeout(std::time::Duration::from_secs(30))?;
//! let client = RaindropClient::new(transport.clone(), token)
//!     .with_pacer(RequestPacer::per_minute(120));
//! let fetcher = HtmlContentFetcher::new(transport);
//! let tagger = MetadataTagger;
//!
//! let engine = SyncEngine::new(&db, &client, &fetcher, &tagger, SyncOptions::default(), None);
//! let summary = engine.run(RunMode::Incremental).await?;
//! println!("processed {} links", summary.processed);
//! ```

pub mod api;
pub mod db;
pub mod enrich;
pub mod entity;
pub mod export;
pub mod http;
pub mod retry;
pub mod store;
pub mod sync;

#[cfg(feature = "migrate")]
pub mod migration;

pub use db::connect;
#[cfg(feature = "migrate")]
pub use db::connect_and_migrate;
pub use entity::prelude::*;
pub use store::{LinkDetail, StoreError};
pub use sync::{RunSummary, SyncEngine, SyncError, SyncOptions};
