//! Versioned JSON snapshot of the full link set.
//!
//! Snapshot writes are idempotent: when the link content is unchanged the
//! existing file is left untouched, so its modification time survives no-op
//! runs. `generated_at` alone never forces a rewrite.

use std::fs;
use std::path::Path;

use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::entity::link_status::LinkStatus;
use crate::entity::tag_source::TagSource;
use crate::store::{self, StoreError};

/// Snapshot document schema version.
pub const SCHEMA_VERSION: &str = "1.0.0";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("snapshot I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot serialization failure: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// The exported document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub schema_version: String,
    pub generated_at: DateTime<Utc>,
    pub links: Vec<SnapshotLink>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotLink {
    pub raindrop_id: i64,
    pub url: String,
    pub title: String,
    pub description: Option<String>,
    pub created_at: Option<DateTime<FixedOffset>>,
    pub updated_at: Option<DateTime<FixedOffset>>,
    pub processed_at: Option<DateTime<FixedOffset>>,
    pub status: LinkStatus,
    pub collections: Vec<SnapshotCollection>,
    pub tags: Vec<SnapshotTag>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotCollection {
    pub id: i64,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotTag {
    pub tag: String,
    pub confidence: f64,
    pub source: TagSource,
    pub suggested_at: DateTime<FixedOffset>,
}

/// Assemble a snapshot of the full current link set.
pub async fn build_snapshot(db: &DatabaseConnection) -> Result<Snapshot, ExportError> {
    let details = store::links::list_all_details(db).await?;

    let links = details
        .into_iter()
        .map(|detail| SnapshotLink {
            raindrop_id: detail.link.raindrop_id,
            url: detail.link.url,
            title: detail.link.title,
            description: detail.link.description,
            created_at: detail.link.created_at,
            updated_at: detail.link.updated_at,
            processed_at: detail.link.processed_at,
            status: detail.link.status,
            collections: detail
                .collections
                .into_iter()
                .map(|c| SnapshotCollection {
                    id: c.id,
                    title: c.title,
                })
                .collect(),
            tags: detail
                .tags
                .into_iter()
                .map(|t| SnapshotTag {
                    tag: t.tag,
                    confidence: t.confidence,
                    source: t.source,
                    suggested_at: t.suggested_at,
                })
                .collect(),
        })
        .collect();

    Ok(Snapshot {
        schema_version: SCHEMA_VERSION.to_string(),
        generated_at: Utc::now(),
        links,
    })
}

/// Write a snapshot to `path`.
///
/// Returns `true` if the file was (re)written, `false` if the existing file
/// already holds identical link content.
pub fn write_snapshot(path: &Path, snapshot: &Snapshot) -> Result<bool, ExportError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    if path.exists() {
        if let Ok(existing) = fs::read_to_string(path) {
            if let Ok(existing) = serde_json::from_str::<Snapshot>(&existing) {
                if existing.schema_version == snapshot.schema_version
                    && existing.links == snapshot.links
                {
                    tracing::debug!(path = %path.display(), "snapshot unchanged, skipping write");
                    return Ok(false);
                }
            }
        }
    }

    let mut body = serde_json::to_string_pretty(snapshot)?;
    body.push('\n');
    fs::write(path, body)?;
    Ok(true)
}

/// Build and write the snapshot in one step.
///
/// Returns the number of exported links and whether the file changed.
pub async fn export_to_path(
    db: &DatabaseConnection,
    path: &Path,
) -> Result<(usize, bool), ExportError> {
    let snapshot = build_snapshot(db).await?;
    let changed = write_snapshot(path, &snapshot)?;
    Ok((snapshot.links.len(), changed))
}
