//! Link entity - one mirrored Raindrop bookmark.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::entity::link_status::LinkStatus;

/// Link model - the durable record for a single remote bookmark.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "links")]
pub struct Model {
    /// Remote numeric identifier. Immutable primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub raindrop_id: i64,

    // ─── Content ─────────────────────────────────────────────────────────────
    /// Bookmark URL.
    #[sea_orm(column_type = "Text")]
    pub url: String,
    /// Bookmark title.
    pub title: String,
    /// Optional excerpt/description.
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    // ─── Timestamps ──────────────────────────────────────────────────────────
    /// When the bookmark was created remotely. Immutable once set.
    pub created_at: Option<DateTimeWithTimeZone>,
    /// Remote-authoritative last-modified timestamp.
    pub updated_at: Option<DateTimeWithTimeZone>,
    /// Set only on successful enrichment.
    pub processed_at: Option<DateTimeWithTimeZone>,

    // ─── Enrichment ──────────────────────────────────────────────────────────
    /// sha256 hex digest of the fetched content, null until fetched.
    pub content_hash: Option<String>,
    /// Lifecycle status; `processed_at` is non-null iff this is `processed`.
    pub status: LinkStatus,
    /// Version tag of the enrichment model that produced the tags.
    pub llm_version: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// A link owns its tag suggestions (replace-on-write).
    #[sea_orm(has_many = "super::tag_suggestion::Entity")]
    TagSuggestion,
    /// Membership rows tying the link to collections.
    #[sea_orm(has_many = "super::link_collection::Entity")]
    LinkCollection,
}

impl Related<super::tag_suggestion::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TagSuggestion.def()
    }
}

impl Related<super::collection::Entity> for Entity {
    fn to() -> RelationDef {
        super::link_collection::Relation::Collection.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::link_collection::Relation::Link.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Whether the processed-timestamp invariant holds for this record.
    #[must_use]
    pub fn status_invariant_holds(&self) -> bool {
        (self.status == LinkStatus::Processed) == self.processed_at.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn make_link(status: LinkStatus, processed: bool) -> Model {
        Model {
            raindrop_id: 101,
            url: "https://example.com/a".to_string(),
            title: "Example".to_string(),
            description: None,
            created_at: Some(Utc::now().fixed_offset()),
            updated_at: Some(Utc::now().fixed_offset()),
            processed_at: processed.then(|| Utc::now().fixed_offset()),
            content_hash: None,
            status,
            llm_version: None,
        }
    }

    #[test]
    fn invariant_holds_for_processed_with_timestamp() {
        assert!(make_link(LinkStatus::Processed, true).status_invariant_holds());
        assert!(make_link(LinkStatus::Pending, false).status_invariant_holds());
        assert!(make_link(LinkStatus::ManualReview, false).status_invariant_holds());
    }

    #[test]
    fn invariant_fails_when_out_of_sync() {
        assert!(!make_link(LinkStatus::Processed, false).status_invariant_holds());
        assert!(!make_link(LinkStatus::Pending, true).status_invariant_holds());
    }
}
