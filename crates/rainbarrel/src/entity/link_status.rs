//! Lifecycle status for a mirrored link.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Where a link sits in the enrichment lifecycle.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum LinkStatus {
    /// Seen in a listing but not yet enriched.
    #[sea_orm(string_value = "pending")]
    #[default]
    Pending,
    /// Enrichment succeeded; `processed_at` is set.
    #[sea_orm(string_value = "processed")]
    Processed,
    /// Enrichment failed; needs human attention.
    #[sea_orm(string_value = "manual_review")]
    ManualReview,
}

impl std::fmt::Display for LinkStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LinkStatus::Pending => write!(f, "pending"),
            LinkStatus::Processed => write!(f, "processed"),
            LinkStatus::ManualReview => write!(f, "manual_review"),
        }
    }
}
