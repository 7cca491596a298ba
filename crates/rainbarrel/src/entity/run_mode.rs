//! Sync run modes.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// How a sync run selects candidates.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    /// Every remote item is a candidate.
    #[sea_orm(string_value = "full")]
    Full,
    /// Only items newer than the per-collection cursor are candidates.
    #[sea_orm(string_value = "incremental")]
    #[default]
    Incremental,
    /// A single explicitly named item is re-enriched.
    #[sea_orm(string_value = "reprocess")]
    Reprocess,
}

impl std::fmt::Display for RunMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunMode::Full => write!(f, "full"),
            RunMode::Incremental => write!(f, "incremental"),
            RunMode::Reprocess => write!(f, "reprocess"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_incremental() {
        assert_eq!(RunMode::default(), RunMode::Incremental);
    }

    #[test]
    fn display_outputs_expected_strings() {
        assert_eq!(RunMode::Full.to_string(), "full");
        assert_eq!(RunMode::Incremental.to_string(), "incremental");
        assert_eq!(RunMode::Reprocess.to_string(), "reprocess");
    }
}
