//! Origin of a tag suggestion.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Which capability produced a tag suggestion.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum TagSource {
    /// Generated by a language model.
    #[sea_orm(string_value = "llm")]
    #[default]
    Llm,
    /// Derived from page or bookmark metadata.
    #[sea_orm(string_value = "metadata")]
    Metadata,
}

impl std::fmt::Display for TagSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TagSource::Llm => write!(f, "llm"),
            TagSource::Metadata => write!(f, "metadata"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_outputs_expected_strings() {
        assert_eq!(TagSource::Llm.to_string(), "llm");
        assert_eq!(TagSource::Metadata.to_string(), "metadata");
    }
}
