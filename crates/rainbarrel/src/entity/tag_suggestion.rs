//! Tag suggestion entity - a (link, tag) association with confidence.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::entity::tag_source::TagSource;

/// A single suggested tag for a link.
///
/// The full suggestion set for a link is replaced, not appended, whenever the
/// link is re-tagged.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tag_suggestions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Owning link (raindrop id).
    pub link_id: i64,
    /// Tag text.
    pub tag: String,
    /// Confidence in [0, 1].
    pub confidence: f64,
    /// Which capability produced the suggestion.
    pub source: TagSource,
    /// When the suggestion was produced.
    pub suggested_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::link::Entity",
        from = "Column::LinkId",
        to = "super::link::Column::RaindropId"
    )]
    Link,
}

impl Related<super::link::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Link.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
