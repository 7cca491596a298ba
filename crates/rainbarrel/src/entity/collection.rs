//! Collection entity - a remote grouping container for links.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Collection model.
///
/// Collections form a tree through `parent_id` but the sync engine treats
/// them as a flat list.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "collections")]
pub struct Model {
    /// Remote collection identifier.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i64,
    /// Collection title.
    pub title: String,
    /// Display color, if the remote has one.
    pub color: Option<String>,
    /// Parent collection, if nested.
    pub parent_id: Option<i64>,
    /// Last-known remote update timestamp; seeds incremental cursor defaults.
    pub last_update: Option<DateTimeWithTimeZone>,
    /// Per-collection incremental cursor: newest remote `lastUpdate` observed
    /// during a completed sync of this collection.
    pub last_synced_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::link_collection::Entity")]
    LinkCollection,
}

impl Related<super::link::Entity> for Entity {
    fn to() -> RelationDef {
        super::link_collection::Relation::Link.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::link_collection::Relation::Collection.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
