//! Collection upserts, reads, and cursor advancement.

use sea_orm::{
    ActiveModelTrait, ActiveValue, DatabaseConnection, EntityTrait, QueryOrder, Set,
};

use crate::entity::collection::{self, Entity as Collection};

use super::errors::{Result, StoreError};

/// Insert or update a collection observed in a remote listing.
///
/// The stored incremental cursor (`last_synced_at`) is left untouched unless
/// the caller explicitly sets it; listings refresh title/color/parent and the
/// remote `last_update` only.
pub async fn upsert(
    db: &DatabaseConnection,
    mut model: collection::ActiveModel,
) -> Result<collection::Model> {
    let id = match &model.id {
        ActiveValue::Set(v) | ActiveValue::Unchanged(v) => *v,
        ActiveValue::NotSet => {
            return Err(StoreError::invalid_input("Missing required field: id"));
        }
    };

    let existing = Collection::find_by_id(id).one(db).await?;
    match existing {
        Some(existing) => {
            if matches!(model.last_synced_at, ActiveValue::NotSet) {
                model.last_synced_at = ActiveValue::Unchanged(existing.last_synced_at);
            }
            model.id = ActiveValue::Unchanged(id);
            model.update(db).await.map_err(StoreError::from)
        }
        None => model.insert(db).await.map_err(StoreError::from),
    }
}

/// Find a collection by id.
pub async fn get(db: &DatabaseConnection, id: i64) -> Result<Option<collection::Model>> {
    Collection::find_by_id(id)
        .one(db)
        .await
        .map_err(StoreError::from)
}

/// List all known collections ordered by id.
pub async fn list(db: &DatabaseConnection) -> Result<Vec<collection::Model>> {
    Collection::find()
        .order_by_asc(collection::Column::Id)
        .all(db)
        .await
        .map_err(StoreError::from)
}

/// Advance a collection's incremental cursor.
pub async fn set_cursor(
    db: &DatabaseConnection,
    id: i64,
    cursor: chrono::DateTime<chrono::FixedOffset>,
) -> Result<()> {
    let model = collection::ActiveModel {
        id: ActiveValue::Unchanged(id),
        last_synced_at: Set(Some(cursor)),
        ..Default::default()
    };
    model.update(db).await?;
    Ok(())
}
