//! Sync run audit records.

use sea_orm::{
    ActiveModelTrait, ActiveValue, DatabaseConnection, EntityTrait, QueryOrder, QuerySelect,
};
use uuid::Uuid;

use crate::entity::sync_run::{self, Entity as SyncRun};

use super::errors::{Result, StoreError};

/// Record a sync run, keyed by run id.
///
/// A retried write with the same run id overwrites the existing row instead
/// of duplicating it.
pub async fn record(
    db: &DatabaseConnection,
    mut run: sync_run::ActiveModel,
) -> Result<sync_run::Model> {
    let run_id: Uuid = match &run.run_id {
        ActiveValue::Set(v) | ActiveValue::Unchanged(v) => *v,
        ActiveValue::NotSet => {
            return Err(StoreError::invalid_input("Missing required field: run_id"));
        }
    };

    let existing = SyncRun::find_by_id(run_id).one(db).await?;
    match existing {
        Some(_) => {
            run.run_id = ActiveValue::Unchanged(run_id);
            run.update(db).await.map_err(StoreError::from)
        }
        None => run.insert(db).await.map_err(StoreError::from),
    }
}

/// List recent sync runs, newest first.
pub async fn list(db: &DatabaseConnection, limit: u64) -> Result<Vec<sync_run::Model>> {
    SyncRun::find()
        .order_by_desc(sync_run::Column::StartedAt)
        .limit(limit)
        .all(db)
        .await
        .map_err(StoreError::from)
}
