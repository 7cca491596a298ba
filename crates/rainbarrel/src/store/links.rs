//! Link upserts and reads.

use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};

use crate::entity::link::{self, Entity as Link};
use crate::entity::link_collection::{self, Entity as LinkCollection};
use crate::entity::link_status::LinkStatus;
use crate::entity::tag_suggestion::{self, Entity as TagSuggestion};
use crate::entity::{collection, prelude::Collection};

use super::errors::{Result, StoreError};

/// A link together with its fully materialized associations.
#[derive(Debug, Clone)]
pub struct LinkDetail {
    pub link: link::Model,
    pub collections: Vec<collection::Model>,
    /// Sorted by descending confidence.
    pub tags: Vec<tag_suggestion::Model>,
}

fn required_value<T: Clone>(field: &str, value: &ActiveValue<T>) -> Result<T>
where
    T: Into<sea_orm::Value>,
{
    match value {
        ActiveValue::Set(v) | ActiveValue::Unchanged(v) => Ok(v.clone()),
        ActiveValue::NotSet => Err(StoreError::invalid_input(format!(
            "Missing required field: {field}"
        ))),
    }
}

fn optional_value<T: Clone>(value: &ActiveValue<Option<T>>) -> Option<T>
where
    Option<T>: Into<sea_orm::Value>,
{
    match value {
        ActiveValue::Set(v) | ActiveValue::Unchanged(v) => v.clone(),
        ActiveValue::NotSet => None,
    }
}

/// Insert or update a link, replacing its collection memberships and tag
/// suggestions wholesale.
///
/// The whole write runs in one transaction: a link is never persisted without
/// its associations. On update, the immutable `raindrop_id` and the original
/// `created_at` are preserved. Rejects records that violate the
/// processed-timestamp invariant.
pub async fn upsert(
    db: &DatabaseConnection,
    mut record: link::ActiveModel,
    collection_ids: &[i64],
    tags: Vec<tag_suggestion::ActiveModel>,
) -> Result<link::Model> {
    let raindrop_id = required_value("raindrop_id", &record.raindrop_id)?;

    let status = match &record.status {
        ActiveValue::Set(s) | ActiveValue::Unchanged(s) => *s,
        ActiveValue::NotSet => LinkStatus::default(),
    };
    let processed_at = optional_value(&record.processed_at);
    if (status == LinkStatus::Processed) != processed_at.is_some() {
        return Err(StoreError::invalid_input(format!(
            "link {raindrop_id}: processed_at must be set exactly when status is processed"
        )));
    }

    let txn = db.begin().await?;

    let existing = Link::find_by_id(raindrop_id).one(&txn).await?;
    let saved = match existing {
        Some(existing) => {
            // Original creation timestamp survives every subsequent sync.
            record.created_at = Set(existing.created_at);
            record.raindrop_id = ActiveValue::Unchanged(raindrop_id);
            record.update(&txn).await?
        }
        None => record.insert(&txn).await?,
    };

    replace_memberships(&txn, raindrop_id, collection_ids).await?;
    replace_tags(&txn, raindrop_id, tags).await?;

    txn.commit().await?;
    Ok(saved)
}

async fn replace_memberships<C: ConnectionTrait>(
    conn: &C,
    raindrop_id: i64,
    collection_ids: &[i64],
) -> Result<()> {
    LinkCollection::delete_many()
        .filter(link_collection::Column::LinkId.eq(raindrop_id))
        .exec(conn)
        .await?;

    if !collection_ids.is_empty() {
        let rows: Vec<link_collection::ActiveModel> = collection_ids
            .iter()
            .map(|cid| link_collection::ActiveModel {
                link_id: Set(raindrop_id),
                collection_id: Set(*cid),
            })
            .collect();
        LinkCollection::insert_many(rows)
            .exec_without_returning(conn)
            .await?;
    }

    Ok(())
}

async fn replace_tags<C: ConnectionTrait>(
    conn: &C,
    raindrop_id: i64,
    tags: Vec<tag_suggestion::ActiveModel>,
) -> Result<()> {
    TagSuggestion::delete_many()
        .filter(tag_suggestion::Column::LinkId.eq(raindrop_id))
        .exec(conn)
        .await?;

    if !tags.is_empty() {
        let rows: Vec<tag_suggestion::ActiveModel> = tags
            .into_iter()
            .map(|mut tag| {
                tag.id = ActiveValue::NotSet;
                tag.link_id = Set(raindrop_id);
                tag
            })
            .collect();
        TagSuggestion::insert_many(rows)
            .exec_without_returning(conn)
            .await?;
    }

    Ok(())
}

/// Find a link by its remote identifier.
pub async fn get(db: &DatabaseConnection, raindrop_id: i64) -> Result<Option<link::Model>> {
    Link::find_by_id(raindrop_id)
        .one(db)
        .await
        .map_err(StoreError::from)
}

/// Find a link with its collections and tags fully materialized.
pub async fn get_detail(db: &DatabaseConnection, raindrop_id: i64) -> Result<Option<LinkDetail>> {
    let Some(link) = get(db, raindrop_id).await? else {
        return Ok(None);
    };
    Ok(Some(load_detail(db, link).await?))
}

async fn load_detail(db: &DatabaseConnection, link: link::Model) -> Result<LinkDetail> {
    use sea_orm::ModelTrait;

    let collections = link.find_related(Collection).all(db).await?;
    let tags = link
        .find_related(TagSuggestion)
        .order_by_desc(tag_suggestion::Column::Confidence)
        .all(db)
        .await?;

    Ok(LinkDetail {
        link,
        collections,
        tags,
    })
}

/// List every stored link, ordered by remote identifier.
pub async fn list_all(db: &DatabaseConnection) -> Result<Vec<link::Model>> {
    Link::find()
        .order_by_asc(link::Column::RaindropId)
        .all(db)
        .await
        .map_err(StoreError::from)
}

/// List every stored link with associations materialized, ordered by id.
pub async fn list_all_details(db: &DatabaseConnection) -> Result<Vec<LinkDetail>> {
    let links = list_all(db).await?;
    let mut details = Vec::with_capacity(links.len());
    for link in links {
        details.push(load_detail(db, link).await?);
    }
    Ok(details)
}

/// List links still awaiting enrichment.
pub async fn list_pending(db: &DatabaseConnection) -> Result<Vec<link::Model>> {
    Link::find()
        .filter(link::Column::Status.eq(LinkStatus::Pending))
        .order_by_asc(link::Column::RaindropId)
        .all(db)
        .await
        .map_err(StoreError::from)
}

/// Count stored links.
pub async fn count(db: &DatabaseConnection) -> Result<u64> {
    use sea_orm::PaginatorTrait;

    Link::find().count(db).await.map_err(StoreError::from)
}
