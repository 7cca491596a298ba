//! Initial migration to create the rainbarrel database schema.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        self.create_links(manager).await?;
        self.create_collections(manager).await?;
        self.create_link_collections(manager).await?;
        self.create_tag_suggestions(manager).await?;
        self.create_sync_runs(manager).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SyncRuns::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TagSuggestions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(LinkCollections::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Collections::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Links::Table).to_owned())
            .await?;
        Ok(())
    }
}

impl Migration {
    async fn create_links(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Links::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Links::RaindropId)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    // Content
                    .col(ColumnDef::new(Links::Url).text().not_null())
                    .col(ColumnDef::new(Links::Title).string().not_null())
                    .col(ColumnDef::new(Links::Description).text().null())
                    // Timestamps
                    .col(
                        ColumnDef::new(Links::CreatedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Links::UpdatedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Links::ProcessedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    // Enrichment
                    .col(ColumnDef::new(Links::ContentHash).string().null())
                    .col(
                        ColumnDef::new(Links::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(Links::LlmVersion).string().null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_links_status")
                    .table(Links::Table)
                    .col(Links::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_links_updated_at")
                    .table(Links::Table)
                    .col(Links::UpdatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn create_collections(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Collections::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Collections::Id)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Collections::Title).string().not_null())
                    .col(ColumnDef::new(Collections::Color).string().null())
                    .col(ColumnDef::new(Collections::ParentId).big_integer().null())
                    .col(
                        ColumnDef::new(Collections::LastUpdate)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Collections::LastSyncedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn create_link_collections(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(LinkCollections::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LinkCollections::LinkId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LinkCollections::CollectionId)
                            .big_integer()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(LinkCollections::LinkId)
                            .col(LinkCollections::CollectionId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_link_collections_link")
                            .from(LinkCollections::Table, LinkCollections::LinkId)
                            .to(Links::Table, Links::RaindropId),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_link_collections_collection")
                    .table(LinkCollections::Table)
                    .col(LinkCollections::CollectionId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn create_tag_suggestions(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TagSuggestions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TagSuggestions::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(TagSuggestions::LinkId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(TagSuggestions::Tag).string().not_null())
                    .col(
                        ColumnDef::new(TagSuggestions::Confidence)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(TagSuggestions::Source)
                            .string()
                            .not_null()
                            .default("llm"),
                    )
                    .col(
                        ColumnDef::new(TagSuggestions::SuggestedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tag_suggestions_link")
                            .from(TagSuggestions::Table, TagSuggestions::LinkId)
                            .to(Links::Table, Links::RaindropId),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_tag_suggestions_link")
                    .table(TagSuggestions::Table)
                    .col(TagSuggestions::LinkId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn create_sync_runs(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SyncRuns::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(SyncRuns::RunId).uuid().not_null().primary_key())
                    .col(ColumnDef::new(SyncRuns::Mode).string().not_null())
                    .col(
                        ColumnDef::new(SyncRuns::StartedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SyncRuns::CompletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(SyncRuns::Processed)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(SyncRuns::Skipped)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(SyncRuns::ManualReview)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(SyncRuns::Failures)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(SyncRuns::RateLimitLimit)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(SyncRuns::RateLimitRemaining)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(SyncRuns::RateLimitReset)
                            .big_integer()
                            .null(),
                    )
                    .col(ColumnDef::new(SyncRuns::ExportPath).text().null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_sync_runs_started")
                    .table(SyncRuns::Table)
                    .col(SyncRuns::StartedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Links {
    Table,
    RaindropId,
    Url,
    Title,
    Description,
    CreatedAt,
    UpdatedAt,
    ProcessedAt,
    ContentHash,
    Status,
    LlmVersion,
}

#[derive(DeriveIden)]
enum Collections {
    Table,
    Id,
    Title,
    Color,
    ParentId,
    LastUpdate,
    LastSyncedAt,
}

#[derive(DeriveIden)]
enum LinkCollections {
    Table,
    LinkId,
    CollectionId,
}

#[derive(DeriveIden)]
enum TagSuggestions {
    Table,
    Id,
    LinkId,
    Tag,
    Confidence,
    Source,
    SuggestedAt,
}

#[derive(DeriveIden)]
enum SyncRuns {
    Table,
    RunId,
    Mode,
    StartedAt,
    CompletedAt,
    Processed,
    Skipped,
    ManualReview,
    Failures,
    RateLimitLimit,
    RateLimitRemaining,
    RateLimitReset,
    ExportPath,
}
