use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SpotifyCredentials::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SpotifyCredentials::Id)
                            .integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SpotifyCredentials::AccessToken).string())
                    .col(
                        ColumnDef::new(SpotifyCredentials::RefreshToken)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(SpotifyCredentials::ExpiresAt).string())
                    .col(ColumnDef::new(SpotifyCredentials::Scope).string())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SyncLog::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SyncLog::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SyncLog::SyncType).string().not_null())
                    .col(ColumnDef::new(SyncLog::StartedAt).big_integer().not_null())
                    .col(ColumnDef::new(SyncLog::CompletedAt).big_integer())
                    .col(ColumnDef::new(SyncLog::Status).string().not_null())
                    .col(ColumnDef::new(SyncLog::Error).text())
                    .col(ColumnDef::new(SyncLog::ItemsSynced).integer())
                    .col(ColumnDef::new(SyncLog::ItemsAdded).integer())
                    .col(ColumnDef::new(SyncLog::ItemsUpdated).integer())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SyncProgress::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SyncProgress::SyncLogId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(SyncProgress::Step).string().not_null())
                    .col(
                        ColumnDef::new(SyncProgress::TotalItems)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(SyncProgress::ProcessedItems)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(SyncProgress::FailedItems)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(SyncProgress::StartedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SyncProgress::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(SyncProgress::CompletedAt).big_integer())
                    .primary_key(
                        Index::create()
                            .col(SyncProgress::SyncLogId)
                            .col(SyncProgress::Step),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sync_progress_sync_log_id")
                            .from(SyncProgress::Table, SyncProgress::SyncLogId)
                            .to(SyncLog::Table, SyncLog::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_sync_log_status")
                    .table(SyncLog::Table)
                    .col(SyncLog::Status)
                    .col(SyncLog::StartedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_sync_progress_log_id")
                    .table(SyncProgress::Table)
                    .col(SyncProgress::SyncLogId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SyncProgress::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SyncLog::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SpotifyCredentials::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum SpotifyCredentials {
    Table,
    Id,
    AccessToken,
    RefreshToken,
    ExpiresAt,
    Scope,
}

#[derive(DeriveIden)]
enum SyncLog {
    Table,
    Id,
    SyncType,
    StartedAt,
    CompletedAt,
    Status,
    Error,
    ItemsSynced,
    ItemsAdded,
    ItemsUpdated,
}

#[derive(DeriveIden)]
enum SyncProgress {
    Table,
    SyncLogId,
    Step,
    TotalItems,
    ProcessedItems,
    FailedItems,
    StartedAt,
    UpdatedAt,
    CompletedAt,
}
