//! Create `reservation` table.
//! One row per booked interval of a computer on a given day.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Reservation::Table)
                    .if_not_exists()
                    .col(pk_auto(Reservation::Id))
                    .col(string_len(Reservation::ResourceId, 64).not_null())
                    .col(string_len(Reservation::Owner, 128).not_null())
                    .col(date(Reservation::Date).not_null())
                    .col(time(Reservation::StartTime).not_null())
                    .col(time(Reservation::EndTime).not_null())
                    .col(uuid(Reservation::ReleaseToken).not_null())
                    .col(timestamp_with_time_zone(Reservation::CreatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Reservation::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
pub(crate) enum Reservation {
    Table,
    Id,
    ResourceId,
    Owner,
    Date,
    StartTime,
    EndTime,
    ReleaseToken,
    CreatedAt,
}
