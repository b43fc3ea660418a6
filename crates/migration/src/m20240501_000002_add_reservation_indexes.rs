use sea_orm_migration::prelude::*;

use crate::m20240501_000001_create_reservation::Reservation;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Conflict checks scan one (resource, day) partition
        manager
            .create_index(
                Index::create()
                    .name("idx_reservation_resource_date")
                    .table(Reservation::Table)
                    .col(Reservation::ResourceId)
                    .col(Reservation::Date)
                    .col(Reservation::StartTime)
                    .to_owned(),
            )
            .await?;

        // Release by (resource, owner)
        manager
            .create_index(
                Index::create()
                    .name("idx_reservation_resource_owner")
                    .table(Reservation::Table)
                    .col(Reservation::ResourceId)
                    .col(Reservation::Owner)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uniq_reservation_release_token")
                    .table(Reservation::Table)
                    .col(Reservation::ReleaseToken)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_reservation_resource_date").table(Reservation::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_reservation_resource_owner").table(Reservation::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("uniq_reservation_release_token").table(Reservation::Table).to_owned())
            .await
    }
}
