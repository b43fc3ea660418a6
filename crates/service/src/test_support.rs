//! Shared helpers for service tests.

use std::sync::Arc;

use models::db::{connect_and_migrate, DatabaseConfig};
use sea_orm::DatabaseConnection;

use crate::reservation::repo::SeaOrmReservationRepository;
use crate::reservation::{BookingPolicy, ReservationStore};

/// Fresh migrated in-memory SQLite database.
pub async fn memory_db() -> anyhow::Result<DatabaseConnection> {
    let cfg = DatabaseConfig { url: "sqlite::memory:".into(), ..DatabaseConfig::from(&configs::DatabaseConfig::default()) };
    connect_and_migrate(&cfg).await
}

pub async fn sea_orm_store(policy: BookingPolicy) -> anyhow::Result<ReservationStore<SeaOrmReservationRepository>> {
    let db = memory_db().await?;
    Ok(ReservationStore::new(Arc::new(SeaOrmReservationRepository::new(db)), policy))
}
