use chrono::NaiveDate;
use configs::DailyLimit;
use sea_orm::{
    ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbBackend, IsolationLevel, TransactionTrait,
};
use tracing::debug;
use uuid::Uuid;

use models::reservation as rows;

use crate::errors::ServiceError;
use crate::reservation::domain::{CreatedReservation, NewReservation, Reservation, TimeSlot};
use crate::reservation::repository::ReservationRepository;

pub struct SeaOrmReservationRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmReservationRepository {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }

    /// Postgres runs the check+insert as SERIALIZABLE so separate processes
    /// sharing the database cannot both pass the overlap check.
    /// SQLite serializes writers on its own.
    async fn begin_checked(&self) -> Result<DatabaseTransaction, ServiceError> {
        let isolation = match self.db.get_database_backend() {
            DbBackend::Postgres | DbBackend::MySql => Some(IsolationLevel::Serializable),
            _ => None,
        };
        self.db.begin_with_config(isolation, None).await.map_err(ServiceError::storage)
    }
}

#[async_trait::async_trait]
impl ReservationRepository for SeaOrmReservationRepository {
    async fn list(&self, from: Option<NaiveDate>) -> Result<Vec<Reservation>, ServiceError> {
        let items = rows::list_ordered(&self.db, from).await?;
        Ok(items.into_iter().map(Reservation::from).collect())
    }

    async fn find_overlapping(&self, resource_id: &str, slot: &TimeSlot) -> Result<Option<Reservation>, ServiceError> {
        let found = rows::find_overlapping(&self.db, resource_id, slot.date, slot.start, slot.end).await?;
        Ok(found.map(Reservation::from))
    }

    async fn insert_checked(&self, new: &NewReservation, limit: DailyLimit) -> Result<CreatedReservation, ServiceError> {
        let txn = self.begin_checked().await?;
        let slot = &new.slot;

        let replaced = match limit {
            DailyLimit::One => rows::delete_for_day(&txn, &new.resource_id, slot.date).await?,
            DailyLimit::Unbounded => {
                if let Some(existing) =
                    rows::find_overlapping(&txn, &new.resource_id, slot.date, slot.start, slot.end).await?
                {
                    txn.rollback().await.map_err(ServiceError::storage)?;
                    return Err(ServiceError::conflict_with(&Reservation::from(existing)));
                }
                0
            }
        };

        let created = rows::insert(&txn, &new.resource_id, &new.owner, slot.date, slot.start, slot.end).await?;
        txn.commit().await.map_err(ServiceError::storage)?;
        debug!(id = created.id, replaced, "reservation row committed");

        let release_token = created.release_token;
        Ok(CreatedReservation { reservation: Reservation::from(created), release_token, replaced })
    }

    async fn delete_by_owner(&self, resource_id: &str, owner: &str) -> Result<u64, ServiceError> {
        Ok(rows::delete_by_owner(&self.db, resource_id, owner).await?)
    }

    async fn delete_by_token(&self, token: Uuid) -> Result<u64, ServiceError> {
        Ok(rows::delete_by_release_token(&self.db, token).await?)
    }
}
