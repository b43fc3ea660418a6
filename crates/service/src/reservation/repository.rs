use async_trait::async_trait;
use chrono::NaiveDate;
use configs::DailyLimit;
use uuid::Uuid;

use super::domain::{CreatedReservation, NewReservation, Reservation, TimeSlot};
use crate::errors::ServiceError;

/// Repository abstraction for reservation persistence.
#[async_trait]
pub trait ReservationRepository: Send + Sync {
    /// Ordered by `(date, start_time, id)`; `from` keeps only dates on/after it.
    async fn list(&self, from: Option<NaiveDate>) -> Result<Vec<Reservation>, ServiceError>;
    async fn find_overlapping(&self, resource_id: &str, slot: &TimeSlot) -> Result<Option<Reservation>, ServiceError>;

    /// Overlap check (or same-day replacement under `DailyLimit::One`) and insert
    /// as a single unit of work.
    async fn insert_checked(&self, new: &NewReservation, limit: DailyLimit) -> Result<CreatedReservation, ServiceError>;

    async fn delete_by_owner(&self, resource_id: &str, owner: &str) -> Result<u64, ServiceError>;
    async fn delete_by_token(&self, token: Uuid) -> Result<u64, ServiceError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use chrono::Utc;
    use std::sync::{Mutex, MutexGuard};

    #[derive(Default)]
    struct Rows {
        next_id: i32,
        items: Vec<(Reservation, Uuid)>,
    }

    #[derive(Default)]
    pub struct InMemoryReservationRepository {
        rows: Mutex<Rows>,
    }

    impl InMemoryReservationRepository {
        fn rows(&self) -> MutexGuard<'_, Rows> {
            // 中毒的锁仍然可用，数据只是内存里的测试数据
            self.rows.lock().unwrap_or_else(|e| e.into_inner())
        }
    }

    #[async_trait]
    impl ReservationRepository for InMemoryReservationRepository {
        async fn list(&self, from: Option<NaiveDate>) -> Result<Vec<Reservation>, ServiceError> {
            let rows = self.rows();
            let mut out: Vec<Reservation> = rows
                .items
                .iter()
                .map(|(r, _)| r.clone())
                .filter(|r| from.map_or(true, |d| r.date >= d))
                .collect();
            out.sort_by(|a, b| (a.date, a.start_time, a.id).cmp(&(b.date, b.start_time, b.id)));
            Ok(out)
        }

        async fn find_overlapping(&self, resource_id: &str, slot: &TimeSlot) -> Result<Option<Reservation>, ServiceError> {
            let rows = self.rows();
            Ok(rows
                .items
                .iter()
                .map(|(r, _)| r)
                .filter(|r| r.resource_id == resource_id && r.slot().overlaps(slot))
                .min_by_key(|r| r.start_time)
                .cloned())
        }

        async fn insert_checked(&self, new: &NewReservation, limit: DailyLimit) -> Result<CreatedReservation, ServiceError> {
            let mut rows = self.rows();
            let replaced = match limit {
                DailyLimit::One => {
                    let before = rows.items.len();
                    rows.items.retain(|(r, _)| !(r.resource_id == new.resource_id && r.date == new.slot.date));
                    (before - rows.items.len()) as u64
                }
                DailyLimit::Unbounded => {
                    if let Some((existing, _)) = rows
                        .items
                        .iter()
                        .find(|(r, _)| r.resource_id == new.resource_id && r.slot().overlaps(&new.slot))
                    {
                        return Err(ServiceError::conflict_with(existing));
                    }
                    0
                }
            };

            rows.next_id += 1;
            let reservation = Reservation {
                id: rows.next_id,
                resource_id: new.resource_id.clone(),
                owner: new.owner.clone(),
                date: new.slot.date,
                start_time: new.slot.start,
                end_time: new.slot.end,
                created_at: Utc::now(),
            };
            let token = Uuid::new_v4();
            rows.items.push((reservation.clone(), token));
            Ok(CreatedReservation { reservation, release_token: token, replaced })
        }

        async fn delete_by_owner(&self, resource_id: &str, owner: &str) -> Result<u64, ServiceError> {
            let mut rows = self.rows();
            let before = rows.items.len();
            rows.items.retain(|(r, _)| !(r.resource_id == resource_id && r.owner == owner));
            Ok((before - rows.items.len()) as u64)
        }

        async fn delete_by_token(&self, token: Uuid) -> Result<u64, ServiceError> {
            let mut rows = self.rows();
            let before = rows.items.len();
            rows.items.retain(|(_, t)| *t != token);
            Ok((before - rows.items.len()) as u64)
        }
    }
}
