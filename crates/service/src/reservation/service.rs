use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use configs::{BookingConfig, DailyLimit};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use models::reservation::{validate_required, MAX_OWNER_LEN, MAX_RESOURCE_LEN};

use super::domain::{CreateReservationInput, CreatedReservation, NewReservation, Reservation, TimeSlot};
use super::locks::SlotLocks;
use super::repository::ReservationRepository;
use crate::errors::ServiceError;

/// Scheduling rules applied by the store
#[derive(Debug, Clone, Copy)]
pub struct BookingPolicy {
    pub daily_limit: DailyLimit,
    pub allow_owner_release: bool,
}

impl Default for BookingPolicy {
    fn default() -> Self { Self { daily_limit: DailyLimit::Unbounded, allow_owner_release: true } }
}

impl From<&BookingConfig> for BookingPolicy {
    fn from(c: &BookingConfig) -> Self {
        Self { daily_limit: c.max_reservations_per_resource_per_day, allow_owner_release: c.allow_owner_release }
    }
}

/// Reservation store independent of web framework
pub struct ReservationStore<R: ReservationRepository + ?Sized> {
    repo: Arc<R>,
    policy: BookingPolicy,
    locks: SlotLocks,
}

impl<R: ReservationRepository + ?Sized> ReservationStore<R> {
    pub fn new(repo: Arc<R>, policy: BookingPolicy) -> Self {
        Self { repo, policy, locks: SlotLocks::new() }
    }

    pub fn policy(&self) -> BookingPolicy { self.policy }

    /// Every reservation, ordered by date then start time.
    pub async fn list_all(&self) -> Result<Vec<Reservation>, ServiceError> {
        self.repo.list(None).await
    }

    /// Reservations on or after `from`, same ordering as [`Self::list_all`].
    pub async fn list_from(&self, from: NaiveDate) -> Result<Vec<Reservation>, ServiceError> {
        self.repo.list(Some(from)).await
    }

    /// Whether `[start, end)` on `date` overlaps an existing booking of `resource_id`.
    /// Touching boundaries do not count.
    #[instrument(skip(self))]
    pub async fn has_conflict(
        &self,
        resource_id: &str,
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
    ) -> Result<bool, ServiceError> {
        let resource_id = validate_required("resource_id", resource_id, MAX_RESOURCE_LEN)?;
        let slot = TimeSlot::new(date, start, end)?;
        Ok(self.repo.find_overlapping(&resource_id, &slot).await?.is_some())
    }

    /// Validate and store a booking.
    ///
    /// # Examples
    /// ```
    /// use service::reservation::{ReservationStore, BookingPolicy, CreateReservationInput};
    /// use service::reservation::repository::mock::InMemoryReservationRepository;
    /// use std::sync::Arc;
    /// let store = ReservationStore::new(Arc::new(InMemoryReservationRepository::default()), BookingPolicy::default());
    /// let input = CreateReservationInput {
    ///     resource_id: "Jabalí".into(), owner: "ana".into(), date: "2024-05-01".into(),
    ///     start_time: "09:00".into(), end_time: "10:00".into(),
    /// };
    /// let created = tokio_test::block_on(store.create(input)).unwrap();
    /// assert_eq!(created.reservation.owner, "ana");
    /// ```
    #[instrument(skip(self, input), fields(resource_id = %input.resource_id, date = %input.date))]
    pub async fn create(&self, input: CreateReservationInput) -> Result<CreatedReservation, ServiceError> {
        let new = NewReservation::try_from(input)?;

        // check + insert 必须在同一把锁下完成
        let _guard = self.locks.acquire(&new.resource_id, new.slot.date).await;
        match self.repo.insert_checked(&new, self.policy.daily_limit).await {
            Ok(created) => {
                info!(
                    event = "reservation_created",
                    id = created.reservation.id,
                    owner = %created.reservation.owner,
                    start = %new.slot.start,
                    end = %new.slot.end,
                    replaced = created.replaced,
                );
                Ok(created)
            }
            Err(e @ ServiceError::SchedulingConflict { .. }) => {
                info!(event = "reservation_conflict", code = e.code(), "{e}");
                Err(e)
            }
            Err(e) => {
                warn!(event = "reservation_failed", code = e.code(), error = %e);
                Err(e)
            }
        }
    }

    /// Delete every reservation `owner` holds on `resource_id`, any date.
    #[instrument(skip(self))]
    pub async fn release(&self, resource_id: &str, owner: &str) -> Result<u64, ServiceError> {
        if !self.policy.allow_owner_release {
            return Err(ServiceError::Forbidden("owner release is disabled, use the release token".into()));
        }
        let resource_id = validate_required("resource_id", resource_id, MAX_RESOURCE_LEN)?;
        let owner = validate_required("owner", owner, MAX_OWNER_LEN)?;
        let released = self.repo.delete_by_owner(&resource_id, &owner).await?;
        info!(event = "reservation_released", released);
        Ok(released)
    }

    #[instrument(skip(self))]
    pub async fn release_by_token(&self, token: Uuid) -> Result<u64, ServiceError> {
        let released = self.repo.delete_by_token(token).await?;
        info!(event = "reservation_released", released);
        Ok(released)
    }
}
