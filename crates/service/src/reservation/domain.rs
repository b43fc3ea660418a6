use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use models::reservation::{self as rows, MAX_OWNER_LEN, MAX_RESOURCE_LEN};

use crate::errors::ServiceError;

/// Raw booking request as it arrives from the form or JSON body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateReservationInput {
    pub resource_id: String,
    pub owner: String,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
}

/// Half-open `[start, end)` interval on one calendar day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub date: NaiveDate,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeSlot {
    pub fn new(date: NaiveDate, start: NaiveTime, end: NaiveTime) -> Result<Self, ServiceError> {
        rows::validate_interval(start, end)?;
        Ok(Self { date, start, end })
    }

    pub fn parse(date: &str, start_time: &str, end_time: &str) -> Result<Self, ServiceError> {
        let date = rows::parse_date(date)?;
        let start = rows::parse_time("start_time", start_time)?;
        let end = rows::parse_time("end_time", end_time)?;
        Self::new(date, start, end)
    }

    pub fn overlaps(&self, other: &TimeSlot) -> bool {
        self.date == other.date && rows::overlaps(self.start, self.end, other.start, other.end)
    }
}

/// Validated booking, ready to be stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReservation {
    pub resource_id: String,
    pub owner: String,
    pub slot: TimeSlot,
}

impl TryFrom<CreateReservationInput> for NewReservation {
    type Error = ServiceError;

    fn try_from(input: CreateReservationInput) -> Result<Self, Self::Error> {
        let resource_id = rows::validate_required("resource_id", &input.resource_id, MAX_RESOURCE_LEN)?;
        let owner = rows::validate_required("owner", &input.owner, MAX_OWNER_LEN)?;
        let slot = TimeSlot::parse(&input.date, &input.start_time, &input.end_time)?;
        Ok(Self { resource_id, owner, slot })
    }
}

/// Stored reservation (business view, without the release token)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: i32,
    pub resource_id: String,
    pub owner: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub created_at: DateTime<Utc>,
}

impl Reservation {
    pub fn slot(&self) -> TimeSlot {
        TimeSlot { date: self.date, start: self.start_time, end: self.end_time }
    }
}

impl From<rows::Model> for Reservation {
    fn from(m: rows::Model) -> Self {
        Self {
            id: m.id,
            resource_id: m.resource_id,
            owner: m.owner,
            date: m.date,
            start_time: m.start_time,
            end_time: m.end_time,
            created_at: m.created_at.with_timezone(&Utc),
        }
    }
}

/// Result of a successful booking. The token is only ever handed to the creator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedReservation {
    pub reservation: Reservation,
    pub release_token: Uuid,
    /// Reservations displaced under a one-per-day limit
    pub replaced: u64,
}

impl ServiceError {
    pub fn conflict_with(existing: &Reservation) -> Self {
        Self::SchedulingConflict {
            resource_id: existing.resource_id.clone(),
            date: existing.date,
            start: existing.start_time,
            end: existing.end_time,
        }
    }
}
