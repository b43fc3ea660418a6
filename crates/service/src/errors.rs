use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;

use models::errors::ModelError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("{resource_id} is already booked on {date} from {} to {}", .start.format("%H:%M"), .end.format("%H:%M"))]
    SchedulingConflict {
        resource_id: String,
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
    },
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("storage error: {0}")]
    Storage(String),
}

impl From<ModelError> for ServiceError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::Validation(m) => Self::Validation(m),
            ModelError::Db(m) => Self::Storage(m),
        }
    }
}

impl ServiceError {
    pub fn storage(e: impl std::fmt::Display) -> Self { Self::Storage(e.to_string()) }

    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            ServiceError::Validation(_) => 2001,
            ServiceError::SchedulingConflict { .. } => 2002,
            ServiceError::Forbidden(_) => 2003,
            ServiceError::Storage(_) => 2100,
        }
    }
}
