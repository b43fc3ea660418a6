use sea_orm::{entity::prelude::*, ConnectionTrait, QueryOrder, Set};
use chrono::{NaiveDate, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::errors;

pub const MAX_RESOURCE_LEN: usize = 64;
pub const MAX_OWNER_LEN: usize = 128;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reservation")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub resource_id: String,
    pub owner: String,
    pub date: Date,
    pub start_time: Time,
    pub end_time: Time,
    pub release_token: Uuid,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Trim a required text field and enforce its column length.
pub fn validate_required(field: &str, value: &str, max_len: usize) -> Result<String, errors::ModelError> {
    let v = value.trim();
    if v.is_empty() {
        return Err(errors::ModelError::Validation(format!("{field} is required")));
    }
    if v.chars().count() > max_len {
        return Err(errors::ModelError::Validation(format!("{field} must be at most {max_len} characters")));
    }
    Ok(v.to_string())
}

/// ISO 8601 calendar date (`YYYY-MM-DD`).
pub fn parse_date(value: &str) -> Result<NaiveDate, errors::ModelError> {
    let v = value.trim();
    if v.is_empty() {
        return Err(errors::ModelError::Validation("date is required".into()));
    }
    NaiveDate::parse_from_str(v, "%Y-%m-%d")
        .map_err(|_| errors::ModelError::Validation(format!("date must be YYYY-MM-DD, got {v:?}")))
}

/// Time of day as `HH:MM`. `HH:MM:00` is accepted too; times are minute
/// precision, so any other seconds value is rejected.
pub fn parse_time(field: &str, value: &str) -> Result<NaiveTime, errors::ModelError> {
    let v = value.trim();
    if v.is_empty() {
        return Err(errors::ModelError::Validation(format!("{field} is required")));
    }
    let t = NaiveTime::parse_from_str(v, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(v, "%H:%M:%S"))
        .map_err(|_| errors::ModelError::Validation(format!("{field} must be HH:MM, got {v:?}")))?;
    if t.second() != 0 || t.nanosecond() != 0 {
        return Err(errors::ModelError::Validation(format!("{field} must be whole minutes (HH:MM), got {v:?}")));
    }
    Ok(t)
}

pub fn validate_interval(start: NaiveTime, end: NaiveTime) -> Result<(), errors::ModelError> {
    if start >= end {
        return Err(errors::ModelError::Validation("start_time must be before end_time".into()));
    }
    Ok(())
}

/// Half-open `[start, end)` overlap: touching bounds do not overlap.
pub fn overlaps(a_start: NaiveTime, a_end: NaiveTime, b_start: NaiveTime, b_end: NaiveTime) -> bool {
    !(a_end <= b_start || a_start >= b_end)
}

/// All reservations ordered by day, then start time. `from` drops earlier days.
pub async fn list_ordered<C: ConnectionTrait>(db: &C, from: Option<NaiveDate>) -> Result<Vec<Model>, errors::ModelError> {
    let mut q = Entity::find();
    if let Some(day) = from {
        q = q.filter(Column::Date.gte(day));
    }
    q.order_by_asc(Column::Date)
        .order_by_asc(Column::StartTime)
        .order_by_asc(Column::Id)
        .all(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}

/// First stored reservation on `(resource_id, date)` whose interval overlaps `[start, end)`.
pub async fn find_overlapping<C: ConnectionTrait>(
    db: &C,
    resource_id: &str,
    date: NaiveDate,
    start: NaiveTime,
    end: NaiveTime,
) -> Result<Option<Model>, errors::ModelError> {
    // existing.start < new.end AND new.start < existing.end
    Entity::find()
        .filter(Column::ResourceId.eq(resource_id))
        .filter(Column::Date.eq(date))
        .filter(Column::StartTime.lt(end))
        .filter(Column::EndTime.gt(start))
        .order_by_asc(Column::StartTime)
        .one(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}

pub async fn insert<C: ConnectionTrait>(
    db: &C,
    resource_id: &str,
    owner: &str,
    date: NaiveDate,
    start: NaiveTime,
    end: NaiveTime,
) -> Result<Model, errors::ModelError> {
    let resource_id = validate_required("resource_id", resource_id, MAX_RESOURCE_LEN)?;
    let owner = validate_required("owner", owner, MAX_OWNER_LEN)?;
    validate_interval(start, end)?;

    let am = ActiveModel {
        resource_id: Set(resource_id),
        owner: Set(owner),
        date: Set(date),
        start_time: Set(start),
        end_time: Set(end),
        release_token: Set(Uuid::new_v4()),
        created_at: Set(Utc::now().into()),
        ..Default::default()
    };
    am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}

/// Remove every reservation a resource holds on one day.
pub async fn delete_for_day<C: ConnectionTrait>(db: &C, resource_id: &str, date: NaiveDate) -> Result<u64, errors::ModelError> {
    let res = Entity::delete_many()
        .filter(Column::ResourceId.eq(resource_id))
        .filter(Column::Date.eq(date))
        .exec(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))?;
    Ok(res.rows_affected)
}

/// Remove every reservation of `owner` on `resource_id`, whatever the date.
pub async fn delete_by_owner<C: ConnectionTrait>(db: &C, resource_id: &str, owner: &str) -> Result<u64, errors::ModelError> {
    let res = Entity::delete_many()
        .filter(Column::ResourceId.eq(resource_id))
        .filter(Column::Owner.eq(owner))
        .exec(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))?;
    Ok(res.rows_affected)
}

pub async fn delete_by_release_token<C: ConnectionTrait>(db: &C, token: Uuid) -> Result<u64, errors::ModelError> {
    let res = Entity::delete_many()
        .filter(Column::ReleaseToken.eq(token))
        .exec(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))?;
    Ok(res.rows_affected)
}
