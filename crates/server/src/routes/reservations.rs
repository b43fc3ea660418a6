use axum::{extract::State, http::StatusCode, Json};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use models::reservation::parse_date;
use service::reservation::{CreateReservationInput, CreatedReservation, Reservation, TimeSlot};

use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::{errors::JsonApiError, state::ServerState};

fn hhmm(t: NaiveTime) -> String {
    t.format("%H:%M").to_string()
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// Only reservations on or after this date (`YYYY-MM-DD`)
    pub from: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ConflictQuery {
    pub resource_id: String,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
}

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct CreateReservationRequest {
    #[serde(default)]
    pub resource_id: String,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub start_time: String,
    #[serde(default)]
    pub end_time: String,
}

impl From<CreateReservationRequest> for CreateReservationInput {
    fn from(r: CreateReservationRequest) -> Self {
        Self { resource_id: r.resource_id, owner: r.owner, date: r.date, start_time: r.start_time, end_time: r.end_time }
    }
}

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct ReleaseRequest {
    #[serde(default)]
    pub resource_id: String,
    #[serde(default)]
    pub owner: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ReservationView {
    pub id: i32,
    pub resource_id: String,
    pub owner: String,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
}

impl From<Reservation> for ReservationView {
    fn from(r: Reservation) -> Self {
        Self {
            id: r.id,
            resource_id: r.resource_id,
            owner: r.owner,
            date: r.date.format("%Y-%m-%d").to_string(),
            start_time: hhmm(r.start_time),
            end_time: hhmm(r.end_time),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CreatedReservationView {
    pub reservation: ReservationView,
    /// Keep this to release the booking later; it is never listed
    pub release_token: Uuid,
    /// Same-day reservations displaced under a one-per-day limit
    pub replaced: u64,
}

impl From<CreatedReservation> for CreatedReservationView {
    fn from(c: CreatedReservation) -> Self {
        Self { reservation: c.reservation.into(), release_token: c.release_token, replaced: c.replaced }
    }
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ConflictView { pub conflict: bool }

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ReleasedView { pub released: u64 }

fn ensure_known_resource(state: &ServerState, resource_id: &str) -> Result<(), JsonApiError> {
    if state.booking.is_known_resource(resource_id) {
        Ok(())
    } else {
        Err(JsonApiError::bad_request(format!("unknown resource: {}", resource_id.trim())))
    }
}

#[utoipa::path(
    get, path = "/api/resources", tag = "reservations",
    responses((status = 200, description = "Bookable computers", body = [String]))
)]
pub async fn list_resources(State(state): State<ServerState>) -> Json<Vec<String>> {
    Json(state.booking.resources.clone())
}

#[utoipa::path(
    get, path = "/api/reservations", tag = "reservations",
    params(ListQuery),
    responses(
        (status = 200, description = "Reservations ordered by date and start time", body = [ReservationView]),
        (status = 400, description = "Invalid date"),
        (status = 500, description = "Storage Error")
    )
)]
pub async fn list_reservations(
    State(state): State<ServerState>,
    ApiQuery(q): ApiQuery<ListQuery>,
) -> Result<Json<Vec<ReservationView>>, JsonApiError> {
    let list = match q.from.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(from) => state.store.list_from(parse_date(from)?).await?,
        None => state.store.list_all().await?,
    };
    debug!(count = list.len(), "list reservations");
    Ok(Json(list.into_iter().map(ReservationView::from).collect()))
}

#[utoipa::path(
    get, path = "/api/reservations/conflicts", tag = "reservations",
    params(ConflictQuery),
    responses(
        (status = 200, description = "Whether the interval overlaps a booking", body = ConflictView),
        (status = 400, description = "Validation Error")
    )
)]
pub async fn check_conflict(
    State(state): State<ServerState>,
    ApiQuery(q): ApiQuery<ConflictQuery>,
) -> Result<Json<ConflictView>, JsonApiError> {
    ensure_known_resource(&state, &q.resource_id)?;
    let slot = TimeSlot::parse(&q.date, &q.start_time, &q.end_time)?;
    let conflict = state.store.has_conflict(&q.resource_id, slot.date, slot.start, slot.end).await?;
    Ok(Json(ConflictView { conflict }))
}

#[utoipa::path(
    post, path = "/api/reservations", tag = "reservations",
    request_body = CreateReservationRequest,
    responses(
        (status = 201, description = "Created", body = CreatedReservationView),
        (status = 400, description = "Validation Error"),
        (status = 409, description = "Scheduling Conflict"),
        (status = 500, description = "Storage Error")
    )
)]
pub async fn create_reservation(
    State(state): State<ServerState>,
    ApiJson(input): ApiJson<CreateReservationRequest>,
) -> Result<(StatusCode, Json<CreatedReservationView>), JsonApiError> {
    ensure_known_resource(&state, &input.resource_id)?;
    info!(resource_id = %input.resource_id, date = %input.date, start = %input.start_time, end = %input.end_time, "reservation_create_request");
    let created = state.store.create(input.into()).await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

#[utoipa::path(
    post, path = "/api/reservations/release", tag = "reservations",
    request_body = ReleaseRequest,
    responses(
        (status = 200, description = "Number of reservations removed", body = ReleasedView),
        (status = 400, description = "Validation Error"),
        (status = 403, description = "Owner release disabled"),
        (status = 500, description = "Storage Error")
    )
)]
pub async fn release_reservations(
    State(state): State<ServerState>,
    ApiJson(input): ApiJson<ReleaseRequest>,
) -> Result<Json<ReleasedView>, JsonApiError> {
    ensure_known_resource(&state, &input.resource_id)?;
    let released = state.store.release(&input.resource_id, &input.owner).await?;
    Ok(Json(ReleasedView { released }))
}

#[utoipa::path(
    delete, path = "/api/reservations/token/{token}", tag = "reservations",
    params(("token" = Uuid, Path, description = "Release token issued at creation")),
    responses(
        (status = 200, description = "Number of reservations removed (0 or 1)", body = ReleasedView),
        (status = 400, description = "Malformed token"),
        (status = 500, description = "Storage Error")
    )
)]
pub async fn release_by_token(
    State(state): State<ServerState>,
    ApiPath(token): ApiPath<Uuid>,
) -> Result<Json<ReleasedView>, JsonApiError> {
    let released = state.store.release_by_token(token).await?;
    Ok(Json(ReleasedView { released }))
}
