use utoipa::OpenApi;
use utoipa::ToSchema;

use crate::routes::reservations::{
    ConflictView, CreateReservationRequest, CreatedReservationView, ReleaseRequest, ReleasedView, ReservationView,
};

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::reservations::list_resources,
        crate::routes::reservations::list_reservations,
        crate::routes::reservations::check_conflict,
        crate::routes::reservations::create_reservation,
        crate::routes::reservations::release_reservations,
        crate::routes::reservations::release_by_token,
    ),
    components(
        schemas(
            HealthResponse,
            ReservationView,
            CreatedReservationView,
            CreateReservationRequest,
            ReleaseRequest,
            ConflictView,
            ReleasedView,
        )
    ),
    tags(
        (name = "health"),
        (name = "reservations")
    )
)]
pub struct ApiDoc;
