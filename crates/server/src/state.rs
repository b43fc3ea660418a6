use std::sync::Arc;

use configs::BookingConfig;
use sea_orm::DatabaseConnection;
use service::reservation::repo::SeaOrmReservationRepository;
use service::reservation::repository::ReservationRepository;
use service::reservation::{BookingPolicy, ReservationStore};

pub type DynReservationStore = ReservationStore<dyn ReservationRepository>;

/// Shared handler state: the store plus the booking settings the form needs
#[derive(Clone)]
pub struct ServerState {
    pub store: Arc<DynReservationStore>,
    pub booking: Arc<BookingConfig>,
}

impl ServerState {
    pub fn new(repo: Arc<dyn ReservationRepository>, booking: BookingConfig) -> Self {
        let store = ReservationStore::new(repo, BookingPolicy::from(&booking));
        Self { store: Arc::new(store), booking: Arc::new(booking) }
    }

    pub fn with_db(db: DatabaseConnection, booking: BookingConfig) -> Self {
        Self::new(Arc::new(SeaOrmReservationRepository::new(db)), booking)
    }
}
