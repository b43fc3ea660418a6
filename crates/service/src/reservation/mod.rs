//! Reservation store: domain types, repository abstraction, keyed locks and
//! the store that ties them together.

pub mod domain;
pub mod locks;
pub mod repo;
pub mod repository;
pub mod service;

pub use domain::{CreateReservationInput, CreatedReservation, NewReservation, Reservation, TimeSlot};
pub use service::{BookingPolicy, ReservationStore};
