//! Service layer for PC reservations.
//! - Owns the scheduling rules (overlap, daily limit, release policy).
//! - Reuses validation and entity definitions in `models` crate.
//! - Persistence sits behind the `ReservationRepository` trait.

pub mod errors;
pub mod reservation;
pub mod runtime;
#[cfg(test)]
pub mod test_support;
