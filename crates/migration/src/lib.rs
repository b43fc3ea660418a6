//! Migrator for the reservation table.
//! Indexes are applied last.
pub use sea_orm_migration::prelude::*;

mod m20240501_000001_create_reservation;
mod m20240501_000002_add_reservation_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240501_000001_create_reservation::Migration),
            // Indexes should always be applied last
            Box::new(m20240501_000002_add_reservation_indexes::Migration),
        ]
    }
}
