#![allow(dead_code)]

use axum::Router;
use configs::BookingConfig;
use models::db::{connect_and_migrate, DatabaseConfig};
use tower_http::cors::CorsLayer;

use server::routes;
use server::state::ServerState;

/// Router over a fresh migrated in-memory SQLite database.
pub async fn app_with(booking: BookingConfig, frontend_dir: &str) -> anyhow::Result<Router> {
    let cfg = DatabaseConfig { url: "sqlite::memory:".into(), ..DatabaseConfig::from(&configs::DatabaseConfig::default()) };
    let db = connect_and_migrate(&cfg).await?;
    let state = ServerState::with_db(db, booking);
    Ok(routes::build_router(state, CorsLayer::very_permissive(), frontend_dir))
}

pub async fn app() -> anyhow::Result<Router> {
    app_with(BookingConfig::default(), "frontend").await
}
