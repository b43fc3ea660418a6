use std::net::SocketAddr;

use axum::Router;
use reqwest::StatusCode as HttpStatusCode;
use serde_json::json;
use tokio::net::TcpListener;
use uuid::Uuid;

mod support;

struct TestApp {
    base_url: String,
}

async fn start_server(app: Router) -> anyhow::Result<TestApp> {
    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    let base_url = format!("http://{}:{}", addr.ip(), addr.port());

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await { eprintln!("server error: {}", e); }
    });

    Ok(TestApp { base_url })
}

#[tokio::test]
async fn e2e_public_health() -> anyhow::Result<()> {
    let app = start_server(support::app().await?).await?;
    let res = reqwest::get(format!("{}/health", app.base_url)).await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn e2e_serves_booking_form() -> anyhow::Result<()> {
    let dir = std::env::temp_dir().join(format!("pc_booking_frontend_{}", Uuid::new_v4()));
    tokio::fs::create_dir_all(&dir).await?;
    tokio::fs::write(dir.join("index.html"), "<h1>Reservas de PCs</h1>").await?;

    let router = support::app_with(configs::BookingConfig::default(), &dir.to_string_lossy()).await?;
    let app = start_server(router).await?;
    let res = reqwest::get(format!("{}/", app.base_url)).await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert!(res.text().await?.contains("Reservas de PCs"));

    tokio::fs::remove_dir_all(&dir).await?;
    Ok(())
}

#[tokio::test]
async fn e2e_book_conflict_and_release_by_token() -> anyhow::Result<()> {
    let app = start_server(support::app().await?).await?;
    let c = reqwest::Client::new();

    let res = c.post(format!("{}/api/reservations", app.base_url))
        .json(&json!({"resource_id": "Jabalí", "owner": "ana", "date": "2024-05-01", "start_time": "09:00", "end_time": "10:00"}))
        .send().await?;
    assert_eq!(res.status(), HttpStatusCode::CREATED);
    let created = res.json::<serde_json::Value>().await?;
    let token = created["release_token"].as_str().unwrap_or_default().to_string();

    let res = c.post(format!("{}/api/reservations", app.base_url))
        .json(&json!({"resource_id": "Jabalí", "owner": "luis", "date": "2024-05-01", "start_time": "09:15", "end_time": "09:45"}))
        .send().await?;
    assert_eq!(res.status(), HttpStatusCode::CONFLICT);

    let res = c.delete(format!("{}/api/reservations/token/{}", app.base_url, token)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert_eq!(res.json::<serde_json::Value>().await?["released"], 1);

    let list = c.get(format!("{}/api/reservations", app.base_url)).send().await?.json::<serde_json::Value>().await?;
    assert_eq!(list, json!([]));
    Ok(())
}

#[tokio::test]
async fn e2e_openapi_document_lists_reservation_paths() -> anyhow::Result<()> {
    let app = start_server(support::app().await?).await?;
    let doc = reqwest::get(format!("{}/api-docs/openapi.json", app.base_url)).await?.json::<serde_json::Value>().await?;
    assert!(doc["paths"]["/api/reservations"].is_object());
    assert!(doc["paths"]["/api/reservations/token/{token}"].is_object());
    Ok(())
}
