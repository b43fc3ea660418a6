use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

mod support;

async fn send(app: &Router, req: Request<Body>) -> anyhow::Result<(StatusCode, Value)> {
    let res = app.clone().oneshot(req).await?;
    let status = res.status();
    let bytes = res.into_body().collect().await?.to_bytes();
    let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes)? };
    Ok((status, body))
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn booking(resource: &str, owner: &str, start: &str, end: &str) -> Value {
    json!({"resource_id": resource, "owner": owner, "date": "2024-05-01", "start_time": start, "end_time": end})
}

#[tokio::test]
async fn health_ok() -> anyhow::Result<()> {
    let app = support::app().await?;
    let (status, body) = send(&app, get("/health")).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn resources_lists_configured_computers() -> anyhow::Result<()> {
    let app = support::app().await?;
    let (status, body) = send(&app, get("/api/resources")).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!(["Jabalí", "Lince"]));
    Ok(())
}

#[tokio::test]
async fn jabali_booking_day() -> anyhow::Result<()> {
    let app = support::app().await?;

    let (status, body) = send(&app, post_json("/api/reservations", booking("Jabalí", "ana", "09:00", "10:00"))).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["reservation"]["start_time"], "09:00");
    assert_eq!(body["reservation"]["end_time"], "10:00");
    assert!(body["release_token"].is_string());

    let (status, body) = send(&app, post_json("/api/reservations", booking("Jabalí", "luis", "09:30", "10:30"))).await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Scheduling Conflict");
    assert_eq!(body["detail"], "Jabalí is already booked on 2024-05-01 from 09:00 to 10:00");

    let (status, _) = send(&app, post_json("/api/reservations", booking("Jabalí", "ana", "10:00", "11:00"))).await?;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = send(&app, post_json("/api/reservations", booking("Lince", "luis", "09:30", "10:30"))).await?;
    assert_eq!(status, StatusCode::CREATED);

    let (_, list) = send(&app, get("/api/reservations")).await?;
    let rows = list.as_array().cloned().unwrap_or_default();
    assert_eq!(rows.len(), 3);
    let starts: Vec<_> = rows.iter().map(|r| r["start_time"].as_str().unwrap_or_default().to_string()).collect();
    assert_eq!(starts, vec!["09:00", "09:30", "10:00"]);
    assert!(rows.iter().all(|r| r.get("release_token").is_none()));

    let (status, body) = send(&app, post_json("/api/reservations/release", json!({"resource_id": "Jabalí", "owner": "ana"}))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["released"], 2);
    let (_, body) = send(&app, post_json("/api/reservations/release", json!({"resource_id": "Jabalí", "owner": "ana"}))).await?;
    assert_eq!(body["released"], 0);

    let (_, list) = send(&app, get("/api/reservations")).await?;
    assert_eq!(list.as_array().map(Vec::len), Some(1));
    assert_eq!(list[0]["resource_id"], "Lince");
    Ok(())
}

#[tokio::test]
async fn conflict_probe_follows_half_open_rule() -> anyhow::Result<()> {
    let app = support::app().await?;
    send(&app, post_json("/api/reservations", booking("Lince", "eva", "09:00", "10:00"))).await?;

    let uri = "/api/reservations/conflicts?resource_id=Lince&date=2024-05-01&start_time=10:00&end_time=11:00";
    let (status, body) = send(&app, get(uri)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["conflict"], false);

    let uri = "/api/reservations/conflicts?resource_id=Lince&date=2024-05-01&start_time=09:59&end_time=11:00";
    let (_, body) = send(&app, get(uri)).await?;
    assert_eq!(body["conflict"], true);

    let uri = "/api/reservations/conflicts?resource_id=Lince&date=2024-05-01&start_time=11:00&end_time=10:00";
    let (status, _) = send(&app, get(uri)).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn invalid_requests_are_rejected_with_400() -> anyhow::Result<()> {
    let app = support::app().await?;

    let (status, body) = send(&app, post_json("/api/reservations", booking("Jabalí", "ana", "11:00", "10:00"))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Validation Error");

    let (status, _) = send(&app, post_json("/api/reservations", json!({"resource_id": "Jabalí", "date": "2024-05-01"}))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, post_json("/api/reservations", booking("Puma", "ana", "09:00", "10:00"))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "unknown resource: Puma");

    let (status, _) = send(&app, get("/api/reservations?from=ayer")).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, list) = send(&app, get("/api/reservations")).await?;
    assert_eq!(list, json!([]));
    Ok(())
}

#[tokio::test]
async fn list_from_hides_past_days() -> anyhow::Result<()> {
    let app = support::app().await?;
    let mut old = booking("Jabalí", "ana", "09:00", "10:00");
    old["date"] = json!("2024-04-30");
    send(&app, post_json("/api/reservations", old)).await?;
    send(&app, post_json("/api/reservations", booking("Jabalí", "ana", "09:00", "10:00"))).await?;

    let (status, list) = send(&app, get("/api/reservations?from=2024-05-01")).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().map(Vec::len), Some(1));
    assert_eq!(list[0]["date"], "2024-05-01");
    Ok(())
}

#[tokio::test]
async fn token_release_and_disabled_owner_release() -> anyhow::Result<()> {
    let booking_cfg = configs::BookingConfig { allow_owner_release: false, ..Default::default() };
    let app = support::app_with(booking_cfg, "frontend").await?;

    let (_, created) = send(&app, post_json("/api/reservations", booking("Lince", "eva", "09:00", "10:00"))).await?;
    let token = created["release_token"].as_str().unwrap_or_default().to_string();

    let (status, body) = send(&app, post_json("/api/reservations/release", json!({"resource_id": "Lince", "owner": "eva"}))).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Forbidden");

    let delete = |t: &str| Request::delete(format!("/api/reservations/token/{t}")).body(Body::empty()).unwrap();
    let (status, body) = send(&app, delete(&token)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["released"], 1);
    let (_, body) = send(&app, delete(&token)).await?;
    assert_eq!(body["released"], 0);
    Ok(())
}

#[tokio::test]
async fn one_per_day_limit_replaces_previous_booking() -> anyhow::Result<()> {
    let booking_cfg = configs::BookingConfig {
        max_reservations_per_resource_per_day: configs::DailyLimit::One,
        ..Default::default()
    };
    let app = support::app_with(booking_cfg, "frontend").await?;

    send(&app, post_json("/api/reservations", booking("Jabalí", "ana", "09:00", "10:00"))).await?;
    let (status, body) = send(&app, post_json("/api/reservations", booking("Jabalí", "luis", "15:00", "16:00"))).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["replaced"], 1);

    let (_, list) = send(&app, get("/api/reservations")).await?;
    assert_eq!(list.as_array().map(Vec::len), Some(1));
    assert_eq!(list[0]["owner"], "luis");
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_conflicting_posts_yield_one_created() -> anyhow::Result<()> {
    let app = support::app().await?;
    let mut handles = Vec::new();
    for i in 0..6 {
        let app = app.clone();
        handles.push(tokio::spawn(async move {
            let req = post_json("/api/reservations", booking("Lince", &format!("user{i}"), "12:00", "13:00"));
            app.oneshot(req).await.map(|r| r.status())
        }));
    }
    let mut statuses = Vec::new();
    for h in handles {
        statuses.push(h.await??);
    }
    assert_eq!(statuses.iter().filter(|s| **s == StatusCode::CREATED).count(), 1);
    assert_eq!(statuses.iter().filter(|s| **s == StatusCode::CONFLICT).count(), 5);
    Ok(())
}

#[tokio::test]
async fn times_are_whole_minutes() -> anyhow::Result<()> {
    let app = support::app().await?;

    let (status, body) = send(&app, post_json("/api/reservations", booking("Lince", "eva", "10:00:00", "10:00:30"))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Validation Error");

    let (status, body) = send(&app, post_json("/api/reservations", booking("Lince", "eva", "10:00:00", "10:30:00"))).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["reservation"]["start_time"], "10:00");
    assert_eq!(body["reservation"]["end_time"], "10:30");

    let uri = "/api/reservations/conflicts?resource_id=Lince&date=2024-05-01&start_time=10:00:10&end_time=10:00:20";
    let (status, _) = send(&app, get(uri)).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn extractor_rejections_use_json_error_body() -> anyhow::Result<()> {
    let app = support::app().await?;

    let malformed = Request::post("/api/reservations")
        .header("content-type", "application/json")
        .body(Body::from("{\"resource_id\": "))
        .unwrap();
    let (status, body) = send(&app, malformed).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid Request");
    assert!(body["detail"].is_string());

    let plain = Request::post("/api/reservations")
        .header("content-type", "text/plain")
        .body(Body::from(booking("Lince", "eva", "09:00", "10:00").to_string()))
        .unwrap();
    let (status, body) = send(&app, plain).await?;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(body["error"], "Invalid Request");

    let (status, body) = send(&app, get("/api/reservations/conflicts?resource_id=Lince&date=2024-05-01")).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid Request");

    let bad_token = Request::delete("/api/reservations/token/not-a-uuid").body(Body::empty()).unwrap();
    let (status, body) = send(&app, bad_token).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid Request");
    Ok(())
}
