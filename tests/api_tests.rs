use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use clinic_controls::{
    auth::hash_access_token,
    models::AppState,
    routes,
    scheduling::calendar::CalendarSettings,
    store::MemoryStore,
    tenant::Role,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

const ADMIN_TOKEN: &str = "admin-token";
const ROOT_TOKEN: &str = "root-token";

fn app() -> (Arc<MemoryStore>, Router) {
    let store = Arc::new(MemoryStore::new());
    store.seed_session(&hash_access_token(ADMIN_TOKEN), Uuid::new_v4(), Role::Admin, "clinic@example.com");
    store.seed_session(&hash_access_token(ROOT_TOKEN), Uuid::new_v4(), Role::SuperAdmin, "root@example.com");
    let state = AppState {
        store: store.clone(),
        calendar: CalendarSettings::default(),
        calendar_max_window_days: 366,
    };
    (store, routes::router(state))
}

fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(v) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(v.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, value)
}

async fn create_patient(app: &Router) -> String {
    let (status, body) = send(
        app,
        request(
            Method::POST,
            "/api/v1/patients",
            Some(ADMIN_TOKEN),
            Some(json!({ "first_name": "Ana", "last_name": "Diaz" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["data"]["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn missing_token_is_session_expired() {
    let (_store, app) = app();
    let (status, body) = send(&app, request(Method::GET, "/api/v1/controls", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "SESSION_EXPIRED");

    let (status, _) = send(&app, request(Method::GET, "/api/v1/controls", Some("nope"), None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn create_and_list_controls() {
    let (_store, app) = app();
    let patient_id = create_patient(&app).await;

    let (status, body) = send(
        &app,
        request(
            Method::POST,
            "/api/v1/controls",
            Some(ADMIN_TOKEN),
            Some(json!({
                "patient_id": patient_id,
                "control_type": "Checkup",
                "scheduled_date": "2024-06-15",
                "scheduled_time": "14:00",
                "cost_cents": 5000
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "scheduled");
    assert_eq!(body["data"]["patient"]["first_name"], "Ana");

    let (status, body) = send(&app, request(Method::GET, "/api/v1/controls", Some(ADMIN_TOKEN), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (status, body) = send(
        &app,
        request(Method::GET, "/api/v1/reports?month=6&year=2024", Some(ADMIN_TOKEN), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["monthly"], 5000);
    assert_eq!(body["data"]["by_type"]["Checkup"], 5000);
}

#[tokio::test]
async fn validation_errors_are_400() {
    let (store, app) = app();
    let before = store.calls();
    let (status, body) = send(
        &app,
        request(
            Method::POST,
            "/api/v1/controls",
            Some(ADMIN_TOKEN),
            Some(json!({ "patient_id": "", "control_type": "Checkup", "scheduled_date": "2024-06-15" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    // only the session lookup reached the store
    assert_eq!(store.calls(), before + 1);
}

#[tokio::test]
async fn unknown_status_is_rejected() {
    let (_store, app) = app();
    let patient_id = create_patient(&app).await;
    let (_, created) = send(
        &app,
        request(
            Method::POST,
            "/api/v1/controls",
            Some(ADMIN_TOKEN),
            Some(json!({ "patient_id": patient_id, "control_type": "Checkup", "scheduled_date": "2024-06-15" })),
        ),
    )
    .await;
    let control_id = created["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        request(
            Method::PATCH,
            &format!("/api/v1/controls/{control_id}/status"),
            Some(ADMIN_TOKEN),
            Some(json!({ "status": "postponed" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn consistency_gap_is_409() {
    let (store, app) = app();
    let patient_id = create_patient(&app).await;
    store.fail_on("insert_cost", "ledger offline");

    let (status, body) = send(
        &app,
        request(
            Method::POST,
            "/api/v1/controls",
            Some(ADMIN_TOKEN),
            Some(json!({
                "patient_id": patient_id,
                "control_type": "Checkup",
                "scheduled_date": "2024-06-15",
                "cost_cents": 5000
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "CONSISTENCY_GAP");
}

#[tokio::test]
async fn persistence_errors_keep_the_store_message() {
    let (store, app) = app();
    store.fail_on("list_schedules", "relation does not exist");
    let (status, body) = send(&app, request(Method::GET, "/api/v1/schedules", Some(ADMIN_TOKEN), None)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["message"], "relation does not exist");
}

#[tokio::test]
async fn calendar_window_and_virtual_moves() {
    let (_store, app) = app();
    let patient_id = create_patient(&app).await;
    let (status, body) = send(
        &app,
        request(
            Method::POST,
            "/api/v1/schedules",
            Some(ADMIN_TOKEN),
            Some(json!({
                "patient_id": patient_id,
                "control_type": "Checkup",
                "frequency": "weekly",
                "start_date": "2024-01-01"
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let schedule_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        request(Method::GET, "/api/v1/calendar?from=2024-01-01&to=2024-01-22", Some(ADMIN_TOKEN), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let events = body["data"].as_array().unwrap();
    assert_eq!(events.len(), 3);
    assert_eq!(events[0]["id"], format!("{schedule_id}:2024-01-01"));
    assert_eq!(events[0]["source"], "schedule");

    let (status, _) = send(
        &app,
        request(
            Method::PATCH,
            &format!("/api/v1/calendar/events/{schedule_id}:2024-01-01"),
            Some(ADMIN_TOKEN),
            Some(json!({ "start": "2024-01-02T09:00:00Z", "end": "2024-01-02T10:00:00Z" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        request(Method::GET, "/api/v1/calendar?from=2024-01-01&to=2026-01-01", Some(ADMIN_TOKEN), None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn csv_export() {
    let (_store, app) = app();
    let patient_id = create_patient(&app).await;
    send(
        &app,
        request(
            Method::POST,
            "/api/v1/controls",
            Some(ADMIN_TOKEN),
            Some(json!({
                "patient_id": patient_id,
                "control_type": "X-Ray, panoramic",
                "scheduled_date": "2024-06-15",
                "cost_cents": 12050
            })),
        ),
    )
    .await;

    let response = app
        .clone()
        .oneshot(request(Method::GET, "/api/v1/reports/controls.csv", Some(ADMIN_TOKEN), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[header::CONTENT_TYPE].to_str().unwrap().starts_with("text/csv"));
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert_eq!(
        text,
        "Date,Patient,Type,Amount,Status\n2024-06-15,Ana Diaz,\"X-Ray, panoramic\",120.50,scheduled\n"
    );
}

#[tokio::test]
async fn admin_routes_require_super_admin() {
    let (_store, app) = app();
    let (status, body) = send(&app, request(Method::GET, "/api/v1/admin/profiles", Some(ADMIN_TOKEN), None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "FORBIDDEN");

    let (status, body) = send(&app, request(Method::GET, "/api/v1/admin/profiles", Some(ROOT_TOKEN), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn system_stats_endpoint() {
    let (_store, app) = app();
    let patient_id = create_patient(&app).await;
    send(
        &app,
        request(
            Method::POST,
            "/api/v1/controls",
            Some(ADMIN_TOKEN),
            Some(json!({
                "patient_id": patient_id,
                "control_type": "Checkup",
                "scheduled_date": "2024-06-15",
                "cost_cents": 6000
            })),
        ),
    )
    .await;

    let (status, _) = send(&app, request(Method::GET, "/api/v1/admin/stats", Some(ADMIN_TOKEN), None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, request(Method::GET, "/api/v1/admin/stats", Some(ROOT_TOKEN), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total_clinics"], 2);
    assert_eq!(body["data"]["total_patients"], 1);
    assert_eq!(body["data"]["total_controls"], 1);
    assert_eq!(body["data"]["total_revenue"], 6000);
    assert_eq!(body["data"]["average_revenue_per_clinic"], 3000);
}

#[tokio::test]
async fn home_and_notifications() {
    let (_store, app) = app();
    let patient_id = create_patient(&app).await;
    send(
        &app,
        request(
            Method::POST,
            "/api/v1/controls",
            Some(ADMIN_TOKEN),
            Some(json!({ "patient_id": patient_id, "control_type": "Checkup", "scheduled_date": "2024-06-15" })),
        ),
    )
    .await;

    let (status, body) = send(&app, request(Method::GET, "/api/v1/home", Some(ADMIN_TOKEN), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["view"], "admin");
    assert_eq!(body["data"]["unread_notifications"], 1);

    let (status, body) = send(
        &app,
        request(Method::POST, "/api/v1/notifications/read_all", Some(ADMIN_TOKEN), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["updated"], 1);

    let (_, body) = send(
        &app,
        request(Method::GET, "/api/v1/notifications/unread_count", Some(ADMIN_TOKEN), None),
    )
    .await;
    assert_eq!(body["data"]["unread"], 0);
}
