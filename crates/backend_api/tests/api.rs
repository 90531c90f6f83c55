use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use backend_api::{create_router, AppState};
use models::Settings;
use serde_json::{json, Value};
use tower::ServiceExt;

async fn app(dir: &tempfile::TempDir) -> Router {
    let settings = Settings {
        data_dir: dir.path().to_path_buf(),
        ..Default::default()
    };
    create_router(AppState::open(&settings).await.unwrap())
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn post_record(app: &Router, branch: &str, date: &str, value: f64) -> Value {
    let (status, body) = send(
        app,
        "POST",
        "/api/records",
        Some(json!({
            "branch": branch,
            "category": "Mermas Bodega",
            "code": "P-01",
            "description": "Pan dulce",
            "date": date,
            "value": value,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body
}

#[tokio::test]
async fn test_health() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(&dir).await;
    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["service"], "mermas-api");
}

#[tokio::test]
async fn test_create_list_and_delete_records() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(&dir).await;

    let first = post_record(&app, "Atitlán Central", "2024-01-05", 100.0).await;
    post_record(&app, "Atitlán Mirador", "2024-01-06", 50.25).await;
    post_record(&app, "Atitlán Central", "2024-02-01", 25.0).await;

    let (status, body) = send(&app, "GET", "/api/records", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 3);
    assert_eq!(body["total"], 175.25);
    assert_eq!(body["records"][0]["date"], "2024-02-01");

    let (_, body) = send(
        &app,
        "GET",
        "/api/records?branch=Atitl%C3%A1n%20Central&sort=value&dir=asc",
        None,
    )
    .await;
    assert_eq!(body["count"], 2);
    assert_eq!(body["records"][0]["value"], 25.0);

    let id = first["id"].as_str().unwrap();
    let (status, _) = send(&app, "DELETE", &format!("/api/records/{}", id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, "DELETE", &format!("/api/records/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains(id));
}

#[tokio::test]
async fn test_invalid_records_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(&dir).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/records",
        Some(json!({"branch": "Sucursal X", "category": "Mermas Bodega", "value": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = send(
        &app,
        "POST",
        "/api/records",
        Some(json!({"branch": "Atitlán Central", "category": "Mermas Bodega", "value": -3})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = send(&app, "GET", "/api/records", None).await;
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn test_undecodable_requests_get_json_errors() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(&dir).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/records",
        Some(json!({"branch": "Atitlán Central", "category": "Mermas Bodega", "value": "abc"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Invalid request"));

    let (status, body) = send(&app, "GET", "/api/records?sort=bogus", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Invalid request"));

    let (status, body) = send(
        &app,
        "PUT",
        "/api/config/threshold",
        Some(json!({"wasteThreshold": "high"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (_, body) = send(&app, "GET", "/api/records", None).await;
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn test_dashboard_classifies_branches() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(&dir).await;

    let (status, _) = send(
        &app,
        "PUT",
        "/api/config/sales",
        Some(json!({"Atitlán Central": 10000, "Atitlán Mirador": 10000})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    post_record(&app, "Atitlán Central", "2024-02-03", 350.0).await;
    post_record(&app, "Atitlán Mirador", "2024-02-10", 250.0).await;
    post_record(&app, "Atitlán Mirador", "2024-01-10", 999.0).await;

    let (status, body) = send(&app, "GET", "/api/dashboard?month=2024-02", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["metadata"]["month"], "2024-02");
    assert_eq!(body["total"], 600.0);
    assert_eq!(body["count"], 2);
    assert_eq!(body["branchesOverThreshold"], 1);

    let budget = body["budget"].as_array().unwrap();
    let status_of = |branch: &str| {
        budget
            .iter()
            .find(|b| b["branch"] == branch)
            .map(|b| b["status"].clone())
            .unwrap()
    };
    assert_eq!(status_of("Atitlán Central"), "danger");
    assert_eq!(status_of("Atitlán Mirador"), "warning");
    assert_eq!(status_of("Bodega Central"), "safe");
}

#[tokio::test]
async fn test_dashboard_cache_follows_changes() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(&dir).await;

    post_record(&app, "Atitlán Central", "2024-02-03", 10.0).await;
    let (_, before) = send(&app, "GET", "/api/dashboard?month=2024-02", None).await;
    assert_eq!(before["total"], 10.0);

    post_record(&app, "Atitlán Central", "2024-02-04", 5.0).await;
    let (_, after) = send(&app, "GET", "/api/dashboard?month=2024-02", None).await;
    assert_eq!(after["total"], 15.0);
}

#[tokio::test]
async fn test_dashboard_rejects_bad_month() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(&dir).await;
    let (status, body) = send(&app, "GET", "/api/dashboard?month=2024-13", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("2024-13"));
}

#[tokio::test]
async fn test_report_formats_rows() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(&dir).await;
    post_record(&app, "Atitlán Central", "2024-02-03", 12.5).await;

    let (status, body) = send(&app, "GET", "/api/report?category=Mermas%20Bodega", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["rows"][0]["valueDisplay"], "Q12.50");
    assert_eq!(body["rows"][0]["notes"], "-");
    assert_eq!(body["metadata"]["filterDescription"], "Category: Mermas Bodega");
}

#[tokio::test]
async fn test_config_administration() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(&dir).await;

    let (status, config) = send(&app, "GET", "/api/config", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(config["branches"].as_array().unwrap().len(), 7);
    assert_eq!(config["wasteThreshold"], 0.03);

    let (status, config) = send(
        &app,
        "POST",
        "/api/config/branches",
        Some(json!({"name": "Atitlán Norte"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(config["monthlySales"]["Atitlán Norte"], 0.0);

    let (status, _) = send(
        &app,
        "POST",
        "/api/config/branches",
        Some(json!({"name": "Atitlán Norte"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, config) = send(
        &app,
        "DELETE",
        "/api/config/branches/Atitl%C3%A1n%20Norte",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(config["monthlySales"].get("Atitlán Norte").is_none());

    let (status, _) = send(&app, "DELETE", "/api/config/categories/Nada", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        "PUT",
        "/api/config/sales",
        Some(json!({"Sucursal X": 10})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, config) = send(
        &app,
        "PUT",
        "/api/config/threshold",
        Some(json!({"wasteThreshold": 0.05})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(config["wasteThreshold"], 0.05);

    let (status, _) = send(
        &app,
        "PUT",
        "/api/config/threshold",
        Some(json!({"wasteThreshold": 2})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, config) = send(
        &app,
        "PATCH",
        "/api/config",
        Some(json!({"categories": ["Mermas Bodega"]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(config["categories"], json!(["Mermas Bodega"]));
    assert_eq!(config["wasteThreshold"], 0.05);
}
