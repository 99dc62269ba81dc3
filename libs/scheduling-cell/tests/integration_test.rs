use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::json;
use tower::ServiceExt;
use uuid::Uuid;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use scheduling_cell::router::scheduling_routes;
use shared_config::AppConfig;
use shared_utils::test_utils::{JwtTestUtils, TestConfig, TestUser};

fn test_config(supabase_url: &str) -> AppConfig {
    AppConfig {
        supabase_url: supabase_url.to_string(),
        supabase_anon_key: "test-anon-key".to_string(),
        supabase_jwt_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
        ..AppConfig::default()
    }
}

fn create_test_app(config: AppConfig) -> Router {
    scheduling_routes(Arc::new(config))
}

async fn mount_settings(mock_server: &MockServer, key: &str, value: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/clinic_settings"))
        .and(query_param("setting_key", format!("eq.{}", key)))
        .respond_with(ResponseTemplate::new(200).set_body_json(value))
        .mount(mock_server)
        .await;
}

#[tokio::test]
async fn test_public_slots_with_default_policy_and_one_booking() {
    let mock_server = MockServer::start().await;
    let config = test_config(&mock_server.uri());
    let app = create_test_app(config);

    // No stored settings: the engine falls back to default closures
    mount_settings(&mock_server, "schedule_blocks", json!([])).await;
    mount_settings(&mock_server, "schedule", json!([])).await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("date", "eq.2025-03-12"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "dentist_id": null, "time": "09:00", "duration": 60, "status": "scheduled" }
        ])))
        .mount(&mock_server)
        .await;

    let request = Request::builder()
        .method("GET")
        .uri("/clinic-123/slots?date=2025-03-12&duration=30")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json_response: serde_json::Value = serde_json::from_slice(&body).unwrap();

    let slots = json_response["slots"].as_array().unwrap();
    assert_eq!(slots.len(), 20);
    assert_eq!(slots[0]["time"], "08:00");
    assert_eq!(slots[0]["available"], false);
    assert_eq!(slots[2]["time"], "09:00");
    assert_eq!(slots[2]["available"], false);
    assert_eq!(slots[4]["time"], "10:00");
    assert_eq!(slots[4]["available"], true);
}

#[tokio::test]
async fn test_public_slots_respect_stored_policy() {
    let mock_server = MockServer::start().await;
    let config = test_config(&mock_server.uri());
    let app = create_test_app(config);

    // Wednesday is clinic-blocked in the stored policy
    mount_settings(
        &mock_server,
        "schedule_blocks",
        json!([{ "setting_value": { "blockedDays": [3], "blockedTimeRanges": [] } }]),
    )
    .await;
    mount_settings(&mock_server, "schedule", json!([])).await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let request = Request::builder()
        .method("GET")
        .uri("/clinic-123/slots?date=2025-03-12")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json_response: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json_response["slots"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_availability_requires_auth() {
    let config = TestConfig::default().to_app_config();
    let app = create_test_app(config);

    let request = Request::builder()
        .method("GET")
        .uri("/clinic-123/availability?date=2025-03-12")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_availability_groups_slots_per_dentist() {
    let mock_server = MockServer::start().await;
    let config = test_config(&mock_server.uri());
    let app = create_test_app(config.clone());

    let user = TestUser::receptionist("front@clinic.com");
    let token = JwtTestUtils::create_test_token(&user, &config.supabase_jwt_secret, Some(24));

    let dentist_id = Uuid::new_v4();

    mount_settings(&mock_server, "schedule_blocks", json!([])).await;
    mount_settings(&mock_server, "schedule", json!([])).await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/dentists"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": dentist_id,
                "full_name": "Dr. Ana Souza",
                "work_hours": {
                    "wednesday": { "start": "09:00", "end": "12:00" }
                }
            }
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "dentist_id": dentist_id, "time": "09:00", "duration": 60, "status": "scheduled" }
        ])))
        .mount(&mock_server)
        .await;

    let request = Request::builder()
        .method("GET")
        .uri("/clinic-123/availability?date=2025-03-12&duration=30")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json_response: serde_json::Value = serde_json::from_slice(&body).unwrap();

    let availability = json_response["availability"].as_array().unwrap();
    assert_eq!(availability.len(), 1);
    assert_eq!(availability[0]["dentist_name"], "Dr. Ana Souza");

    let slots = availability[0]["slots"].as_array().unwrap();
    assert_eq!(slots.len(), 6);
    assert_eq!(slots[0]["time"], "09:00");
    assert_eq!(slots[0]["available"], false);
    assert_eq!(slots[1]["time"], "09:30");
    assert_eq!(slots[1]["available"], false);
    assert_eq!(slots[2]["time"], "10:00");
    assert_eq!(slots[2]["available"], true);
}

#[tokio::test]
async fn test_invalid_token_is_rejected() {
    let config = TestConfig::default().to_app_config();
    let app = create_test_app(config);

    let user = TestUser::default();
    let token = JwtTestUtils::create_invalid_signature_token(&user);

    let request = Request::builder()
        .method("GET")
        .uri("/clinic-123/availability?date=2025-03-12")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
