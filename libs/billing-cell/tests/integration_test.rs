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

use billing_cell::router::billing_routes;
use shared_config::AppConfig;
use shared_utils::test_utils::{JwtTestUtils, TestConfig, TestUser};

fn test_config(supabase_url: &str, stripe_url: &str) -> AppConfig {
    AppConfig {
        supabase_url: supabase_url.to_string(),
        supabase_anon_key: "test-anon-key".to_string(),
        supabase_jwt_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
        stripe_secret_key: "sk_test_billing".to_string(),
        stripe_api_base_url: stripe_url.to_string(),
        ..AppConfig::default()
    }
}

fn create_test_app(config: AppConfig) -> Router {
    billing_routes(Arc::new(config))
}

async fn mount_membership(mock_server: &MockServer, user_id: &str, clinic_id: &str) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/clinic_members"))
        .and(query_param("user_id", format!("eq.{}", user_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "clinic_id": clinic_id }
        ])))
        .mount(mock_server)
        .await;
}

async fn mount_subscription_upsert(mock_server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/rest/v1/subscriptions"))
        .and(query_param("on_conflict", "clinic_id"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([{}])))
        .mount(mock_server)
        .await;
}

#[tokio::test]
async fn test_check_subscription_with_active_premium_plan() {
    let mock_server = MockServer::start().await;
    let config = test_config(&mock_server.uri(), &mock_server.uri());
    let app = create_test_app(config.clone());

    let user = TestUser::admin("owner@clinic.com");
    let token = JwtTestUtils::create_test_token(&user, &config.supabase_jwt_secret, Some(24));
    let clinic_id = Uuid::new_v4().to_string();

    mount_membership(&mock_server, &user.id, &clinic_id).await;
    mount_subscription_upsert(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/v1/customers"))
        .and(query_param("email", "owner@clinic.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{ "id": "cus_test123" }]
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/subscriptions"))
        .and(query_param("customer", "cus_test123"))
        .and(query_param("status", "active"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{
                "id": "sub_test123",
                "current_period_start": 1735689600,
                "current_period_end": 1738368000,
                "items": { "data": [{ "price": { "unit_amount": 9900 } }] }
            }]
        })))
        .mount(&mock_server)
        .await;

    let request = Request::builder()
        .method("POST")
        .uri("/check-subscription")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json_response: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json_response["subscribed"], true);
    assert_eq!(json_response["subscription_tier"], "premium");
    assert_eq!(json_response["trial_active"], false);

    // The refreshed state was written back for the clinic
    let sent = mock_server.received_requests().await.unwrap();
    let upsert = sent
        .iter()
        .find(|r| r.method.as_str() == "POST" && r.url.path() == "/rest/v1/subscriptions")
        .expect("no subscriptions upsert recorded");
    let upsert_body: serde_json::Value = serde_json::from_slice(&upsert.body).unwrap();
    assert_eq!(upsert_body["plan_name"], "premium");
    assert_eq!(upsert_body["status"], "active");
}

#[tokio::test]
async fn test_check_subscription_without_customer_reports_trial() {
    let mock_server = MockServer::start().await;
    let config = test_config(&mock_server.uri(), &mock_server.uri());
    let app = create_test_app(config.clone());

    let user = TestUser::admin("owner@clinic.com");
    let token = JwtTestUtils::create_test_token(&user, &config.supabase_jwt_secret, Some(24));
    let clinic_id = Uuid::new_v4().to_string();

    mount_membership(&mock_server, &user.id, &clinic_id).await;
    mount_subscription_upsert(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/v1/customers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/clinics"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "trial_end_date": "2099-01-01" }
        ])))
        .mount(&mock_server)
        .await;

    let request = Request::builder()
        .method("POST")
        .uri("/check-subscription")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json_response: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json_response["subscribed"], false);
    assert_eq!(json_response["subscription_tier"], "trial");
    assert_eq!(json_response["trial_active"], true);
    assert_eq!(json_response["trial_end"], "2099-01-01");
}

#[tokio::test]
async fn test_check_subscription_without_clinic() {
    let mock_server = MockServer::start().await;
    let config = test_config(&mock_server.uri(), &mock_server.uri());
    let app = create_test_app(config.clone());

    let user = TestUser::admin("owner@clinic.com");
    let token = JwtTestUtils::create_test_token(&user, &config.supabase_jwt_secret, Some(24));

    Mock::given(method("GET"))
        .and(path("/rest/v1/clinic_members"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let request = Request::builder()
        .method("POST")
        .uri("/check-subscription")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json_response: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json_response["subscribed"], false);
    assert!(json_response["subscription_tier"].is_null());
}

#[tokio::test]
async fn test_plan_usage_counts_against_limits() {
    let mock_server = MockServer::start().await;
    let config = test_config(&mock_server.uri(), &mock_server.uri());
    let app = create_test_app(config.clone());

    let user = TestUser::admin("owner@clinic.com");
    let token = JwtTestUtils::create_test_token(&user, &config.supabase_jwt_secret, Some(24));
    let clinic_id = Uuid::new_v4().to_string();

    Mock::given(method("GET"))
        .and(path("/rest/v1/clinics"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "subscription_plan": "basic" }
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": Uuid::new_v4() }, { "id": Uuid::new_v4() }, { "id": Uuid::new_v4() }
        ])))
        .mount(&mock_server)
        .await;

    // Already at the basic limit of two dentists
    Mock::given(method("GET"))
        .and(path("/rest/v1/dentists"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": Uuid::new_v4() }, { "id": Uuid::new_v4() }
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/clinic_settings"))
        .and(query_param("setting_key", "eq.rooms"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "setting_value": ["Room 1"] }
        ])))
        .mount(&mock_server)
        .await;

    let request = Request::builder()
        .method("GET")
        .uri(&format!("/limits/{}", clinic_id))
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json_response: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json_response["plan"], "basic");
    assert_eq!(json_response["current"]["patients"], 3);
    assert_eq!(json_response["current"]["dentists"], 2);
    assert_eq!(json_response["current"]["rooms"], 1);
    assert_eq!(json_response["can_add_patient"], true);
    assert_eq!(json_response["can_add_dentist"], false);
    assert_eq!(json_response["can_add_room"], true);
    assert_eq!(json_response["online_booking"], false);
}

#[tokio::test]
async fn test_online_booking_gate_is_public() {
    let mock_server = MockServer::start().await;
    let config = test_config(&mock_server.uri(), &mock_server.uri());
    let app = create_test_app(config);

    Mock::given(method("GET"))
        .and(path("/rest/v1/clinics"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "subscription_plan": "enterprise", "subscription_active": true }
        ])))
        .mount(&mock_server)
        .await;

    let request = Request::builder()
        .method("GET")
        .uri(&format!("/online-booking/{}", Uuid::new_v4()))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json_response: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json_response["online_booking_available"], true);
    assert_eq!(json_response["plan"], "enterprise");
}

#[tokio::test]
async fn test_online_booking_gate_closed_when_subscription_lapsed() {
    let mock_server = MockServer::start().await;
    let config = test_config(&mock_server.uri(), &mock_server.uri());
    let app = create_test_app(config);

    Mock::given(method("GET"))
        .and(path("/rest/v1/clinics"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "subscription_plan": "premium", "subscription_active": false }
        ])))
        .mount(&mock_server)
        .await;

    let request = Request::builder()
        .method("GET")
        .uri(&format!("/online-booking/{}", Uuid::new_v4()))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json_response: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json_response["online_booking_available"], false);
}

#[tokio::test]
async fn test_protected_endpoints_unauthorized() {
    let config = TestConfig::default().to_app_config();

    let protected_endpoints = vec![
        ("POST", "/check-subscription"),
        ("GET", "/limits/clinic-123"),
    ];

    for (method, uri) in protected_endpoints {
        let app = create_test_app(config.clone());

        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(
            response.status(),
            StatusCode::UNAUTHORIZED,
            "Failed for {} {}",
            method,
            uri
        );
    }
}
