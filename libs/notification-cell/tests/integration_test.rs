use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::json;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use notification_cell::router::notification_routes;
use shared_config::AppConfig;

fn test_config(graph_url: &str) -> AppConfig {
    AppConfig {
        whatsapp_verify_token: "verify-me".to_string(),
        whatsapp_access_token: "waba-token".to_string(),
        whatsapp_phone_number_id: "12345".to_string(),
        whatsapp_graph_base_url: graph_url.to_string(),
        ..AppConfig::default()
    }
}

fn create_test_app(config: AppConfig) -> Router {
    notification_routes(Arc::new(config))
}

fn incoming_text_payload(from: &str, text: &str) -> serde_json::Value {
    json!({
        "entry": [{
            "changes": [{
                "value": {
                    "messages": [{
                        "from": from,
                        "text": { "body": text }
                    }]
                }
            }]
        }]
    })
}

#[tokio::test]
async fn test_webhook_verification_echoes_challenge() {
    let config = test_config("http://graph.invalid");
    let app = create_test_app(config);

    let request = Request::builder()
        .method("GET")
        .uri("/whatsapp/webhook?hub.mode=subscribe&hub.verify_token=verify-me&hub.challenge=challenge-42")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], b"challenge-42");
}

#[tokio::test]
async fn test_webhook_verification_rejects_wrong_token() {
    let config = test_config("http://graph.invalid");
    let app = create_test_app(config);

    let request = Request::builder()
        .method("GET")
        .uri("/whatsapp/webhook?hub.mode=subscribe&hub.verify_token=wrong&hub.challenge=x")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_incoming_message_gets_keyword_reply() {
    let mock_server = MockServer::start().await;
    let config = test_config(&mock_server.uri());
    let app = create_test_app(config);

    Mock::given(method("POST"))
        .and(path("/12345/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "messages": [{ "id": "wamid.test" }]
        })))
        .mount(&mock_server)
        .await;

    let request = Request::builder()
        .method("POST")
        .uri("/whatsapp/webhook")
        .header("content-type", "application/json")
        .body(Body::from(
            incoming_text_payload("5511977770000", "AGENDAR 2025-03-12 10:00").to_string(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json_response: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json_response["ok"], true);

    let sent = mock_server.received_requests().await.unwrap();
    let outbound = sent
        .iter()
        .find(|r| r.method.as_str() == "POST")
        .expect("no Cloud API call recorded");
    let outbound_body: serde_json::Value = serde_json::from_slice(&outbound.body).unwrap();

    assert_eq!(outbound_body["messaging_product"], "whatsapp");
    assert_eq!(outbound_body["to"], "5511977770000");
    assert!(outbound_body["text"]["body"]
        .as_str()
        .unwrap()
        .contains("agendamento"));
}

#[tokio::test]
async fn test_missing_credentials_still_answers_ok() {
    // No credentials at all: the relay must still answer 200 so Meta does
    // not keep retrying
    let config = AppConfig {
        whatsapp_verify_token: "verify-me".to_string(),
        ..AppConfig::default()
    };
    let app = create_test_app(config);

    let request = Request::builder()
        .method("POST")
        .uri("/whatsapp/webhook")
        .header("content-type", "application/json")
        .body(Body::from(
            incoming_text_payload("5511977770000", "bom dia").to_string(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json_response: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json_response["ok"], true);
}

#[tokio::test]
async fn test_payload_without_message_is_ignored() {
    let config = test_config("http://graph.invalid");
    let app = create_test_app(config);

    let request = Request::builder()
        .method("POST")
        .uri("/whatsapp/webhook")
        .header("content-type", "application/json")
        .body(Body::from(json!({ "entry": [] }).to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
