use std::sync::Arc;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::warn;

use shared_config::AppConfig;

use crate::models::{WebhookPayload, WebhookVerification};
use crate::services::WhatsAppService;

/// Meta's subscription handshake.
#[axum::debug_handler]
pub async fn verify_webhook(
    State(config): State<Arc<AppConfig>>,
    Query(query): Query<WebhookVerification>,
) -> Response {
    let service = WhatsAppService::new(&config);

    match service.verify(&query) {
        Some(challenge) => (StatusCode::OK, challenge).into_response(),
        None => (StatusCode::FORBIDDEN, "Forbidden").into_response(),
    }
}

/// Incoming messages. Always answers 200 so Meta does not retry the
/// delivery; failures only show up in the logs.
#[axum::debug_handler]
pub async fn receive_webhook(
    State(config): State<Arc<AppConfig>>,
    Json(payload): Json<WebhookPayload>,
) -> Json<serde_json::Value> {
    let service = WhatsAppService::new(&config);

    match service.handle_incoming(&payload).await {
        Ok(()) => Json(json!({ "ok": true })),
        Err(e) => {
            warn!("Failed to relay WhatsApp message: {}", e);
            Json(json!({ "ok": false }))
        }
    }
}
