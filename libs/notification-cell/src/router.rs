use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use shared_config::AppConfig;

use crate::handlers;

/// All webhook traffic is unauthenticated on our side; Meta proves itself
/// with the verify token.
pub fn notification_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/whatsapp/webhook", get(handlers::verify_webhook))
        .route("/whatsapp/webhook", post(handlers::receive_webhook))
        .with_state(state)
}
