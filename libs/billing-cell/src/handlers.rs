use std::sync::Arc;
use axum::{
    extract::{Extension, Path, State},
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::services::{LimitsService, SubscriptionService};

/// Refresh the caller's subscription state from Stripe.
#[axum::debug_handler]
pub async fn check_subscription(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let email = user
        .email
        .as_deref()
        .ok_or_else(|| AppError::BadRequest("User has no email address".to_string()))?;

    let service = SubscriptionService::new(&config);

    let status = service
        .check_subscription(&user.id, email, auth.token())
        .await
        .map_err(|e| AppError::ExternalService(e.to_string()))?;

    Ok(Json(json!(status)))
}

#[axum::debug_handler]
pub async fn get_plan_usage(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Path(clinic_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let service = LimitsService::new(&config);

    let usage = service.get_usage(&clinic_id, auth.token())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(json!(usage)))
}

/// Public gate the self-booking page checks before rendering its form.
#[axum::debug_handler]
pub async fn online_booking_gate(
    State(config): State<Arc<AppConfig>>,
    Path(clinic_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let service = LimitsService::new(&config);

    let (available, plan) = service.online_booking_available(&clinic_id)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(json!({
        "online_booking_available": available,
        "plan": plan
    })))
}
