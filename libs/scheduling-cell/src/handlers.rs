use std::sync::Arc;
use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::SlotQueryRequest;
use crate::services::AvailabilityService;

/// Public slot grid for a clinic date, rendered by the self-booking page.
#[axum::debug_handler]
pub async fn get_public_slots(
    State(config): State<Arc<AppConfig>>,
    Path(clinic_id): Path<String>,
    Query(query): Query<SlotQueryRequest>,
) -> Result<Json<Value>, AppError> {
    let service = AvailabilityService::new(&config);

    let slots = service.get_clinic_slots(&clinic_id, &query, None)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(json!({
        "date": query.date,
        "slots": slots
    })))
}

/// Per-dentist availability for the booking screens inside the clinic.
#[axum::debug_handler]
pub async fn get_availability(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(clinic_id): Path<String>,
    Query(query): Query<SlotQueryRequest>,
) -> Result<Json<Value>, AppError> {
    tracing::debug!("User {} requested availability for clinic {}", user.id, clinic_id);
    let service = AvailabilityService::new(&config);

    let availability = service
        .get_dentist_availability(&clinic_id, &query, Some(auth.token()))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(json!({
        "date": query.date,
        "availability": availability
    })))
}
