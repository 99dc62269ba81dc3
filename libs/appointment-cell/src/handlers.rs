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

use crate::models::{
    AppointmentError, AppointmentListQuery, CreateAppointmentRequest, CreateTreatmentTypeRequest,
    PublicBookingRequest, UpdateAppointmentRequest,
};
use crate::services::{BookingRequestService, BookingService, TreatmentService};

impl From<AppointmentError> for AppError {
    fn from(err: AppointmentError) -> Self {
        match err {
            AppointmentError::SlotTaken => AppError::Conflict(err.to_string()),
            AppointmentError::NotFound | AppointmentError::RequestNotFound => {
                AppError::NotFound(err.to_string())
            }
            AppointmentError::OnlineBookingUnavailable { .. } => {
                AppError::Forbidden(err.to_string())
            }
            AppointmentError::Other(e) => AppError::Internal(e.to_string()),
        }
    }
}

#[axum::debug_handler]
pub async fn create_appointment(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Json(request): Json<CreateAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::new(&config);

    let appointment = service.create_appointment(request, auth.token()).await?;

    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Path(appointment_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::new(&config);

    let appointment = service.get_appointment(&appointment_id, auth.token()).await?;

    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn list_appointments(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Path(clinic_id): Path<String>,
    Query(query): Query<AppointmentListQuery>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::new(&config);

    let appointments = service
        .list_appointments(&clinic_id, &query, auth.token())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(json!({
        "appointments": appointments,
        "total": appointments.len()
    })))
}

#[axum::debug_handler]
pub async fn update_appointment(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Path(appointment_id): Path<String>,
    Json(request): Json<UpdateAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::new(&config);

    let appointment = service
        .update_appointment(&appointment_id, request, auth.token())
        .await?;

    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Path(appointment_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::new(&config);

    let appointment = service.cancel_appointment(&appointment_id, auth.token()).await?;

    Ok(Json(json!(appointment)))
}

/// Visitor-facing: no token, gated by the clinic's plan.
#[axum::debug_handler]
pub async fn submit_booking_request(
    State(config): State<Arc<AppConfig>>,
    Path(clinic_id): Path<String>,
    Json(request): Json<PublicBookingRequest>,
) -> Result<Json<Value>, AppError> {
    let service = BookingRequestService::new(&config);

    let submitted = service.submit_request(&clinic_id, request).await?;

    Ok(Json(json!(submitted)))
}

#[axum::debug_handler]
pub async fn list_pending_requests(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Path(clinic_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let service = BookingRequestService::new(&config);

    let requests = service.list_pending(&clinic_id, auth.token())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(json!({
        "requests": requests,
        "total": requests.len()
    })))
}

#[axum::debug_handler]
pub async fn approve_booking_request(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Path(request_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let service = BookingRequestService::new(&config);

    let appointment = service.approve_request(&request_id, auth.token()).await?;

    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn reject_booking_request(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Path(request_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let service = BookingRequestService::new(&config);

    let rejected = service.reject_request(&request_id, auth.token()).await?;

    Ok(Json(json!(rejected)))
}

/// Treatment list for the public booking form.
#[axum::debug_handler]
pub async fn list_treatments_public(
    State(config): State<Arc<AppConfig>>,
    Path(clinic_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let service = TreatmentService::new(&config);

    let treatments = service.list_treatments(&clinic_id, None)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(json!({ "treatments": treatments })))
}

#[axum::debug_handler]
pub async fn create_treatment(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Json(request): Json<CreateTreatmentTypeRequest>,
) -> Result<Json<Value>, AppError> {
    let service = TreatmentService::new(&config);

    let treatment = service.create_treatment(request, auth.token()).await?;

    Ok(Json(json!(treatment)))
}

#[axum::debug_handler]
pub async fn delete_treatment(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Path(treatment_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let service = TreatmentService::new(&config);

    service.delete_treatment(&treatment_id, auth.token()).await?;

    Ok(Json(json!({ "deleted": true })))
}
