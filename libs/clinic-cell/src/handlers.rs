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

use crate::models::{CreateClinicRequest, UpdateClinicRequest, UpsertSettingRequest};
use crate::services::{ClinicService, SettingsService};

#[axum::debug_handler]
pub async fn create_clinic(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateClinicRequest>,
) -> Result<Json<Value>, AppError> {
    let service = ClinicService::new(&config);

    let clinic = service.create_clinic(&user.id, request, auth.token())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(json!(clinic)))
}

/// Tenant resolution: the clinic of whoever holds the token.
#[axum::debug_handler]
pub async fn get_my_clinic(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let service = ClinicService::new(&config);

    let membership = service.resolve_membership(&user.id, auth.token())
        .await
        .map_err(|e| AppError::NotFound(e.to_string()))?;

    let clinic = service
        .get_clinic(&membership.clinic_id.to_string(), auth.token())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(json!({
        "clinic": clinic,
        "role": membership.role
    })))
}

#[axum::debug_handler]
pub async fn get_clinic(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Path(clinic_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let service = ClinicService::new(&config);

    let clinic = service.get_clinic(&clinic_id, auth.token())
        .await
        .map_err(|e| AppError::NotFound(e.to_string()))?;

    Ok(Json(json!(clinic)))
}

#[axum::debug_handler]
pub async fn update_clinic(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Path(clinic_id): Path<String>,
    Json(request): Json<UpdateClinicRequest>,
) -> Result<Json<Value>, AppError> {
    let service = ClinicService::new(&config);

    let clinic = service.update_clinic(&clinic_id, request, auth.token())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(json!(clinic)))
}

/// Public lookup behind the self-booking URL.
#[axum::debug_handler]
pub async fn get_clinic_public(
    State(config): State<Arc<AppConfig>>,
    Path(public_code): Path<String>,
) -> Result<Json<Value>, AppError> {
    let service = ClinicService::new(&config);

    let clinic = service.get_clinic_by_public_code(&public_code)
        .await
        .map_err(|e| AppError::NotFound(e.to_string()))?;

    Ok(Json(json!(clinic)))
}

#[axum::debug_handler]
pub async fn get_setting(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Path((clinic_id, key)): Path<(String, String)>,
) -> Result<Json<Value>, AppError> {
    let service = SettingsService::new(&config);

    let setting = service.get_setting(&clinic_id, &key, auth.token())
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    match setting {
        Some(setting) => Ok(Json(json!(setting))),
        None => Ok(Json(json!({
            "clinic_id": clinic_id,
            "setting_key": key,
            "setting_value": null
        }))),
    }
}

#[axum::debug_handler]
pub async fn upsert_setting(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Path((clinic_id, key)): Path<(String, String)>,
    Json(request): Json<UpsertSettingRequest>,
) -> Result<Json<Value>, AppError> {
    let service = SettingsService::new(&config);

    let setting = service
        .upsert_setting(&clinic_id, &key, request.value, auth.token())
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    Ok(Json(json!(setting)))
}
