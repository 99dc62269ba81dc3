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

use crate::models::{CreateDentistRequest, DentistError, UpdateDentistRequest, UpdateWorkHoursRequest};
use crate::services::DentistService;

impl From<DentistError> for AppError {
    fn from(err: DentistError) -> Self {
        match err {
            DentistError::LimitReached { .. } => AppError::Forbidden(err.to_string()),
            DentistError::NotFound => AppError::NotFound(err.to_string()),
            DentistError::Other(e) => AppError::Internal(e.to_string()),
        }
    }
}

#[axum::debug_handler]
pub async fn create_dentist(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Json(request): Json<CreateDentistRequest>,
) -> Result<Json<Value>, AppError> {
    let service = DentistService::new(&config);

    let dentist = service.create_dentist(request, auth.token()).await?;

    Ok(Json(json!(dentist)))
}

#[axum::debug_handler]
pub async fn get_dentist(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Path(dentist_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let service = DentistService::new(&config);

    let dentist = service.get_dentist(&dentist_id, auth.token()).await?;

    Ok(Json(json!(dentist)))
}

#[axum::debug_handler]
pub async fn list_dentists(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Path(clinic_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let service = DentistService::new(&config);

    let dentists = service.list_dentists(&clinic_id, auth.token())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(json!({
        "dentists": dentists,
        "total": dentists.len()
    })))
}

#[axum::debug_handler]
pub async fn update_dentist(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Path(dentist_id): Path<String>,
    Json(request): Json<UpdateDentistRequest>,
) -> Result<Json<Value>, AppError> {
    let service = DentistService::new(&config);

    let dentist = service.update_dentist(&dentist_id, request, auth.token()).await?;

    Ok(Json(json!(dentist)))
}

#[axum::debug_handler]
pub async fn update_work_hours(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Path(dentist_id): Path<String>,
    Json(request): Json<UpdateWorkHoursRequest>,
) -> Result<Json<Value>, AppError> {
    let service = DentistService::new(&config);

    let dentist = service
        .update_work_hours(&dentist_id, &request, auth.token())
        .await?;

    Ok(Json(json!(dentist)))
}

#[axum::debug_handler]
pub async fn delete_dentist(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Path(dentist_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let service = DentistService::new(&config);

    service.delete_dentist(&dentist_id, auth.token()).await?;

    Ok(Json(json!({ "deleted": true })))
}
