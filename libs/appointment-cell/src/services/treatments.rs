use anyhow::{anyhow, Result};
use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{AppointmentError, CreateTreatmentTypeRequest, TreatmentType};

pub struct TreatmentService {
    supabase: SupabaseClient,
}

impl TreatmentService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    /// Also serves the public booking page, which lists treatments before
    /// the visitor has any token.
    pub async fn list_treatments(
        &self,
        clinic_id: &str,
        auth_token: Option<&str>,
    ) -> Result<Vec<TreatmentType>> {
        let path = format!(
            "/rest/v1/treatment_types?clinic_id=eq.{}&order=name.asc",
            clinic_id
        );

        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, auth_token, None)
            .await?;

        let treatments = result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<std::result::Result<Vec<TreatmentType>, _>>()?;

        Ok(treatments)
    }

    pub async fn create_treatment(
        &self,
        request: CreateTreatmentTypeRequest,
        auth_token: &str,
    ) -> Result<TreatmentType, AppointmentError> {
        debug!("Creating treatment type {} for clinic {}", request.name, request.clinic_id);

        let treatment_data = json!({
            "clinic_id": request.clinic_id,
            "name": request.name,
            "price": request.price,
            "created_at": Utc::now().to_rfc3339()
        });

        let result = self
            .supabase
            .insert_returning("/rest/v1/treatment_types", Some(auth_token), treatment_data)
            .await?;

        result
            .into_iter()
            .next()
            .map(serde_json::from_value)
            .transpose()
            .map_err(anyhow::Error::from)?
            .ok_or_else(|| anyhow!("Failed to create treatment type").into())
    }

    pub async fn delete_treatment(
        &self,
        treatment_id: &str,
        auth_token: &str,
    ) -> Result<(), AppointmentError> {
        debug!("Deleting treatment type: {}", treatment_id);

        let path = format!("/rest/v1/treatment_types?id=eq.{}", treatment_id);
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static("return=representation"),
        );

        let result: Vec<Value> = self
            .supabase
            .request_with_headers(Method::DELETE, &path, Some(auth_token), None, Some(headers))
            .await?;

        if result.is_empty() {
            return Err(AppointmentError::NotFound);
        }

        Ok(())
    }
}
