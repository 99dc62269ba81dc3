use anyhow::{anyhow, Result};
use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_models::plan::PlanLimits;

use crate::models::{CreatePatientRequest, Patient, PatientError, PatientSearchQuery, UpdatePatientRequest};

pub struct PatientService {
    supabase: SupabaseClient,
}

impl PatientService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn create_patient(
        &self,
        request: CreatePatientRequest,
        auth_token: &str,
    ) -> Result<Patient, PatientError> {
        debug!("Creating patient record for: {}", request.full_name);

        let clinic_id = request.clinic_id.to_string();

        let limits = self.clinic_limits(&clinic_id, auth_token).await?;
        let current = self.count_patients(&clinic_id, auth_token).await?;
        if !PlanLimits::allows(limits.patients, current) {
            return Err(PatientError::LimitReached {
                limit: limits.patients,
            });
        }

        let existing_path = format!(
            "/rest/v1/patients?clinic_id=eq.{}&phone=eq.{}&select=id",
            clinic_id, request.phone
        );
        let existing: Vec<Value> = self
            .supabase
            .request(Method::GET, &existing_path, Some(auth_token), None)
            .await?;

        if !existing.is_empty() {
            return Err(PatientError::PhoneAlreadyExists {
                phone: request.phone,
            });
        }

        let patient_data = json!({
            "clinic_id": request.clinic_id,
            "full_name": request.full_name,
            "phone": request.phone,
            "email": request.email,
            "birth_date": request.birth_date,
            "notes": request.notes,
            "created_at": Utc::now().to_rfc3339(),
            "updated_at": Utc::now().to_rfc3339()
        });

        let result = self
            .supabase
            .insert_returning("/rest/v1/patients", Some(auth_token), patient_data)
            .await?;

        let patient: Patient = result
            .into_iter()
            .next()
            .map(serde_json::from_value)
            .transpose()
            .map_err(anyhow::Error::from)?
            .ok_or_else(|| anyhow!("Failed to create patient record"))?;

        debug!("Patient record created with ID: {}", patient.id);
        Ok(patient)
    }

    pub async fn get_patient(&self, patient_id: &str, auth_token: &str) -> Result<Patient, PatientError> {
        let path = format!("/rest/v1/patients?id=eq.{}", patient_id);

        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        result
            .into_iter()
            .next()
            .map(serde_json::from_value)
            .transpose()
            .map_err(anyhow::Error::from)?
            .ok_or(PatientError::NotFound)
    }

    pub async fn update_patient(
        &self,
        patient_id: &str,
        request: UpdatePatientRequest,
        auth_token: &str,
    ) -> Result<Patient, PatientError> {
        debug!("Updating patient record: {}", patient_id);

        let mut update_data = serde_json::Map::new();

        if let Some(full_name) = request.full_name {
            update_data.insert("full_name".to_string(), json!(full_name));
        }
        if let Some(phone) = request.phone {
            update_data.insert("phone".to_string(), json!(phone));
        }
        if let Some(email) = request.email {
            update_data.insert("email".to_string(), json!(email));
        }
        if let Some(birth_date) = request.birth_date {
            update_data.insert("birth_date".to_string(), json!(birth_date));
        }
        if let Some(notes) = request.notes {
            update_data.insert("notes".to_string(), json!(notes));
        }

        update_data.insert("updated_at".to_string(), json!(Utc::now().to_rfc3339()));

        let path = format!("/rest/v1/patients?id=eq.{}", patient_id);
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static("return=representation"),
        );

        let result: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::PATCH,
                &path,
                Some(auth_token),
                Some(Value::Object(update_data)),
                Some(headers),
            )
            .await?;

        result
            .into_iter()
            .next()
            .map(serde_json::from_value)
            .transpose()
            .map_err(anyhow::Error::from)?
            .ok_or(PatientError::NotFound)
    }

    pub async fn search_patients(
        &self,
        query: PatientSearchQuery,
        auth_token: &str,
    ) -> Result<Vec<Patient>> {
        debug!("Searching patients for clinic {}", query.clinic_id);

        let mut query_parts = vec![format!("clinic_id=eq.{}", query.clinic_id)];

        if let Some(name) = query.name {
            query_parts.push(format!("full_name=ilike.%{}%", name));
        }
        if let Some(phone) = query.phone {
            query_parts.push(format!("phone=ilike.%{}%", phone));
        }

        let limit = query.limit.unwrap_or(50);
        let offset = query.offset.unwrap_or(0);
        let path = format!(
            "/rest/v1/patients?{}&order=full_name.asc&limit={}&offset={}",
            query_parts.join("&"),
            limit,
            offset
        );

        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        let patients = result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<std::result::Result<Vec<Patient>, _>>()?;

        Ok(patients)
    }

    // Private helper methods

    async fn clinic_limits(&self, clinic_id: &str, auth_token: &str) -> Result<PlanLimits> {
        let path = format!(
            "/rest/v1/clinics?id=eq.{}&select=subscription_plan",
            clinic_id
        );

        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        let plan = result
            .first()
            .and_then(|row| row["subscription_plan"].as_str())
            .map(str::to_string);

        Ok(PlanLimits::for_plan(plan.as_deref()))
    }

    async fn count_patients(&self, clinic_id: &str, auth_token: &str) -> Result<i64> {
        let path = format!("/rest/v1/patients?clinic_id=eq.{}&select=id", clinic_id);

        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        Ok(result.len() as i64)
    }
}
