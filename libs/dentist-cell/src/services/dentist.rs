use anyhow::{anyhow, Result};
use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;

use scheduling_cell::models::{DayHours, WeekSchedule};
use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_models::plan::PlanLimits;

use crate::models::{CreateDentistRequest, Dentist, DentistError, UpdateDentistRequest};

pub struct DentistService {
    supabase: SupabaseClient,
}

impl DentistService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn create_dentist(
        &self,
        request: CreateDentistRequest,
        auth_token: &str,
    ) -> Result<Dentist, DentistError> {
        debug!("Creating dentist {} for clinic {}", request.full_name, request.clinic_id);

        let clinic_id = request.clinic_id.to_string();
        let limits = self.clinic_limits(&clinic_id, auth_token).await?;
        let current = self.count_dentists(&clinic_id, auth_token).await?;

        if !PlanLimits::allows(limits.dentists, current) {
            return Err(DentistError::LimitReached {
                limit: limits.dentists,
            });
        }

        let dentist_data = json!({
            "clinic_id": request.clinic_id,
            "full_name": request.full_name,
            "specialty": request.specialty,
            "cro_number": request.cro_number,
            "email": request.email,
            "phone": request.phone,
            "created_at": Utc::now().to_rfc3339(),
            "updated_at": Utc::now().to_rfc3339()
        });

        let result = self
            .supabase
            .insert_returning("/rest/v1/dentists", Some(auth_token), dentist_data)
            .await?;

        let dentist = result
            .into_iter()
            .next()
            .map(serde_json::from_value)
            .transpose()
            .map_err(anyhow::Error::from)?
            .ok_or_else(|| anyhow!("Failed to create dentist"))?;

        Ok(dentist)
    }

    pub async fn get_dentist(&self, dentist_id: &str, auth_token: &str) -> Result<Dentist, DentistError> {
        let path = format!("/rest/v1/dentists?id=eq.{}", dentist_id);

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
            .ok_or(DentistError::NotFound)
    }

    pub async fn list_dentists(&self, clinic_id: &str, auth_token: &str) -> Result<Vec<Dentist>> {
        let path = format!(
            "/rest/v1/dentists?clinic_id=eq.{}&order=full_name.asc",
            clinic_id
        );

        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        let dentists = result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<std::result::Result<Vec<Dentist>, _>>()?;

        Ok(dentists)
    }

    pub async fn update_dentist(
        &self,
        dentist_id: &str,
        request: UpdateDentistRequest,
        auth_token: &str,
    ) -> Result<Dentist, DentistError> {
        debug!("Updating dentist: {}", dentist_id);

        let mut update_data = serde_json::Map::new();

        if let Some(full_name) = request.full_name {
            update_data.insert("full_name".to_string(), json!(full_name));
        }
        if let Some(specialty) = request.specialty {
            update_data.insert("specialty".to_string(), json!(specialty));
        }
        if let Some(cro_number) = request.cro_number {
            update_data.insert("cro_number".to_string(), json!(cro_number));
        }
        if let Some(email) = request.email {
            update_data.insert("email".to_string(), json!(email));
        }
        if let Some(phone) = request.phone {
            update_data.insert("phone".to_string(), json!(phone));
        }

        update_data.insert("updated_at".to_string(), json!(Utc::now().to_rfc3339()));

        self.patch_dentist(dentist_id, Value::Object(update_data), auth_token)
            .await
    }

    /// Persist the weekly schedule keeping only the enabled days, which is
    /// the shape the availability engine reads back.
    pub async fn update_work_hours(
        &self,
        dentist_id: &str,
        schedule: &WeekSchedule,
        auth_token: &str,
    ) -> Result<Dentist, DentistError> {
        debug!("Updating work hours for dentist: {}", dentist_id);

        let work_hours = enabled_days_only(schedule);
        let update_data = json!({
            "work_hours": work_hours,
            "updated_at": Utc::now().to_rfc3339()
        });

        self.patch_dentist(dentist_id, update_data, auth_token).await
    }

    pub async fn delete_dentist(&self, dentist_id: &str, auth_token: &str) -> Result<(), DentistError> {
        debug!("Deleting dentist: {}", dentist_id);

        let path = format!("/rest/v1/dentists?id=eq.{}", dentist_id);
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
            return Err(DentistError::NotFound);
        }

        Ok(())
    }

    // Private helper methods

    async fn patch_dentist(
        &self,
        dentist_id: &str,
        body: Value,
        auth_token: &str,
    ) -> Result<Dentist, DentistError> {
        let path = format!("/rest/v1/dentists?id=eq.{}", dentist_id);
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static("return=representation"),
        );

        let result: Vec<Value> = self
            .supabase
            .request_with_headers(Method::PATCH, &path, Some(auth_token), Some(body), Some(headers))
            .await?;

        result
            .into_iter()
            .next()
            .map(serde_json::from_value)
            .transpose()
            .map_err(anyhow::Error::from)?
            .ok_or(DentistError::NotFound)
    }

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

    async fn count_dentists(&self, clinic_id: &str, auth_token: &str) -> Result<i64> {
        let path = format!("/rest/v1/dentists?clinic_id=eq.{}&select=id", clinic_id);

        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        Ok(result.len() as i64)
    }
}

fn enabled_days_only(schedule: &WeekSchedule) -> WeekSchedule {
    let keep = |day: &Option<DayHours>| {
        day.as_ref()
            .filter(|hours| hours.is_enabled())
            .map(|hours| DayHours::new(&hours.start, &hours.end))
    };

    WeekSchedule {
        sunday: keep(&schedule.sunday),
        monday: keep(&schedule.monday),
        tuesday: keep(&schedule.tuesday),
        wednesday: keep(&schedule.wednesday),
        thursday: keep(&schedule.thursday),
        friday: keep(&schedule.friday),
        saturday: keep(&schedule.saturday),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_days_are_dropped_on_save() {
        let mut submitted = WeekSchedule::standard_week();
        submitted.saturday = Some(DayHours {
            start: "08:00".to_string(),
            end: "12:00".to_string(),
            enabled: Some(false),
        });

        let saved = enabled_days_only(&submitted);

        assert!(saved.saturday.is_none());
        assert!(saved.monday.is_some());
        // The flag itself is not persisted
        assert!(saved.monday.unwrap().enabled.is_none());
    }
}
