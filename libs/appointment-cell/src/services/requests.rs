use anyhow::{anyhow, Result};
use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_models::plan::PlanLimits;

use crate::models::{
    Appointment, AppointmentError, AppointmentRequest, PublicBookingRequest,
    DEFAULT_DURATION_MINUTES,
};

/// Self-booking requests from the public page: gated by the clinic's plan
/// on the way in, turned into real appointments when the clinic approves.
pub struct BookingRequestService {
    supabase: SupabaseClient,
}

impl BookingRequestService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    /// Visitor submission. Runs with the anon key only; the clinic's plan
    /// decides whether the page is allowed to book at all.
    pub async fn submit_request(
        &self,
        clinic_id: &str,
        request: PublicBookingRequest,
    ) -> Result<AppointmentRequest, AppointmentError> {
        debug!("Public booking request for clinic {}", clinic_id);

        self.ensure_online_booking(clinic_id).await?;

        let request_data = json!({
            "clinic_id": clinic_id,
            "patient_name": request.patient_name,
            "patient_phone": request.patient_phone,
            "treatment_type": request.treatment_type,
            "preferred_date": request.preferred_date,
            "preferred_time": request.preferred_time,
            "preferred_dentist_id": request.preferred_dentist_id,
            "notes": request.notes,
            "status": "pending",
            "created_at": Utc::now().to_rfc3339()
        });

        let result = self
            .supabase
            .insert_returning("/rest/v1/appointment_requests", None, request_data)
            .await?;

        result
            .into_iter()
            .next()
            .map(serde_json::from_value)
            .transpose()
            .map_err(anyhow::Error::from)?
            .ok_or_else(|| anyhow!("Failed to submit booking request").into())
    }

    pub async fn list_pending(
        &self,
        clinic_id: &str,
        auth_token: &str,
    ) -> Result<Vec<AppointmentRequest>> {
        let path = format!(
            "/rest/v1/appointment_requests?clinic_id=eq.{}&status=eq.pending&order=created_at.desc",
            clinic_id
        );

        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        let requests = result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<std::result::Result<Vec<AppointmentRequest>, _>>()?;

        Ok(requests)
    }

    /// Approval: reuse the patient with that phone number or register one,
    /// price the appointment from the chosen treatment, book it, and drop
    /// the request.
    pub async fn approve_request(
        &self,
        request_id: &str,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        debug!("Approving booking request: {}", request_id);

        let request = self.get_request(request_id, auth_token).await?;
        let clinic_id = request.clinic_id.to_string();

        let patient_id = self
            .find_or_create_patient(&clinic_id, &request.patient_name, &request.patient_phone, auth_token)
            .await?;

        let price = match &request.treatment_type {
            Some(name) => self.treatment_price(&clinic_id, name, auth_token).await?,
            None => None,
        };

        let appointment_data = json!({
            "clinic_id": request.clinic_id,
            "patient_id": patient_id,
            "dentist_id": request.preferred_dentist_id,
            "date": request.preferred_date,
            "time": request.preferred_time,
            "duration": DEFAULT_DURATION_MINUTES,
            "status": "scheduled",
            "treatment_type": request.treatment_type,
            "price": price,
            "notes": request.notes,
            "created_at": Utc::now().to_rfc3339(),
            "updated_at": Utc::now().to_rfc3339()
        });

        let result = self
            .supabase
            .insert_returning("/rest/v1/appointments", Some(auth_token), appointment_data)
            .await?;

        let appointment: Appointment = result
            .into_iter()
            .next()
            .map(serde_json::from_value)
            .transpose()
            .map_err(anyhow::Error::from)?
            .ok_or_else(|| anyhow!("Failed to create appointment from request"))?;

        self.delete_request(request_id, auth_token).await?;

        Ok(appointment)
    }

    pub async fn reject_request(
        &self,
        request_id: &str,
        auth_token: &str,
    ) -> Result<AppointmentRequest, AppointmentError> {
        debug!("Rejecting booking request: {}", request_id);

        let path = format!("/rest/v1/appointment_requests?id=eq.{}", request_id);
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static("return=representation"),
        );

        let body = json!({ "status": "rejected" });

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
            .ok_or(AppointmentError::RequestNotFound)
    }

    // Private helper methods

    /// Premium and enterprise plans include the public page; a clinic whose
    /// subscription lapsed loses it even on those plans.
    async fn ensure_online_booking(&self, clinic_id: &str) -> Result<(), AppointmentError> {
        let path = format!(
            "/rest/v1/clinics?id=eq.{}&select=subscription_plan,subscription_active",
            clinic_id
        );

        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, None, None)
            .await?;

        let clinic = result
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("Clinic not found"))?;

        let plan = clinic["subscription_plan"]
            .as_str()
            .unwrap_or("basic")
            .to_string();
        let active = clinic["subscription_active"].as_bool() != Some(false);

        if !active || !PlanLimits::for_plan(Some(&plan)).online_booking {
            return Err(AppointmentError::OnlineBookingUnavailable { plan });
        }

        Ok(())
    }

    async fn get_request(
        &self,
        request_id: &str,
        auth_token: &str,
    ) -> Result<AppointmentRequest, AppointmentError> {
        let path = format!("/rest/v1/appointment_requests?id=eq.{}", request_id);

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
            .ok_or(AppointmentError::RequestNotFound)
    }

    async fn find_or_create_patient(
        &self,
        clinic_id: &str,
        name: &str,
        phone: &str,
        auth_token: &str,
    ) -> Result<Uuid> {
        let lookup_path = format!(
            "/rest/v1/patients?clinic_id=eq.{}&phone=eq.{}&select=id",
            clinic_id, phone
        );

        let existing: Vec<Value> = self
            .supabase
            .request(Method::GET, &lookup_path, Some(auth_token), None)
            .await?;

        if let Some(row) = existing.first() {
            return serde_json::from_value(row["id"].clone()).map_err(Into::into);
        }

        debug!("Registering new patient {} from booking request", name);

        let patient_data = json!({
            "clinic_id": clinic_id,
            "full_name": name,
            "phone": phone,
            "created_at": Utc::now().to_rfc3339(),
            "updated_at": Utc::now().to_rfc3339()
        });

        let created = self
            .supabase
            .insert_returning("/rest/v1/patients", Some(auth_token), patient_data)
            .await?;

        created
            .first()
            .map(|row| serde_json::from_value(row["id"].clone()))
            .transpose()?
            .ok_or_else(|| anyhow!("Failed to register patient from booking request"))
    }

    async fn treatment_price(
        &self,
        clinic_id: &str,
        treatment_name: &str,
        auth_token: &str,
    ) -> Result<Option<f64>> {
        let path = format!(
            "/rest/v1/treatment_types?clinic_id=eq.{}&name=eq.{}&select=price",
            clinic_id, treatment_name
        );

        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        Ok(result.first().and_then(|row| row["price"].as_f64()))
    }

    async fn delete_request(&self, request_id: &str, auth_token: &str) -> Result<()> {
        let path = format!("/rest/v1/appointment_requests?id=eq.{}", request_id);
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static("return=representation"),
        );

        let _: Vec<Value> = self
            .supabase
            .request_with_headers(Method::DELETE, &path, Some(auth_token), None, Some(headers))
            .await?;

        Ok(())
    }
}
