use anyhow::{anyhow, Result};
use chrono::{NaiveDate, Utc};
use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use scheduling_cell::engine::booking_conflicts;
use scheduling_cell::models::{parse_hhmm, BookedAppointment};
use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{
    Appointment, AppointmentError, AppointmentListQuery, CreateAppointmentRequest,
    UpdateAppointmentRequest, DEFAULT_DURATION_MINUTES,
};

pub struct BookingService {
    supabase: SupabaseClient,
}

impl BookingService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn create_appointment(
        &self,
        request: CreateAppointmentRequest,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        debug!(
            "Booking appointment for patient {} on {} {}",
            request.patient_id, request.date, request.time
        );

        let duration = request.duration.unwrap_or(DEFAULT_DURATION_MINUTES);
        self.ensure_slot_free(
            &request.clinic_id.to_string(),
            request.date,
            &request.time,
            duration,
            request.dentist_id,
            None,
            auth_token,
        )
        .await?;

        let appointment_data = json!({
            "clinic_id": request.clinic_id,
            "patient_id": request.patient_id,
            "dentist_id": request.dentist_id,
            "date": request.date,
            "time": request.time,
            "duration": duration,
            "status": "scheduled",
            "treatment_type": request.treatment_type,
            "price": request.price,
            "notes": request.notes,
            "created_at": Utc::now().to_rfc3339(),
            "updated_at": Utc::now().to_rfc3339()
        });

        let result = self
            .supabase
            .insert_returning("/rest/v1/appointments", Some(auth_token), appointment_data)
            .await?;

        let appointment = result
            .into_iter()
            .next()
            .map(serde_json::from_value)
            .transpose()
            .map_err(anyhow::Error::from)?
            .ok_or_else(|| anyhow!("Failed to book appointment"))?;

        Ok(appointment)
    }

    pub async fn get_appointment(
        &self,
        appointment_id: &str,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);

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
            .ok_or(AppointmentError::NotFound)
    }

    pub async fn list_appointments(
        &self,
        clinic_id: &str,
        query: &AppointmentListQuery,
        auth_token: &str,
    ) -> Result<Vec<Appointment>> {
        let mut path = format!(
            "/rest/v1/appointments?clinic_id=eq.{}&order=date.asc,time.asc",
            clinic_id
        );

        if let Some(date) = query.date {
            path.push_str(&format!("&date=eq.{}", date));
        }
        if let Some(dentist_id) = query.dentist_id {
            path.push_str(&format!("&dentist_id=eq.{}", dentist_id));
        }

        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        let appointments = result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<std::result::Result<Vec<Appointment>, _>>()?;

        Ok(appointments)
    }

    pub async fn update_appointment(
        &self,
        appointment_id: &str,
        request: UpdateAppointmentRequest,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        debug!("Updating appointment: {}", appointment_id);

        let current = self.get_appointment(appointment_id, auth_token).await?;

        // Rescheduling re-runs the conflict check against the target day,
        // skipping the appointment's own row
        let moves = request.date.is_some()
            || request.time.is_some()
            || request.duration.is_some()
            || request.dentist_id.is_some();

        if moves {
            let date = request.date.unwrap_or(current.date);
            let time = request.time.clone().unwrap_or_else(|| current.time.clone());
            let duration = request
                .duration
                .or(current.duration)
                .unwrap_or(DEFAULT_DURATION_MINUTES);
            let dentist_id = request.dentist_id.or(current.dentist_id);

            self.ensure_slot_free(
                &current.clinic_id.to_string(),
                date,
                &time,
                duration,
                dentist_id,
                Some(appointment_id),
                auth_token,
            )
            .await?;
        }

        let mut update_data = serde_json::Map::new();

        if let Some(dentist_id) = request.dentist_id {
            update_data.insert("dentist_id".to_string(), json!(dentist_id));
        }
        if let Some(date) = request.date {
            update_data.insert("date".to_string(), json!(date));
        }
        if let Some(time) = request.time {
            update_data.insert("time".to_string(), json!(time));
        }
        if let Some(duration) = request.duration {
            update_data.insert("duration".to_string(), json!(duration));
        }
        if let Some(status) = request.status {
            update_data.insert("status".to_string(), json!(status));
        }
        if let Some(treatment_type) = request.treatment_type {
            update_data.insert("treatment_type".to_string(), json!(treatment_type));
        }
        if let Some(price) = request.price {
            update_data.insert("price".to_string(), json!(price));
        }
        if let Some(notes) = request.notes {
            update_data.insert("notes".to_string(), json!(notes));
        }

        update_data.insert("updated_at".to_string(), json!(Utc::now().to_rfc3339()));

        self.patch_appointment(appointment_id, Value::Object(update_data), auth_token)
            .await
    }

    /// Cancellation is terminal and releases the slot for rebooking.
    pub async fn cancel_appointment(
        &self,
        appointment_id: &str,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        debug!("Cancelling appointment: {}", appointment_id);

        let update_data = json!({
            "status": "cancelled",
            "updated_at": Utc::now().to_rfc3339()
        });

        self.patch_appointment(appointment_id, update_data, auth_token)
            .await
    }

    // Private helper methods

    async fn patch_appointment(
        &self,
        appointment_id: &str,
        body: Value,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
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
            .ok_or(AppointmentError::NotFound)
    }

    /// Conflict gate shared with the availability grid: the day's
    /// non-cancelled bookings are fetched and the requested window is
    /// tested with the same overlap rule that marked slots unavailable.
    #[allow(clippy::too_many_arguments)]
    async fn ensure_slot_free(
        &self,
        clinic_id: &str,
        date: NaiveDate,
        time: &str,
        duration: i32,
        dentist_id: Option<Uuid>,
        exclude_id: Option<&str>,
        auth_token: &str,
    ) -> Result<(), AppointmentError> {
        let start = parse_hhmm(time)
            .ok_or_else(|| anyhow!("Invalid appointment time: {}", time))?;

        let mut path = format!(
            "/rest/v1/appointments?clinic_id=eq.{}&date=eq.{}&status=neq.cancelled&select=id,dentist_id,time,duration,status",
            clinic_id, date
        );
        if let Some(id) = exclude_id {
            path.push_str(&format!("&id=neq.{}", id));
        }

        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        let bookings = result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<std::result::Result<Vec<BookedAppointment>, _>>()
            .map_err(anyhow::Error::from)?;

        if booking_conflicts(&bookings, dentist_id, start, duration) {
            return Err(AppointmentError::SlotTaken);
        }

        Ok(())
    }
}
