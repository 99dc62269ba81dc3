use anyhow::Result;
use reqwest::Method;
use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::engine::{compute_clinic_availability, compute_slots, SlotComputation};
use crate::models::{
    BookedAppointment, DentistAvailability, DentistSchedule, SchedulePolicy, Slot,
    SlotQueryRequest, WeekSchedule, DEFAULT_APPOINTMENT_DURATION_MINUTES,
    SLOT_GRANULARITY_MINUTES,
};

/// Fetches the three availability inputs (closure policy, work hours,
/// booked appointments) fresh per request and feeds them to the engine.
pub struct AvailabilityService {
    supabase: SupabaseClient,
}

impl AvailabilityService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    /// Clinic-wide slot grid for one date, optionally narrowed to a single
    /// dentist's hours and bookings.
    pub async fn get_clinic_slots(
        &self,
        clinic_id: &str,
        query: &SlotQueryRequest,
        auth_token: Option<&str>,
    ) -> Result<Vec<Slot>> {
        debug!("Computing slots for clinic {} on {}", clinic_id, query.date);

        let policy = self.get_schedule_policy(clinic_id, auth_token).await?;
        let clinic_hours = self.get_clinic_hours(clinic_id, auth_token).await?;
        let bookings = self
            .get_booked_appointments(clinic_id, query, auth_token)
            .await?;

        let dentist_hours = match query.dentist_id {
            Some(dentist_id) => self.get_dentist_work_hours(&dentist_id, auth_token).await?,
            None => None,
        };

        let input = SlotComputation {
            date: query.date,
            policy: &policy,
            dentist_hours: dentist_hours.as_ref(),
            clinic_hours: clinic_hours.as_ref(),
            dentist_id: query.dentist_id,
            bookings: &bookings,
            duration_minutes: query
                .duration
                .unwrap_or(DEFAULT_APPOINTMENT_DURATION_MINUTES),
            granularity_minutes: SLOT_GRANULARITY_MINUTES,
        };

        let slots = compute_slots(&input);
        debug!("Computed {} candidate slots", slots.len());

        Ok(slots)
    }

    /// Per-dentist slot grids for a clinic date.
    pub async fn get_dentist_availability(
        &self,
        clinic_id: &str,
        query: &SlotQueryRequest,
        auth_token: Option<&str>,
    ) -> Result<Vec<DentistAvailability>> {
        debug!(
            "Computing per-dentist availability for clinic {} on {}",
            clinic_id, query.date
        );

        let policy = self.get_schedule_policy(clinic_id, auth_token).await?;
        let clinic_hours = self.get_clinic_hours(clinic_id, auth_token).await?;
        let dentists = self
            .get_dentist_schedules(clinic_id, query.dentist_id, auth_token)
            .await?;
        let bookings = self
            .get_booked_appointments(clinic_id, query, auth_token)
            .await?;

        Ok(compute_clinic_availability(
            query.date,
            &policy,
            clinic_hours.as_ref(),
            &dentists,
            &bookings,
            query
                .duration
                .unwrap_or(DEFAULT_APPOINTMENT_DURATION_MINUTES),
            SLOT_GRANULARITY_MINUTES,
        ))
    }

    // Private helper methods

    async fn get_schedule_policy(
        &self,
        clinic_id: &str,
        auth_token: Option<&str>,
    ) -> Result<SchedulePolicy> {
        let path = format!(
            "/rest/v1/clinic_settings?clinic_id=eq.{}&setting_key=eq.schedule_blocks&select=setting_value",
            clinic_id
        );

        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, auth_token, None)
            .await?;

        let policy = result
            .into_iter()
            .next()
            .and_then(|row| serde_json::from_value(row["setting_value"].clone()).ok());

        Ok(policy.unwrap_or_else(|| {
            debug!("No schedule_blocks setting for clinic {}, using defaults", clinic_id);
            SchedulePolicy::default()
        }))
    }

    async fn get_clinic_hours(
        &self,
        clinic_id: &str,
        auth_token: Option<&str>,
    ) -> Result<Option<WeekSchedule>> {
        let path = format!(
            "/rest/v1/clinic_settings?clinic_id=eq.{}&setting_key=eq.schedule&select=setting_value",
            clinic_id
        );

        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, auth_token, None)
            .await?;

        Ok(result
            .into_iter()
            .next()
            .and_then(|row| serde_json::from_value(row["setting_value"].clone()).ok()))
    }

    async fn get_dentist_work_hours(
        &self,
        dentist_id: &Uuid,
        auth_token: Option<&str>,
    ) -> Result<Option<WeekSchedule>> {
        let path = format!("/rest/v1/dentists?id=eq.{}&select=work_hours", dentist_id);

        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, auth_token, None)
            .await?;

        Ok(result
            .into_iter()
            .next()
            .and_then(|row| serde_json::from_value(row["work_hours"].clone()).ok()))
    }

    async fn get_dentist_schedules(
        &self,
        clinic_id: &str,
        dentist_id: Option<Uuid>,
        auth_token: Option<&str>,
    ) -> Result<Vec<DentistSchedule>> {
        let mut path = format!(
            "/rest/v1/dentists?clinic_id=eq.{}&select=id,full_name,work_hours&order=full_name.asc",
            clinic_id
        );

        if let Some(dentist_id) = dentist_id {
            path.push_str(&format!("&id=eq.{}", dentist_id));
        }

        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, auth_token, None)
            .await?;

        let dentists: Vec<DentistSchedule> = result
            .into_iter()
            .filter_map(|row| match serde_json::from_value(row) {
                Ok(dentist) => Some(dentist),
                Err(e) => {
                    warn!("Skipping dentist row with unreadable schedule: {}", e);
                    None
                }
            })
            .collect();

        Ok(dentists)
    }

    async fn get_booked_appointments(
        &self,
        clinic_id: &str,
        query: &SlotQueryRequest,
        auth_token: Option<&str>,
    ) -> Result<Vec<BookedAppointment>> {
        let path = format!(
            "/rest/v1/appointments?clinic_id=eq.{}&date=eq.{}&status=neq.cancelled&select=dentist_id,time,duration,status&order=time.asc",
            clinic_id, query.date
        );

        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, auth_token, None)
            .await?;

        let bookings: Vec<BookedAppointment> = result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<std::result::Result<Vec<BookedAppointment>, _>>()?;

        Ok(bookings)
    }
}
