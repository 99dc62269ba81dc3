use anyhow::Result;
use reqwest::Method;
use serde_json::Value;
use tracing::debug;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_models::plan::PlanLimits;

use crate::models::{CurrentCounts, PlanUsage};

/// Counts what the clinic is using against what its plan allows.
pub struct LimitsService {
    supabase: SupabaseClient,
}

impl LimitsService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn get_usage(&self, clinic_id: &str, auth_token: &str) -> Result<PlanUsage> {
        debug!("Computing plan usage for clinic {}", clinic_id);

        let plan = self.clinic_plan(clinic_id, auth_token).await?;
        let limits = PlanLimits::for_plan(Some(&plan));

        let current = CurrentCounts {
            patients: self.count_rows("patients", clinic_id, auth_token).await?,
            dentists: self.count_rows("dentists", clinic_id, auth_token).await?,
            rooms: self.count_rooms(clinic_id, auth_token).await?,
        };

        Ok(PlanUsage {
            can_add_patient: PlanLimits::allows(limits.patients, current.patients),
            can_add_dentist: PlanLimits::allows(limits.dentists, current.dentists),
            can_add_room: PlanLimits::allows(limits.rooms, current.rooms),
            online_booking: limits.online_booking,
            plan,
            limits,
            current,
        })
    }

    /// Whether the clinic's public self-booking page is switched on. Read
    /// with the anon key so the page itself can ask.
    pub async fn online_booking_available(&self, clinic_id: &str) -> Result<(bool, String)> {
        let path = format!(
            "/rest/v1/clinics?id=eq.{}&select=subscription_plan,subscription_active",
            clinic_id
        );

        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, None, None)
            .await?;

        let plan = result
            .first()
            .and_then(|row| row["subscription_plan"].as_str())
            .unwrap_or("basic")
            .to_string();
        let active = result
            .first()
            .map(|row| row["subscription_active"].as_bool() != Some(false))
            .unwrap_or(false);

        let available = active && PlanLimits::for_plan(Some(&plan)).online_booking;
        Ok((available, plan))
    }

    // Private helper methods

    async fn clinic_plan(&self, clinic_id: &str, auth_token: &str) -> Result<String> {
        let path = format!(
            "/rest/v1/clinics?id=eq.{}&select=subscription_plan",
            clinic_id
        );

        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        Ok(result
            .first()
            .and_then(|row| row["subscription_plan"].as_str())
            .unwrap_or("basic")
            .to_string())
    }

    async fn count_rows(&self, table: &str, clinic_id: &str, auth_token: &str) -> Result<i64> {
        let path = format!("/rest/v1/{}?clinic_id=eq.{}&select=id", table, clinic_id);

        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        Ok(result.len() as i64)
    }

    async fn count_rooms(&self, clinic_id: &str, auth_token: &str) -> Result<i64> {
        let path = format!(
            "/rest/v1/clinic_settings?clinic_id=eq.{}&setting_key=eq.rooms&select=setting_value",
            clinic_id
        );

        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        Ok(result
            .first()
            .and_then(|row| row["setting_value"].as_array())
            .map(|rooms| rooms.len() as i64)
            .unwrap_or(0))
    }
}
