use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Clinic {
    pub id: Uuid,
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub email: Option<String>,
    /// Short identifier embedded in the public self-booking URL.
    pub public_code: Option<String>,
    pub subscription_plan: Option<String>,
    pub subscription_active: Option<bool>,
    pub trial_end_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateClinicRequest {
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateClinicRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub email: Option<String>,
}

/// Link between an authenticated user and the clinic they belong to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClinicMembership {
    pub clinic_id: Uuid,
    pub role: String,
}

/// What the public booking page is allowed to see about a clinic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicClinic {
    pub id: Uuid,
    pub name: String,
    pub phone: Option<String>,
    pub subscription_plan: Option<String>,
    pub subscription_active: Option<bool>,
}

/// One row of the `(clinic_id, setting_key)` settings table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClinicSetting {
    pub clinic_id: Uuid,
    pub setting_key: String,
    pub setting_value: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertSettingRequest {
    pub value: serde_json::Value,
}

/// Setting keys the application reads; anything else is rejected.
pub const SETTING_KEYS: &[&str] = &["schedule_blocks", "schedule", "rooms"];
