use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use scheduling_cell::models::WeekSchedule;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dentist {
    pub id: Uuid,
    pub clinic_id: Uuid,
    pub full_name: String,
    pub specialty: Option<String>,
    /// Regional dental-council registration number.
    pub cro_number: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub work_hours: Option<WeekSchedule>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDentistRequest {
    pub clinic_id: Uuid,
    pub full_name: String,
    pub specialty: Option<String>,
    pub cro_number: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateDentistRequest {
    pub full_name: Option<String>,
    pub specialty: Option<String>,
    pub cro_number: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// The work-hours form submits all seven days; only the enabled ones are
/// persisted.
pub type UpdateWorkHoursRequest = WeekSchedule;

#[derive(Debug, Error)]
pub enum DentistError {
    #[error("Your plan allows at most {limit} dentists. Upgrade to continue.")]
    LimitReached { limit: i64 },

    #[error("Dentist not found")]
    NotFound,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
