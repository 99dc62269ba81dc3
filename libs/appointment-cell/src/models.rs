use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Assumed appointment length when a row or request does not carry one.
pub const DEFAULT_DURATION_MINUTES: i32 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled,
    Confirmed,
    Completed,
    Cancelled,
    NoShow,
}

impl AppointmentStatus {
    /// Cancelled is the one terminal state that frees the booked time.
    pub fn occupies_time(&self) -> bool {
        !matches!(self, AppointmentStatus::Cancelled)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub clinic_id: Uuid,
    pub patient_id: Uuid,
    pub dentist_id: Option<Uuid>,
    pub date: NaiveDate,
    /// Wall-clock start time as stored, "HH:MM".
    pub time: String,
    pub duration: Option<i32>,
    pub status: AppointmentStatus,
    pub treatment_type: Option<String>,
    pub price: Option<f64>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAppointmentRequest {
    pub clinic_id: Uuid,
    pub patient_id: Uuid,
    pub dentist_id: Option<Uuid>,
    pub date: NaiveDate,
    pub time: String,
    pub duration: Option<i32>,
    pub treatment_type: Option<String>,
    pub price: Option<f64>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateAppointmentRequest {
    pub dentist_id: Option<Uuid>,
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
    pub duration: Option<i32>,
    pub status: Option<AppointmentStatus>,
    pub treatment_type: Option<String>,
    pub price: Option<f64>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppointmentListQuery {
    pub date: Option<NaiveDate>,
    pub dentist_id: Option<Uuid>,
}

/// A visitor's self-booking submission, held until the clinic decides.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentRequest {
    pub id: Uuid,
    pub clinic_id: Uuid,
    pub patient_name: String,
    pub patient_phone: String,
    pub treatment_type: Option<String>,
    pub preferred_date: NaiveDate,
    pub preferred_time: String,
    pub preferred_dentist_id: Option<Uuid>,
    pub notes: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicBookingRequest {
    pub patient_name: String,
    pub patient_phone: String,
    pub treatment_type: Option<String>,
    pub preferred_date: NaiveDate,
    pub preferred_time: String,
    pub preferred_dentist_id: Option<Uuid>,
    pub notes: Option<String>,
}

/// Named service with a price, picked during booking and copied onto the
/// appointment at approval time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreatmentType {
    pub id: Uuid,
    pub clinic_id: Uuid,
    pub name: String,
    pub price: Option<f64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTreatmentTypeRequest {
    pub clinic_id: Uuid,
    pub name: String,
    pub price: Option<f64>,
}

#[derive(Debug, Error)]
pub enum AppointmentError {
    #[error("The selected time conflicts with an existing appointment")]
    SlotTaken,

    #[error("Appointment not found")]
    NotFound,

    #[error("Booking request not found")]
    RequestNotFound,

    #[error("Online booking is not available on the {plan} plan")]
    OnlineBookingUnavailable { plan: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
