use anyhow::{anyhow, Result};
use chrono::{Duration, Utc};
use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{Clinic, ClinicMembership, CreateClinicRequest, PublicClinic, UpdateClinicRequest};

/// Number of days a freshly created clinic can use the app before a
/// subscription is required.
const TRIAL_DAYS: i64 = 30;

pub struct ClinicService {
    supabase: SupabaseClient,
}

impl ClinicService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    /// Create the clinic and enroll the creating user as its owner.
    pub async fn create_clinic(
        &self,
        owner_id: &str,
        request: CreateClinicRequest,
        auth_token: &str,
    ) -> Result<Clinic> {
        debug!("Creating clinic {} for user {}", request.name, owner_id);

        let trial_end = (Utc::now() + Duration::days(TRIAL_DAYS)).date_naive();
        let clinic_data = json!({
            "owner_id": owner_id,
            "name": request.name,
            "phone": request.phone,
            "address": request.address,
            "email": request.email,
            "public_code": generate_public_code(&request.name),
            "subscription_plan": "basic",
            "trial_end_date": trial_end.format("%Y-%m-%d").to_string(),
            "created_at": Utc::now().to_rfc3339(),
            "updated_at": Utc::now().to_rfc3339()
        });

        let result = self
            .supabase
            .insert_returning("/rest/v1/clinics", Some(auth_token), clinic_data)
            .await?;

        let clinic: Clinic = result
            .into_iter()
            .next()
            .map(serde_json::from_value)
            .transpose()?
            .ok_or_else(|| anyhow!("Failed to create clinic"))?;

        let member_data = json!({
            "clinic_id": clinic.id,
            "user_id": owner_id,
            "role": "owner"
        });

        let _: Vec<Value> = self
            .supabase
            .insert_returning("/rest/v1/clinic_members", Some(auth_token), member_data)
            .await?;

        debug!("Clinic created with ID: {}", clinic.id);
        Ok(clinic)
    }

    /// Which clinic the authenticated user belongs to. This is the tenant
    /// lookup every other screen starts from.
    pub async fn resolve_membership(
        &self,
        user_id: &str,
        auth_token: &str,
    ) -> Result<ClinicMembership> {
        let path = format!(
            "/rest/v1/clinic_members?user_id=eq.{}&select=clinic_id,role",
            user_id
        );

        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        result
            .into_iter()
            .next()
            .map(serde_json::from_value)
            .transpose()?
            .ok_or_else(|| anyhow!("User is not a member of any clinic"))
    }

    pub async fn get_clinic(&self, clinic_id: &str, auth_token: &str) -> Result<Clinic> {
        let path = format!("/rest/v1/clinics?id=eq.{}", clinic_id);

        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        result
            .into_iter()
            .next()
            .map(serde_json::from_value)
            .transpose()?
            .ok_or_else(|| anyhow!("Clinic not found"))
    }

    pub async fn update_clinic(
        &self,
        clinic_id: &str,
        request: UpdateClinicRequest,
        auth_token: &str,
    ) -> Result<Clinic> {
        debug!("Updating clinic: {}", clinic_id);

        let mut update_data = serde_json::Map::new();

        if let Some(name) = request.name {
            update_data.insert("name".to_string(), json!(name));
        }
        if let Some(phone) = request.phone {
            update_data.insert("phone".to_string(), json!(phone));
        }
        if let Some(address) = request.address {
            update_data.insert("address".to_string(), json!(address));
        }
        if let Some(email) = request.email {
            update_data.insert("email".to_string(), json!(email));
        }

        update_data.insert("updated_at".to_string(), json!(Utc::now().to_rfc3339()));

        let path = format!("/rest/v1/clinics?id=eq.{}", clinic_id);
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
            .transpose()?
            .ok_or_else(|| anyhow!("Failed to update clinic"))
    }

    /// Lookup used by the public booking page; reads with the anon key only.
    pub async fn get_clinic_by_public_code(&self, public_code: &str) -> Result<PublicClinic> {
        let path = format!(
            "/rest/v1/clinics?public_code=eq.{}&select=id,name,phone,subscription_plan,subscription_active",
            public_code
        );

        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, None, None)
            .await?;

        result
            .into_iter()
            .next()
            .map(serde_json::from_value)
            .transpose()?
            .ok_or_else(|| anyhow!("Clinic not found"))
    }
}

/// Slug of the clinic name plus a short random suffix, unique enough for a
/// booking URL without a round-trip to check collisions.
fn generate_public_code(name: &str) -> String {
    let slug: String = name
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-");

    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}-{}", slug, &suffix[..6])
}
