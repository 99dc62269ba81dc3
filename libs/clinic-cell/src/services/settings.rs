use anyhow::{anyhow, Result};
use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{ClinicSetting, SETTING_KEYS};

/// Typed access to the per-clinic settings table. Rows are keyed by
/// `(clinic_id, setting_key)` and hold free-form JSON values.
pub struct SettingsService {
    supabase: SupabaseClient,
}

impl SettingsService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn get_setting(
        &self,
        clinic_id: &str,
        key: &str,
        auth_token: &str,
    ) -> Result<Option<ClinicSetting>> {
        validate_key(key)?;

        let path = format!(
            "/rest/v1/clinic_settings?clinic_id=eq.{}&setting_key=eq.{}",
            clinic_id, key
        );

        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        result
            .into_iter()
            .next()
            .map(serde_json::from_value)
            .transpose()
            .map_err(Into::into)
    }

    pub async fn upsert_setting(
        &self,
        clinic_id: &str,
        key: &str,
        value: Value,
        auth_token: &str,
    ) -> Result<ClinicSetting> {
        validate_key(key)?;
        debug!("Upserting setting {} for clinic {}", key, clinic_id);

        let body = json!({
            "clinic_id": clinic_id,
            "setting_key": key,
            "setting_value": value
        });

        let result = self
            .supabase
            .upsert(
                "/rest/v1/clinic_settings?on_conflict=clinic_id,setting_key",
                Some(auth_token),
                body,
            )
            .await?;

        result
            .into_iter()
            .next()
            .map(serde_json::from_value)
            .transpose()?
            .ok_or_else(|| anyhow!("Failed to save setting"))
    }
}

fn validate_key(key: &str) -> Result<()> {
    if SETTING_KEYS.contains(&key) {
        Ok(())
    } else {
        Err(anyhow!("Unknown setting key: {}", key))
    }
}
