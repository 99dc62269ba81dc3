use anyhow::Result;
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, warn};

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::SubscriptionStatus;
use crate::services::stripe::StripeClient;

/// Port of the subscription refresh: find the clinic of the caller, ask
/// Stripe what they are paying for, remember the answer in the
/// `subscriptions` table and report it back.
pub struct SubscriptionService {
    supabase: SupabaseClient,
    stripe: StripeClient,
    billing_configured: bool,
}

impl SubscriptionService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            stripe: StripeClient::new(config),
            billing_configured: config.is_billing_configured(),
        }
    }

    pub async fn check_subscription(
        &self,
        user_id: &str,
        email: &str,
        auth_token: &str,
    ) -> Result<SubscriptionStatus> {
        debug!("Checking subscription for user {}", user_id);

        let clinic_id = match self.user_clinic(user_id, auth_token).await? {
            Some(clinic_id) => clinic_id,
            None => {
                debug!("No clinic found for user {}", user_id);
                return Ok(SubscriptionStatus::none());
            }
        };

        if !self.billing_configured {
            warn!("Stripe not configured, falling back to trial check");
            return self.trial_status(&clinic_id, auth_token).await;
        }

        let customer = self.stripe.find_customer_by_email(email).await?;
        let customer = match customer {
            Some(customer) => customer,
            None => {
                debug!("No Stripe customer for {}", email);
                return self.trial_status(&clinic_id, auth_token).await;
            }
        };

        match self.stripe.find_active_subscription(&customer.id).await? {
            Some(subscription) => {
                let tier = subscription.tier().to_string();
                let period_end = epoch_to_rfc3339(subscription.current_period_end);
                debug!("Active {} subscription found for clinic {}", tier, clinic_id);

                self.store_subscription(
                    &clinic_id,
                    json!({
                        "clinic_id": clinic_id,
                        "stripe_customer_id": customer.id,
                        "stripe_subscription_id": subscription.id,
                        "plan_name": tier,
                        "status": "active",
                        "current_period_start": epoch_to_rfc3339(subscription.current_period_start),
                        "current_period_end": period_end.clone(),
                        "updated_at": Utc::now().to_rfc3339()
                    }),
                    auth_token,
                )
                .await?;

                Ok(SubscriptionStatus {
                    subscribed: true,
                    subscription_tier: Some(tier),
                    subscription_end: period_end,
                    trial_active: false,
                    trial_end: None,
                })
            }
            None => {
                debug!("Customer {} has no active subscription", customer.id);

                self.store_subscription(
                    &clinic_id,
                    json!({
                        "clinic_id": clinic_id,
                        "stripe_customer_id": customer.id,
                        "plan_name": "basic",
                        "status": "inactive",
                        "updated_at": Utc::now().to_rfc3339()
                    }),
                    auth_token,
                )
                .await?;

                Ok(SubscriptionStatus::none())
            }
        }
    }

    // Private helper methods

    async fn user_clinic(&self, user_id: &str, auth_token: &str) -> Result<Option<String>> {
        let path = format!(
            "/rest/v1/clinic_members?user_id=eq.{}&select=clinic_id",
            user_id
        );

        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        Ok(result
            .first()
            .and_then(|row| row["clinic_id"].as_str())
            .map(str::to_string))
    }

    /// No paying customer: the clinic may still be inside its trial window.
    async fn trial_status(&self, clinic_id: &str, auth_token: &str) -> Result<SubscriptionStatus> {
        let path = format!(
            "/rest/v1/clinics?id=eq.{}&select=trial_end_date",
            clinic_id
        );

        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        let trial_end = result
            .first()
            .and_then(|row| row["trial_end_date"].as_str())
            .map(str::to_string);

        let trial_active = trial_end
            .as_deref()
            .and_then(parse_date)
            .map(|end| end > Utc::now().date_naive())
            .unwrap_or(false);

        self.store_subscription(
            clinic_id,
            json!({
                "clinic_id": clinic_id,
                "status": if trial_active { "trialing" } else { "inactive" },
                "plan_name": "basic",
                "trial_end": trial_end.clone(),
                "updated_at": Utc::now().to_rfc3339()
            }),
            auth_token,
        )
        .await?;

        Ok(SubscriptionStatus {
            subscribed: false,
            subscription_tier: trial_active.then(|| "trial".to_string()),
            subscription_end: None,
            trial_active,
            trial_end,
        })
    }

    async fn store_subscription(
        &self,
        clinic_id: &str,
        body: Value,
        auth_token: &str,
    ) -> Result<()> {
        debug!("Storing subscription state for clinic {}", clinic_id);

        let _: Vec<Value> = self
            .supabase
            .upsert(
                "/rest/v1/subscriptions?on_conflict=clinic_id",
                Some(auth_token),
                body,
            )
            .await?;

        Ok(())
    }
}

fn epoch_to_rfc3339(timestamp: i64) -> Option<String> {
    DateTime::<Utc>::from_timestamp(timestamp, 0).map(|moment| moment.to_rfc3339())
}

fn parse_date(value: &str) -> Option<chrono::NaiveDate> {
    chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|moment| moment.date_naive())
        })
}
