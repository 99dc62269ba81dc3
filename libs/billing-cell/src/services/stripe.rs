use anyhow::{anyhow, Result};
use reqwest::Client;
use tracing::{debug, error};

use shared_config::AppConfig;

use crate::models::{StripeCustomer, StripeList, StripeSubscription};

/// Thin REST binding for the two Stripe list calls the subscription
/// refresh needs. Payments themselves happen in Stripe Checkout.
pub struct StripeClient {
    client: Client,
    base_url: String,
    secret_key: String,
}

impl StripeClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.stripe_api_base_url.clone(),
            secret_key: config.stripe_secret_key.clone(),
        }
    }

    pub async fn find_customer_by_email(&self, email: &str) -> Result<Option<StripeCustomer>> {
        let url = format!("{}/v1/customers", self.base_url);
        debug!("Looking up Stripe customer for {}", email);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.secret_key)
            .query(&[("email", email), ("limit", "1")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            error!("Stripe API error ({}): {}", status, error_text);
            return Err(anyhow!("Stripe API error ({}): {}", status, error_text));
        }

        let list: StripeList<StripeCustomer> = response.json().await?;
        Ok(list.data.into_iter().next())
    }

    pub async fn find_active_subscription(
        &self,
        customer_id: &str,
    ) -> Result<Option<StripeSubscription>> {
        let url = format!("{}/v1/subscriptions", self.base_url);
        debug!("Looking up active subscription for customer {}", customer_id);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.secret_key)
            .query(&[("customer", customer_id), ("status", "active"), ("limit", "1")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            error!("Stripe API error ({}): {}", status, error_text);
            return Err(anyhow!("Stripe API error ({}): {}", status, error_text));
        }

        let list: StripeList<StripeSubscription> = response.json().await?;
        Ok(list.data.into_iter().next())
    }
}
