use std::env;
use tracing::warn;

#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub supabase_jwt_secret: String,
    pub stripe_secret_key: String,
    pub stripe_api_base_url: String,
    pub whatsapp_verify_token: String,
    pub whatsapp_access_token: String,
    pub whatsapp_phone_number_id: String,
    pub whatsapp_graph_base_url: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            supabase_url: env::var("SUPABASE_URL")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_URL not set, using empty value");
                    String::new()
                }),
            supabase_anon_key: env::var("SUPABASE_ANON_PUBLIC_KEY")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_ANON_PUBLIC_KEY not set, using empty value");
                    String::new()
                }),
            supabase_jwt_secret: env::var("SUPABASE_JWT_SECRET")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_JWT_SECRET not set, using empty value");
                    String::new()
                }),
            stripe_secret_key: env::var("STRIPE_SECRET_KEY")
                .unwrap_or_else(|_| {
                    warn!("STRIPE_SECRET_KEY not set, using empty value");
                    String::new()
                }),
            stripe_api_base_url: env::var("STRIPE_API_BASE_URL")
                .unwrap_or_else(|_| {
                    warn!("STRIPE_API_BASE_URL not set, using default");
                    "https://api.stripe.com".to_string()
                }),
            whatsapp_verify_token: env::var("META_VERIFY_TOKEN")
                .unwrap_or_else(|_| {
                    warn!("META_VERIFY_TOKEN not set, using empty value");
                    String::new()
                }),
            whatsapp_access_token: env::var("META_WABA_TOKEN")
                .unwrap_or_else(|_| {
                    warn!("META_WABA_TOKEN not set, using empty value");
                    String::new()
                }),
            whatsapp_phone_number_id: env::var("META_PHONE_NUMBER_ID")
                .unwrap_or_else(|_| {
                    warn!("META_PHONE_NUMBER_ID not set, using empty value");
                    String::new()
                }),
            whatsapp_graph_base_url: env::var("META_GRAPH_BASE_URL")
                .unwrap_or_else(|_| {
                    warn!("META_GRAPH_BASE_URL not set, using default");
                    "https://graph.facebook.com/v20.0".to_string()
                }),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.supabase_url.is_empty()
            && !self.supabase_anon_key.is_empty()
            && !self.supabase_jwt_secret.is_empty()
    }

    pub fn is_billing_configured(&self) -> bool {
        !self.stripe_secret_key.is_empty()
    }

    pub fn is_whatsapp_configured(&self) -> bool {
        !self.whatsapp_access_token.is_empty()
            && !self.whatsapp_phone_number_id.is_empty()
            && !self.whatsapp_graph_base_url.is_empty()
    }
}
