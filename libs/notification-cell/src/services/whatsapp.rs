use anyhow::{anyhow, Result};
use reqwest::Client;
use tracing::{debug, warn};

use shared_config::AppConfig;

use crate::models::{OutboundMessage, WebhookPayload, WebhookVerification};

/// Relay for the WhatsApp Cloud API: verifies Meta's webhook handshake and
/// answers incoming texts with canned replies based on a keyword prefix.
pub struct WhatsAppService {
    client: Client,
    verify_token: String,
    access_token: String,
    phone_number_id: String,
    graph_base_url: String,
    configured: bool,
}

impl WhatsAppService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            verify_token: config.whatsapp_verify_token.clone(),
            access_token: config.whatsapp_access_token.clone(),
            phone_number_id: config.whatsapp_phone_number_id.clone(),
            graph_base_url: config.whatsapp_graph_base_url.clone(),
            configured: config.is_whatsapp_configured(),
        }
    }

    /// Echo the challenge when Meta subscribes with the shared token.
    pub fn verify(&self, query: &WebhookVerification) -> Option<String> {
        let subscribing = query.mode.as_deref() == Some("subscribe");
        let token_matches = !self.verify_token.is_empty()
            && query.verify_token.as_deref() == Some(self.verify_token.as_str());

        if subscribing && token_matches {
            debug!("Webhook verified");
            Some(query.challenge.clone().unwrap_or_default())
        } else {
            warn!("Webhook verification failed");
            None
        }
    }

    /// Answer the first message of the payload. Delivery problems are
    /// logged, never surfaced: Meta retries any non-200 response.
    pub async fn handle_incoming(&self, payload: &WebhookPayload) -> Result<()> {
        if !self.configured {
            warn!("WhatsApp credentials missing, ignoring webhook payload");
            return Ok(());
        }

        let message = match payload.first_message() {
            Some(message) => message,
            None => {
                debug!("Webhook payload carried no message");
                return Ok(());
            }
        };

        let from = message.from.as_deref().unwrap_or_default();
        let text = message
            .text
            .as_ref()
            .and_then(|text| text.body.as_deref())
            .unwrap_or_default()
            .trim();

        if from.is_empty() || text.is_empty() {
            debug!("Webhook message missing sender or text");
            return Ok(());
        }

        let reply = reply_for(text);
        self.send_text(from, reply).await
    }

    async fn send_text(&self, to: &str, body: String) -> Result<()> {
        let url = format!("{}/{}/messages", self.graph_base_url, self.phone_number_id);
        debug!("Sending WhatsApp reply to {}", to);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(&OutboundMessage::text(to, body))
            .send()
            .await?;

        let status = response.status();
        let response_body = response.text().await.unwrap_or_default();
        debug!("WhatsApp send result ({}): {}", status, response_body);

        if !status.is_success() {
            return Err(anyhow!("WhatsApp send failed ({}): {}", status, response_body));
        }

        Ok(())
    }
}

/// Keyword intents the clinic bot understands. Anything else gets the
/// instructions message.
fn reply_for(text: &str) -> String {
    let upper = text.to_uppercase();

    if upper.starts_with("CADASTRAR") {
        "Recebi seu pedido de cadastro. Em breve confirmaremos!".to_string()
    } else if upper.starts_with("AGENDAR") {
        "Recebi seu pedido de agendamento. Verificando disponibilidade...".to_string()
    } else {
        "Olá! Para se cadastrar, envie: CADASTRAR Nome;Email. Para agendar: AGENDAR AAAA-MM-DD HH:MM."
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_intents() {
        assert!(reply_for("cadastrar Maria;maria@example.com").contains("cadastro"));
        assert!(reply_for("AGENDAR 2025-03-12 10:00").contains("agendamento"));
        assert!(reply_for("bom dia").contains("CADASTRAR"));
    }
}
