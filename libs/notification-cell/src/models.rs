use serde::{Deserialize, Serialize};

/// Meta's webhook verification handshake, sent as `hub.*` query params.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookVerification {
    #[serde(rename = "hub.mode")]
    pub mode: Option<String>,
    #[serde(rename = "hub.verify_token")]
    pub verify_token: Option<String>,
    #[serde(rename = "hub.challenge")]
    pub challenge: Option<String>,
}

// Only the fragment of the webhook payload the relay reads. Everything is
// optional since Meta delivers several event shapes on the same endpoint.

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub entry: Vec<WebhookEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookEntry {
    #[serde(default)]
    pub changes: Vec<WebhookChange>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookChange {
    pub value: WebhookChangeValue,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookChangeValue {
    #[serde(default)]
    pub messages: Vec<IncomingMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IncomingMessage {
    /// Sender's WhatsApp phone number.
    pub from: Option<String>,
    pub text: Option<MessageText>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageText {
    pub body: Option<String>,
}

impl WebhookPayload {
    /// First message of the first change, the only one the relay answers.
    pub fn first_message(&self) -> Option<&IncomingMessage> {
        self.entry
            .first()?
            .changes
            .first()?
            .value
            .messages
            .first()
    }
}

/// Body for the Cloud API send-message call.
#[derive(Debug, Clone, Serialize)]
pub struct OutboundMessage {
    pub messaging_product: &'static str,
    pub to: String,
    #[serde(rename = "type")]
    pub message_type: &'static str,
    pub text: OutboundText,
}

#[derive(Debug, Clone, Serialize)]
pub struct OutboundText {
    pub body: String,
}

impl OutboundMessage {
    pub fn text(to: &str, body: String) -> Self {
        Self {
            messaging_product: "whatsapp",
            to: to.to_string(),
            message_type: "text",
            text: OutboundText { body },
        }
    }
}
