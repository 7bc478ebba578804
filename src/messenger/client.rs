//! Messenger Send API client and webhook payload types.

use std::time::Duration;

use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::common::error::{ChannelError, ChannelResult};

const PLATFORM: &str = "Messenger";
const GRAPH_ROOT: &str = "https://graph.facebook.com/v2.6/me/";

/// Body of a webhook POST.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookPayload {
    pub object: String,
    #[serde(default)]
    pub entry: Vec<Entry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Entry {
    #[serde(default)]
    pub messaging: Vec<MessagingEvent>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessagingEvent {
    pub sender: Participant,
    /// Epoch milliseconds.
    pub timestamp: i64,
    pub message: Option<IncomingMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Participant {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IncomingMessage {
    pub text: Option<String>,
    /// Set on copies of the page's own outgoing messages.
    #[serde(default)]
    pub is_echo: bool,
}

/// Sends messages on behalf of the page.
#[derive(Debug, Clone)]
pub struct MessengerClient {
    http: reqwest::Client,
    base_url: String,
    page_access_token: String,
}

impl MessengerClient {
    pub fn new(page_access_token: &str) -> ChannelResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|source| ChannelError::Transport {
                platform: PLATFORM,
                source,
            })?;

        Ok(Self {
            http,
            base_url: GRAPH_ROOT.to_string(),
            page_access_token: page_access_token.to_string(),
        })
    }

    async fn post(&self, method: &str, body: serde_json::Value) -> ChannelResult<()> {
        debug!("Messenger call: {}", method);
        let response = self
            .http
            .post(format!("{}{}", self.base_url, method))
            .query(&[("access_token", self.page_access_token.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|source| ChannelError::Transport {
                platform: PLATFORM,
                source,
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let description = response
            .json::<serde_json::Value>()
            .await
            .ok()
            .and_then(|v| v["error"]["message"].as_str().map(str::to_string));
        match description {
            Some(description) => Err(ChannelError::Rejected {
                platform: PLATFORM,
                method: method.to_string(),
                description,
            }),
            None => Err(ChannelError::Api {
                platform: PLATFORM,
                method: method.to_string(),
                status: status.as_u16(),
            }),
        }
    }

    /// Show the typing indicator to a user.
    pub async fn typing_on(&self, recipient: &str) -> ChannelResult<()> {
        self.post(
            "messages",
            json!({
                "recipient": { "id": recipient },
                "sender_action": "typing_on",
            }),
        )
        .await
    }

    pub async fn send_text(&self, recipient: &str, text: &str) -> ChannelResult<()> {
        self.post(
            "messages",
            json!({
                "recipient": { "id": recipient },
                "message": { "text": text },
            }),
        )
        .await
    }

    pub async fn send_video(&self, recipient: &str, url: &str) -> ChannelResult<()> {
        self.post(
            "messages",
            json!({
                "recipient": { "id": recipient },
                "message": {
                    "attachment": {
                        "type": "video",
                        "payload": { "url": url },
                    },
                },
            }),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_deserializes() {
        let raw = r#"{
            "object": "page",
            "entry": [{
                "id": "1",
                "time": 1700000000000,
                "messaging": [{
                    "sender": {"id": "USER"},
                    "recipient": {"id": "PAGE"},
                    "timestamp": 1700000000123,
                    "message": {"mid": "m1", "text": "John 3:16"}
                }]
            }]
        }"#;
        let payload: WebhookPayload = serde_json::from_str(raw).unwrap();
        let event = &payload.entry[0].messaging[0];

        assert_eq!(payload.object, "page");
        assert_eq!(event.sender.id, "USER");
        assert_eq!(event.timestamp, 1700000000123);
        let message = event.message.as_ref().unwrap();
        assert_eq!(message.text.as_deref(), Some("John 3:16"));
        assert!(!message.is_echo);
    }

    #[test]
    fn test_entry_without_messaging() {
        let raw = r#"{"object": "page", "entry": [{"id": "1", "changes": []}]}"#;
        let payload: WebhookPayload = serde_json::from_str(raw).unwrap();

        assert!(payload.entry[0].messaging.is_empty());
    }
}
