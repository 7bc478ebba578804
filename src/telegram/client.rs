//! Telegram Bot API client.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::common::error::{ChannelError, ChannelResult};

const PLATFORM: &str = "Telegram";
const API_ROOT: &str = "https://api.telegram.org";

/// Bot API response envelope.
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
    pub inline_query: Option<InlineQuery>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    /// Unix seconds.
    pub date: i64,
    pub chat: Chat,
    pub from: Option<User>,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub first_name: String,
    pub username: Option<String>,
}

impl User {
    /// Name used to greet the user.
    pub fn display_name(&self) -> &str {
        self.username.as_deref().unwrap_or(&self.first_name)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct InlineQuery {
    pub id: String,
    pub from: User,
    pub query: String,
}

/// `InlineQueryResultArticle` with a text message content.
#[derive(Debug, Clone, PartialEq)]
pub struct InlineArticle {
    pub id: String,
    pub title: String,
    pub description: String,
    pub url: String,
    /// HTML message sent when the user picks the result.
    pub message_text: String,
}

impl InlineArticle {
    fn to_json(&self) -> serde_json::Value {
        json!({
            "type": "article",
            "id": self.id,
            "title": self.title,
            "description": self.description,
            "url": self.url,
            "input_message_content": {
                "message_text": self.message_text,
                "parse_mode": "HTML",
            },
        })
    }
}

/// Thin JSON client over the Bot API methods the relay needs.
#[derive(Debug, Clone)]
pub struct TelegramClient {
    http: reqwest::Client,
    base_url: String,
}

impl TelegramClient {
    pub fn new(token: &str, poll_timeout: Duration) -> ChannelResult<Self> {
        // Long polls hold the connection open for `poll_timeout`.
        let http = reqwest::Client::builder()
            .timeout(poll_timeout + Duration::from_secs(15))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|source| ChannelError::Transport {
                platform: PLATFORM,
                source,
            })?;

        Ok(Self {
            http,
            base_url: format!("{}/bot{}/", API_ROOT, token),
        })
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> ChannelResult<T> {
        debug!("Telegram call: {}", method);
        let response = self
            .http
            .post(format!("{}{}", self.base_url, method))
            .json(&params)
            .send()
            .await
            .map_err(|source| ChannelError::Transport {
                platform: PLATFORM,
                source,
            })?;

        let status = response.status();
        let envelope: ApiResponse<T> = match response.json().await {
            Ok(envelope) => envelope,
            Err(_) if !status.is_success() => {
                return Err(ChannelError::Api {
                    platform: PLATFORM,
                    method: method.to_string(),
                    status: status.as_u16(),
                })
            }
            Err(source) => {
                return Err(ChannelError::Transport {
                    platform: PLATFORM,
                    source,
                })
            }
        };

        match envelope {
            ApiResponse {
                ok: true,
                result: Some(result),
                ..
            } => Ok(result),
            ApiResponse { description, .. } => Err(ChannelError::Rejected {
                platform: PLATFORM,
                method: method.to_string(),
                description: description.unwrap_or_else(|| format!("HTTP {}", status.as_u16())),
            }),
        }
    }

    /// Long-poll for updates after `offset`.
    pub async fn get_updates(&self, offset: i64, timeout: Duration) -> ChannelResult<Vec<Update>> {
        self.call(
            "getUpdates",
            json!({
                "offset": offset,
                "timeout": timeout.as_secs(),
                "allowed_updates": ["message", "inline_query"],
            }),
        )
        .await
    }

    pub async fn send_message(&self, chat_id: i64, text: &str) -> ChannelResult<()> {
        let _: serde_json::Value = self
            .call(
                "sendMessage",
                json!({
                    "chat_id": chat_id,
                    "text": text,
                    "parse_mode": "HTML",
                }),
            )
            .await?;
        Ok(())
    }

    pub async fn answer_inline_query(
        &self,
        inline_query_id: &str,
        articles: &[InlineArticle],
    ) -> ChannelResult<()> {
        let results: Vec<_> = articles.iter().map(InlineArticle::to_json).collect();
        let _: bool = self
            .call(
                "answerInlineQuery",
                json!({
                    "inline_query_id": inline_query_id,
                    "results": results,
                }),
            )
            .await?;
        Ok(())
    }
}
