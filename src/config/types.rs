//! Configuration type definitions.

use serde::Deserialize;

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub catalog: CatalogConfig,
    pub telegram: Option<TelegramConfig>,
    pub messenger: Option<MessengerConfig>,
    pub server: Option<ServerConfig>,
}

impl Config {
    /// Server settings, falling back to defaults when the section is absent.
    pub fn server(&self) -> ServerConfig {
        self.server.clone().unwrap_or_default()
    }
}

/// Video catalog (Digital Bible Platform) settings.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    pub api_key: String,
    /// API root, with trailing slash.
    #[serde(default = "default_catalog_url")]
    pub url: String,
    /// Host prefix for returned video paths, with trailing slash.
    #[serde(default = "default_video_url")]
    pub video_url: String,
    /// Collection id queried for Old Testament books.
    pub old_testament_collection: String,
    /// Collection id queried for New Testament books.
    pub new_testament_collection: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Telegram bot settings.
#[derive(Debug, Clone, Deserialize)]
pub struct TelegramConfig {
    pub token: String,
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

/// Facebook Messenger webhook settings.
#[derive(Debug, Clone, Deserialize)]
pub struct MessengerConfig {
    pub page_access_token: String,
    /// Token Facebook echoes back when subscribing the webhook.
    pub verify_token: String,
    /// App secret for `X-Hub-Signature-256` checks. Unchecked when absent.
    pub app_secret: Option<String>,
}

/// HTTP listener for the search API and webhooks.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_catalog_url() -> String {
    "http://dbt.io/".to_string()
}

fn default_video_url() -> String {
    "http://video.dbt.io/".to_string()
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_poll_interval_secs() -> u64 {
    5
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3030
}
