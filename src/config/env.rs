//! Environment variable overrides for configuration.
//!
//! Supports overriding config values with environment variables:
//! - `PASSAGE_RELAY_CATALOG_API_KEY` - catalog API key
//! - `PASSAGE_RELAY_TELEGRAM_TOKEN` - Telegram bot token
//! - `PASSAGE_RELAY_MESSENGER_PAGE_TOKEN` - Messenger page access token
//! - `PASSAGE_RELAY_MESSENGER_VERIFY_TOKEN` - Messenger webhook verify token
//! - `PASSAGE_RELAY_MESSENGER_APP_SECRET` - Messenger app secret
//! - `PASSAGE_RELAY_SERVER_PORT` - HTTP listen port

use std::env;

use crate::config::types::{Config, ServerConfig};

/// Environment variable prefix for all config overrides.
const ENV_PREFIX: &str = "PASSAGE_RELAY";

/// Apply environment variable overrides to a config.
///
/// Secrets can be kept out of the config file this way. Platform sections
/// only receive overrides when they are present in the file.
pub fn apply_env_overrides(mut config: Config) -> Config {
    if let Ok(key) = env::var(format!("{}_CATALOG_API_KEY", ENV_PREFIX)) {
        config.catalog.api_key = key;
    }

    if let Some(ref mut telegram) = config.telegram {
        if let Ok(token) = env::var(format!("{}_TELEGRAM_TOKEN", ENV_PREFIX)) {
            telegram.token = token;
        }
    }

    if let Some(ref mut messenger) = config.messenger {
        if let Ok(token) = env::var(format!("{}_MESSENGER_PAGE_TOKEN", ENV_PREFIX)) {
            messenger.page_access_token = token;
        }
        if let Ok(token) = env::var(format!("{}_MESSENGER_VERIFY_TOKEN", ENV_PREFIX)) {
            messenger.verify_token = token;
        }
        if let Ok(secret) = env::var(format!("{}_MESSENGER_APP_SECRET", ENV_PREFIX)) {
            messenger.app_secret = Some(secret);
        }
    }

    if let Ok(port) = env::var(format!("{}_SERVER_PORT", ENV_PREFIX)) {
        if let Ok(port) = port.parse() {
            config
                .server
                .get_or_insert_with(ServerConfig::default)
                .port = port;
        }
    }

    config
}

/// Names of override variables that are set but empty.
pub fn check_empty_env_vars() -> Vec<String> {
    let vars = [
        format!("{}_CATALOG_API_KEY", ENV_PREFIX),
        format!("{}_TELEGRAM_TOKEN", ENV_PREFIX),
        format!("{}_MESSENGER_PAGE_TOKEN", ENV_PREFIX),
    ];

    vars.into_iter()
        .filter(|var| env::var(var).map(|v| v.is_empty()).unwrap_or(false))
        .collect()
}

/// Get the config file path from environment or use default.
///
/// Checks `PASSAGE_RELAY_CONFIG`, otherwise returns "passage-relay.conf".
pub fn get_config_path() -> String {
    env::var(format!("{}_CONFIG", ENV_PREFIX))
        .unwrap_or_else(|_| "passage-relay.conf".to_string())
}
