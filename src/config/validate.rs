//! Configuration validation.
//!
//! Validates configuration values and provides helpful error messages.

use crate::common::error::ConfigError;
use crate::config::types::Config;

/// Placeholder values shipped in the example configuration.
const PLACEHOLDERS: [&str; 5] = [
    "YOUR_CATALOG_API_KEY",
    "YOUR_OLD_TESTAMENT_DAM_ID",
    "YOUR_NEW_TESTAMENT_DAM_ID",
    "YOUR_TELEGRAM_TOKEN",
    "YOUR_PAGE_ACCESS_TOKEN",
];

fn is_placeholder(value: &str) -> bool {
    PLACEHOLDERS.contains(&value)
}

fn is_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

/// Validate a configuration and return detailed errors.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let mut errors = Vec::new();

    // Catalog
    let catalog = &config.catalog;
    if catalog.api_key.is_empty() {
        errors.push("catalog.api_key is required".to_string());
    }
    if is_placeholder(&catalog.api_key) {
        errors.push("catalog.api_key has not been configured (still using placeholder)".to_string());
    }
    for (field, value) in [("catalog.url", &catalog.url), ("catalog.video_url", &catalog.video_url)] {
        if !is_http_url(value) {
            errors.push(format!("{} must be an http(s) URL (got '{}')", field, value));
        } else if !value.ends_with('/') {
            errors.push(format!("{} must end with '/' (got '{}')", field, value));
        }
    }
    for (field, value) in [
        ("catalog.old_testament_collection", &catalog.old_testament_collection),
        ("catalog.new_testament_collection", &catalog.new_testament_collection),
    ] {
        if value.is_empty() {
            errors.push(format!("{} is required", field));
        } else if is_placeholder(value) {
            errors.push(format!("{} has not been configured (still using placeholder)", field));
        }
    }
    if catalog.timeout_secs == 0 {
        errors.push("catalog.timeout_secs must be non-zero".to_string());
    }

    // Telegram
    if let Some(ref telegram) = config.telegram {
        if telegram.token.is_empty() {
            errors.push("telegram.token is required".to_string());
        }
        if is_placeholder(&telegram.token) {
            errors.push("telegram.token has not been configured (still using placeholder)".to_string());
        }
        if telegram.poll_interval_secs == 0 {
            errors.push("telegram.poll_interval_secs must be non-zero".to_string());
        }
    }

    // Messenger
    if let Some(ref messenger) = config.messenger {
        if messenger.page_access_token.is_empty() {
            errors.push("messenger.page_access_token is required".to_string());
        }
        if is_placeholder(&messenger.page_access_token) {
            errors.push(
                "messenger.page_access_token has not been configured (still using placeholder)"
                    .to_string(),
            );
        }
        if messenger.verify_token.is_empty() {
            errors.push("messenger.verify_token is required".to_string());
        }
        if matches!(messenger.app_secret.as_deref(), Some("")) {
            errors.push("messenger.app_secret is empty (remove it to skip signature checks)".to_string());
        }
    }

    // Server
    if let Some(ref server) = config.server {
        if server.port == 0 {
            errors.push("server.port must be non-zero".to_string());
        }
        if server.host.is_empty() {
            errors.push("server.host is required".to_string());
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError {
            message: errors.join("\n"),
        })
    }
}
