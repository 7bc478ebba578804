//! Configuration file parsing (HOCON format).

use std::path::Path;

use crate::common::error::ConfigError;
use crate::config::types::Config;
use hocon::HoconLoader;

/// Load configuration from a HOCON file.
pub fn load_config(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let path = path.as_ref();

    HoconLoader::new()
        .load_file(path)
        .map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            source: std::io::Error::new(std::io::ErrorKind::Other, e.to_string()),
        })?
        .resolve()
        .map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })
}

/// Load configuration from a HOCON string.
pub fn load_config_str(content: &str) -> Result<Config, ConfigError> {
    HoconLoader::new()
        .load_str(content)
        .map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })?
        .resolve()
        .map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_gets_defaults() {
        let config = load_config_str(
            r#"
            catalog {
                api_key = "abc123"
                old_testament_collection = "OT_DAM"
                new_testament_collection = "NT_DAM"
            }
            "#,
        )
        .unwrap();

        assert_eq!(config.catalog.api_key, "abc123");
        assert_eq!(config.catalog.url, "http://dbt.io/");
        assert_eq!(config.catalog.video_url, "http://video.dbt.io/");
        assert_eq!(config.catalog.timeout_secs, 15);
        assert!(config.telegram.is_none());
        assert!(config.messenger.is_none());
        assert_eq!(config.server().port, 3030);
    }

    #[test]
    fn test_full_config() {
        let config = load_config_str(
            r#"
            catalog {
                api_key = "abc123"
                old_testament_collection = "OT"
                new_testament_collection = "NT"
                timeout_secs = 30
            }
            telegram {
                token = "123:abc"
                poll_interval_secs = 2
            }
            messenger {
                page_access_token = "page"
                verify_token = "verify"
                app_secret = "shh"
            }
            server {
                port = 8080
            }
            "#,
        )
        .unwrap();

        assert_eq!(config.telegram.as_ref().unwrap().poll_interval_secs, 2);
        assert_eq!(config.messenger.as_ref().unwrap().app_secret.as_deref(), Some("shh"));
        assert_eq!(config.server().port, 8080);
        assert_eq!(config.server().host, "0.0.0.0");
    }

    #[test]
    fn test_missing_catalog_fails() {
        let result = load_config_str("telegram { token = \"x\" }");
        assert!(matches!(result, Err(ConfigError::ParseError { .. })));
    }
}
