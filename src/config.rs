/// Runtime configuration
///
/// Values come from the process environment. A `.env` file next to the
/// binary is loaded first so the API credential can live outside the shell.
use std::collections::HashMap;
use std::path::PathBuf;

use crate::error::ConfigError;

pub const DEFAULT_API_URL: &str = "https://api.unsplash.com";

const ENV_ACCESS_KEY: &str = "UNSPLASH_ACCESS_KEY";
const ENV_API_URL: &str = "UNSPLASH_API_URL";
const ENV_DOWNLOAD_DIR: &str = "CARD_DOWNLOAD_DIR";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Client credential sent as `Client-ID <key>` on every request
    pub access_key: String,
    /// Base URL of the photo API, without trailing slash
    pub api_url: String,
    /// Where exported cards are written
    pub download_dir: PathBuf,
}

impl Config {
    /// Load from the real environment (after `.env`)
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let vars: HashMap<String, String> = std::env::vars().collect();
        Self::from_vars(&vars)
    }

    /// Build from an explicit variable map
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let access_key = match non_empty(vars, ENV_ACCESS_KEY) {
            Some(key) => key,
            None => {
                // Requests will be rejected by the source and surface as notices.
                tracing::error!("Missing {} environment variable", ENV_ACCESS_KEY);
                String::new()
            }
        };

        let api_url = non_empty(vars, ENV_API_URL)
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                key: ENV_API_URL,
                reason: format!("expected an http(s) URL, got {:?}", api_url),
            });
        }

        let download_dir = non_empty(vars, ENV_DOWNLOAD_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(default_download_dir);

        Ok(Config {
            access_key,
            api_url,
            download_dir,
        })
    }
}

fn non_empty(vars: &HashMap<String, String>, key: &str) -> Option<String> {
    vars.get(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Platform download folder, then home, then the working directory
fn default_download_dir() -> PathBuf {
    dirs::download_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_vars(&vars(&[(ENV_ACCESS_KEY, "abc")])).unwrap();
        assert_eq!(config.access_key, "abc");
        assert_eq!(config.api_url, DEFAULT_API_URL);
    }

    #[test]
    fn test_missing_key_still_loads() {
        let config = Config::from_vars(&vars(&[])).unwrap();
        assert!(config.access_key.is_empty());
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_vars(&vars(&[
            (ENV_ACCESS_KEY, " key "),
            (ENV_API_URL, "http://localhost:9000/"),
            (ENV_DOWNLOAD_DIR, "/tmp/cards"),
        ]))
        .unwrap();
        assert_eq!(config.access_key, "key");
        assert_eq!(config.api_url, "http://localhost:9000");
        assert_eq!(config.download_dir, PathBuf::from("/tmp/cards"));
    }

    #[test]
    fn test_rejects_non_http_url() {
        let result = Config::from_vars(&vars(&[(ENV_API_URL, "ftp://example.com")]));
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }
}
