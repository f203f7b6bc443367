use anyhow::{Context, Result};
use thiserror::Error;

use crate::store::DEFAULT_STORAGE_KEY;

const AI_PROVIDER_VARS: [&str; 3] = [
    "AI_PROVIDER_BASE_URL",
    "AI_PROVIDER_API_KEY",
    "AI_PROVIDER_MODEL",
];

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("AI provider is not configured; missing {}", .0.join(", "))]
    MissingAiProvider(Vec<&'static str>),
}

/// Location and credentials of the OpenAI-compatible model endpoint.
#[derive(Clone)]
pub struct AiProviderConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
}

impl std::fmt::Debug for AiProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AiProviderConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"***")
            .field("model", &self.model)
            .finish()
    }
}

impl AiProviderConfig {
    /// All three settings are required; blank values count as missing.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let values = AI_PROVIDER_VARS.map(|key| lookup(key).filter(|v| !v.trim().is_empty()));

        match values {
            [Some(base_url), Some(api_key), Some(model)] => Ok(AiProviderConfig {
                base_url,
                api_key,
                model,
            }),
            values => Err(ConfigError::MissingAiProvider(
                AI_PROVIDER_VARS
                    .iter()
                    .zip(&values)
                    .filter(|(_, value)| value.is_none())
                    .map(|(key, _)| *key)
                    .collect(),
            )),
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }
}

/// Application configuration loaded from environment variables.
/// A missing AI provider disables the assistant only; the rest of the API runs.
#[derive(Debug, Clone)]
pub struct Config {
    /// When unset, the CV is kept in process memory.
    pub redis_url: Option<String>,
    pub storage_key: String,
    pub ai_provider: Result<AiProviderConfig, ConfigError>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            redis_url: std::env::var("REDIS_URL").ok().filter(|v| !v.is_empty()),
            storage_key: std::env::var("CV_STORAGE_KEY")
                .unwrap_or_else(|_| DEFAULT_STORAGE_KEY.to_string()),
            ai_provider: AiProviderConfig::from_env(),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_complete_ai_provider_config() {
        let config = AiProviderConfig::from_lookup(lookup(&[
            ("AI_PROVIDER_BASE_URL", "https://api.example.com/v1"),
            ("AI_PROVIDER_API_KEY", "sk-test"),
            ("AI_PROVIDER_MODEL", "gpt-4o-mini"),
        ]))
        .unwrap();
        assert_eq!(config.base_url, "https://api.example.com/v1");
        assert_eq!(config.model, "gpt-4o-mini");
    }

    #[test]
    fn test_missing_values_are_reported() {
        let err = AiProviderConfig::from_lookup(lookup(&[
            ("AI_PROVIDER_BASE_URL", "https://api.example.com/v1"),
            ("AI_PROVIDER_MODEL", "  "),
        ]))
        .unwrap_err();
        assert_eq!(
            err,
            ConfigError::MissingAiProvider(vec!["AI_PROVIDER_API_KEY", "AI_PROVIDER_MODEL"])
        );
        assert!(err.to_string().contains("AI_PROVIDER_API_KEY, AI_PROVIDER_MODEL"));
    }

    #[test]
    fn test_nothing_set_reports_all_three() {
        let err = AiProviderConfig::from_lookup(lookup(&[])).unwrap_err();
        assert_eq!(err, ConfigError::MissingAiProvider(AI_PROVIDER_VARS.to_vec()));
    }

    #[test]
    fn test_debug_hides_api_key() {
        let config = AiProviderConfig {
            base_url: "u".to_string(),
            api_key: "secret".to_string(),
            model: "m".to_string(),
        };
        assert!(!format!("{config:?}").contains("secret"));
    }
}
