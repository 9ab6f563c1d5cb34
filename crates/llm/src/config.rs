use std::sync::Arc;
use std::time::Duration;

use concierge_common::{ConciergeError, Result};
use serde::{Deserialize, Serialize};

use crate::client::LlmClient;
use crate::openai::OpenAiClient;

pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Settings for the external completion service.
///
/// The service is considered enabled only when an API key is present; every
/// other field has a default so an empty `[llm]` table is valid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    150
}

fn default_timeout_ms() -> u64 {
    30_000
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_key: None,
            api_url: None,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl LlmConfig {
    /// The configured key, ignoring blank values.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().map(str::trim).filter(|k| !k.is_empty())
    }

    pub fn is_enabled(&self) -> bool {
        self.api_key().is_some()
    }

    /// OpenAI keys start with `sk-`; anything else is probably a paste error.
    pub fn key_looks_valid(&self) -> bool {
        self.api_key().is_some_and(|k| k.starts_with("sk-"))
    }
}

pub fn build_llm_client(config: &LlmConfig) -> Result<Arc<dyn LlmClient>> {
    let api_key = config.api_key().ok_or_else(|| {
        ConciergeError::Config("Completion service requires an API key".to_string())
    })?;

    let client = OpenAiClient::new(
        config.api_url.clone(),
        config.model.clone(),
        Some(api_key.to_string()),
        Duration::from_millis(config.timeout_ms),
    )?;

    Ok(Arc::new(client))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOML_CONFIG: &str = r#"
model = "gpt-4o-mini"
api_key = "sk-test"
api_url = "http://localhost:11434"
temperature = 0.2
max_tokens = 64
timeout_ms = 5000
"#;

    #[test]
    fn deserialize_config_from_toml() {
        let config: LlmConfig = toml::from_str(TOML_CONFIG).unwrap();
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.api_key(), Some("sk-test"));
        assert_eq!(config.api_url.as_deref(), Some("http://localhost:11434"));
        assert_eq!(config.max_tokens, 64);
        assert_eq!(config.timeout_ms, 5000);
    }

    #[test]
    fn deserialize_config_defaults() {
        let config: LlmConfig = toml::from_str("").unwrap();
        assert_eq!(config.model, DEFAULT_MODEL);
        assert!((config.temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(config.max_tokens, 150);
        assert_eq!(config.timeout_ms, 30_000);
        assert!(!config.is_enabled());
    }

    #[test]
    fn blank_key_is_disabled() {
        let config = LlmConfig {
            api_key: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(!config.is_enabled());
        assert!(build_llm_client(&config).is_err());
    }

    #[test]
    fn key_format_check() {
        let good = LlmConfig {
            api_key: Some("sk-abc".to_string()),
            ..Default::default()
        };
        let odd = LlmConfig {
            api_key: Some("abc".to_string()),
            ..Default::default()
        };
        assert!(good.key_looks_valid());
        assert!(!odd.key_looks_valid());
        assert!(!LlmConfig::default().key_looks_valid());
    }

    #[test]
    fn build_client_uses_configured_model() {
        let config = LlmConfig {
            model: "gpt-4o-mini".to_string(),
            api_key: Some("sk-test".to_string()),
            ..Default::default()
        };
        let client = build_llm_client(&config).unwrap();
        assert_eq!(client.model_name(), "gpt-4o-mini");
    }
}
