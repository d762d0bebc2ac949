use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

pub const API_KEY_ENV: &str = "TERM_CORE_API_KEY";

fn default_provider() -> String {
    "moonshot".to_string()
}

fn default_model() -> String {
    "moonshot-v1-8k".to_string()
}

fn default_temperature() -> f32 {
    0.3
}

fn default_timeout_secs() -> u64 {
    60
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslatorConfig {
    #[serde(default = "default_provider")]
    pub provider: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default)]
    pub api_key: String,

    /// Overrides the provider's built-in chat completions url.
    #[serde(default)]
    pub endpoint: Option<String>,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        TranslatorConfig {
            provider: default_provider(),
            model: default_model(),
            api_key: String::new(),
            endpoint: None,
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl TranslatorConfig {
    /// Reads the `translator` section of a request payload, falling back to
    /// defaults for anything missing.
    pub fn from_payload(payload: &serde_json::Value) -> Result<Self> {
        let cfg = match payload.get("translator") {
            None | Some(serde_json::Value::Null) => TranslatorConfig::default(),
            Some(v) => serde_json::from_value(v.clone())
                .map_err(|e| CoreError::Config(format!("invalid payload.translator: {e}")))?,
        };
        Ok(cfg)
    }

    /// Fills an empty api key from the environment and checks required fields.
    pub fn resolve(mut self) -> Result<Self> {
        if self.api_key.trim().is_empty() {
            self.api_key = std::env::var(API_KEY_ENV).unwrap_or_default();
        }

        if self.api_key.trim().is_empty() {
            return Err(CoreError::Config(format!(
                "api key missing (payload.translator.api_key or {API_KEY_ENV})"
            )));
        }
        if self.model.trim().is_empty() {
            return Err(CoreError::Config("model is required".into()));
        }
        if self.timeout_secs == 0 {
            return Err(CoreError::Config("timeout_secs must be positive".into()));
        }

        Ok(self)
    }
}
