//! Provider selection and credentials.
//!
//! The provider is chosen per orchestrator through [`ProviderConfig`]; there
//! is no process-wide provider state.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::Serialize;

use crate::error::LlmError;
use crate::llm::client::{
    mask_api_key, OpenAiClient, OPENAI_BASE_URL, OPENAI_DEFAULT_MODEL, REQUEST_TIMEOUT_SECS,
};
use crate::llm::providers::anthropic::{
    AnthropicProvider, ANTHROPIC_BASE_URL, ANTHROPIC_DEFAULT_MODEL,
};
use crate::llm::LlmProvider;
use crate::pipeline::config::{parse_env_value, ConfigError};

/// Supported LLM backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    OpenAi,
    Anthropic,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 2] = [ProviderKind::OpenAi, ProviderKind::Anthropic];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Anthropic => "anthropic",
        }
    }

    /// Environment variable holding this provider's API key.
    pub fn api_key_var(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "OPENAI_API_KEY",
            ProviderKind::Anthropic => "ANTHROPIC_API_KEY",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = LlmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(ProviderKind::OpenAi),
            "anthropic" => Ok(ProviderKind::Anthropic),
            other => Err(LlmError::UnknownProvider(other.to_string())),
        }
    }
}

/// Connection settings for one provider.
#[derive(Clone)]
pub struct ProviderSettings {
    pub api_key: Option<String>,
    pub api_base: String,
    pub model: String,
}

impl fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderSettings")
            .field("api_key", &self.api_key.as_deref().map(mask_api_key))
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .finish()
    }
}

/// Availability of a provider, as reported by the `providers` command.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderStatus {
    pub name: ProviderKind,
    pub configured: bool,
    pub active: bool,
    pub model: String,
}

/// Which provider to use and how to reach every supported provider.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Active provider.
    pub provider: ProviderKind,
    /// Model override applied to the active provider.
    pub model_override: Option<String>,
    pub openai: ProviderSettings,
    pub anthropic: ProviderSettings,
    /// Per-request HTTP timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            model_override: None,
            openai: ProviderSettings {
                api_key: None,
                api_base: OPENAI_BASE_URL.to_string(),
                model: OPENAI_DEFAULT_MODEL.to_string(),
            },
            anthropic: ProviderSettings {
                api_key: None,
                api_base: ANTHROPIC_BASE_URL.to_string(),
                model: ANTHROPIC_DEFAULT_MODEL.to_string(),
            },
            timeout_secs: REQUEST_TIMEOUT_SECS,
        }
    }
}

impl ProviderConfig {
    /// Load provider settings from environment variables.
    ///
    /// Reads `LLM_PROVIDER`, `OPENAI_API_KEY`, `OPENAI_API_BASE`,
    /// `OPENAI_MODEL`, `ANTHROPIC_API_KEY`, `ANTHROPIC_API_BASE`,
    /// `ANTHROPIC_MODEL` and `LLM_REQUEST_TIMEOUT_SECS`. Unset variables keep
    /// their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("LLM_PROVIDER") {
            config.provider = val.parse().map_err(|e: LlmError| ConfigError::InvalidValue {
                key: "LLM_PROVIDER".to_string(),
                message: e.to_string(),
            })?;
        }

        config.openai.api_key = non_empty_env("OPENAI_API_KEY");
        if let Some(val) = non_empty_env("OPENAI_API_BASE") {
            config.openai.api_base = val;
        }
        if let Some(val) = non_empty_env("OPENAI_MODEL") {
            config.openai.model = val;
        }

        config.anthropic.api_key = non_empty_env("ANTHROPIC_API_KEY");
        if let Some(val) = non_empty_env("ANTHROPIC_API_BASE") {
            config.anthropic.api_base = val;
        }
        if let Some(val) = non_empty_env("ANTHROPIC_MODEL") {
            config.anthropic.model = val;
        }

        if let Ok(val) = std::env::var("LLM_REQUEST_TIMEOUT_SECS") {
            config.timeout_secs = parse_env_value(&val, "LLM_REQUEST_TIMEOUT_SECS")?;
        }

        Ok(config)
    }

    /// Select the active provider.
    pub fn with_provider(mut self, provider: ProviderKind) -> Self {
        self.provider = provider;
        self
    }

    /// Override the active provider's model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model_override = Some(model.into());
        self
    }

    /// Settings of the given provider.
    pub fn settings(&self, kind: ProviderKind) -> &ProviderSettings {
        match kind {
            ProviderKind::OpenAi => &self.openai,
            ProviderKind::Anthropic => &self.anthropic,
        }
    }

    /// Model requests are sent to with the active provider.
    pub fn model(&self) -> &str {
        self.model_override
            .as_deref()
            .unwrap_or(&self.settings(self.provider).model)
    }

    /// Construct the active provider.
    ///
    /// # Errors
    ///
    /// Returns `LlmError::MissingApiKey` when the active provider has no key.
    pub fn build_provider(&self) -> Result<Arc<dyn LlmProvider>, LlmError> {
        let settings = self.settings(self.provider);
        let api_key = settings
            .api_key
            .clone()
            .ok_or_else(|| LlmError::MissingApiKey(self.provider.api_key_var().to_string()))?;

        tracing::info!(
            provider = %self.provider,
            model = %self.model(),
            api_base = %settings.api_base,
            "Building LLM provider"
        );

        let provider: Arc<dyn LlmProvider> = match self.provider {
            ProviderKind::OpenAi => Arc::new(OpenAiClient::new(
                settings.api_base.clone(),
                api_key,
                self.model(),
                self.timeout_secs,
            )?),
            ProviderKind::Anthropic => Arc::new(AnthropicProvider::new(
                settings.api_base.clone(),
                api_key,
                self.model(),
                self.timeout_secs,
            )?),
        };
        Ok(provider)
    }

    /// Configuration status of every supported provider.
    pub fn statuses(&self) -> Vec<ProviderStatus> {
        ProviderKind::ALL
            .iter()
            .map(|&kind| {
                let active = kind == self.provider;
                ProviderStatus {
                    name: kind,
                    configured: self.settings(kind).api_key.is_some(),
                    active,
                    model: if active {
                        self.model().to_string()
                    } else {
                        self.settings(kind).model.clone()
                    },
                }
            })
            .collect()
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
