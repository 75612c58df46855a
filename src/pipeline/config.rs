//! Pipeline configuration for the orchestrator.
//!
//! Holds the per-stage sampling parameters and the streaming channel size.
//! Provider selection lives in [`crate::llm::ProviderConfig`].

use thiserror::Error;

use crate::llm::generator::{GenerationParams, MAX_TEMPERATURE, MIN_TEMPERATURE};

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable has an invalid value.
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    /// Configuration validation failed.
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Sampling parameters for every external call the pipeline makes.
///
/// Barrier analysis makes three sequential calls, each with its own entry.
#[derive(Debug, Clone, PartialEq)]
pub struct StageParams {
    pub barriers: GenerationParams,
    pub causality: GenerationParams,
    pub classification: GenerationParams,
    pub who: GenerationParams,
    pub what: GenerationParams,
    pub big_idea: GenerationParams,
    pub copy: GenerationParams,
    pub ad_plan: GenerationParams,
    pub alternative: GenerationParams,
}

impl Default for StageParams {
    fn default() -> Self {
        Self {
            barriers: GenerationParams::new(0.7, 4096),
            causality: GenerationParams::new(0.7, 4096),
            classification: GenerationParams::new(0.7, 4096),
            who: GenerationParams::new(0.7, 4096),
            what: GenerationParams::new(0.7, 4096),
            big_idea: GenerationParams::new(0.8, 4096),
            copy: GenerationParams::new(0.9, 4096),
            ad_plan: GenerationParams::new(0.85, 8192),
            alternative: GenerationParams::new(0.7, 4096),
        }
    }
}

impl StageParams {
    fn entries(&self) -> [(&'static str, GenerationParams); 9] {
        [
            ("barriers", self.barriers),
            ("causality", self.causality),
            ("classification", self.classification),
            ("who", self.who),
            ("what", self.what),
            ("big_idea", self.big_idea),
            ("copy", self.copy),
            ("ad_plan", self.ad_plan),
            ("alternative", self.alternative),
        ]
    }

    fn map(&self, f: impl Fn(GenerationParams) -> GenerationParams) -> Self {
        Self {
            barriers: f(self.barriers),
            causality: f(self.causality),
            classification: f(self.classification),
            who: f(self.who),
            what: f(self.what),
            big_idea: f(self.big_idea),
            copy: f(self.copy),
            ad_plan: f(self.ad_plan),
            alternative: f(self.alternative),
        }
    }
}

/// Configuration for the pipeline orchestrator.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Capacity of the progress event channel in streaming runs.
    pub event_buffer: usize,
    /// Upper bound applied to every stage's `max_tokens`.
    pub max_tokens_cap: Option<u32>,
    /// Per-call sampling parameters.
    pub stages: StageParams,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            event_buffer: 32,
            max_tokens_cap: None,
            stages: StageParams::default(),
        }
    }
}

impl PipelineConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables.
    ///
    /// Reads `PIPELINE_EVENT_BUFFER` and `PIPELINE_MAX_TOKENS_CAP`; unset
    /// variables keep their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("PIPELINE_EVENT_BUFFER") {
            config.event_buffer = parse_env_value(&val, "PIPELINE_EVENT_BUFFER")?;
        }

        if let Ok(val) = std::env::var("PIPELINE_MAX_TOKENS_CAP") {
            config.max_tokens_cap = Some(parse_env_value(&val, "PIPELINE_MAX_TOKENS_CAP")?);
        }

        Ok(config)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.event_buffer == 0 {
            return Err(ConfigError::ValidationFailed(
                "event_buffer must be greater than 0".to_string(),
            ));
        }

        if self.max_tokens_cap == Some(0) {
            return Err(ConfigError::ValidationFailed(
                "max_tokens_cap must be greater than 0".to_string(),
            ));
        }

        for (name, params) in self.stages.entries() {
            if !(MIN_TEMPERATURE..=MAX_TEMPERATURE).contains(&params.temperature) {
                return Err(ConfigError::ValidationFailed(format!(
                    "{} temperature must be between {} and {}, got {}",
                    name, MIN_TEMPERATURE, MAX_TEMPERATURE, params.temperature
                )));
            }
            if params.max_tokens == 0 {
                return Err(ConfigError::ValidationFailed(format!(
                    "{} max_tokens must be greater than 0",
                    name
                )));
            }
        }

        Ok(())
    }

    /// Stage parameters with `max_tokens_cap` applied.
    pub fn effective_stage_params(&self) -> StageParams {
        self.stages.map(|p| p.capped(self.max_tokens_cap))
    }

    /// Builder method to set the event channel capacity.
    pub fn with_event_buffer(mut self, size: usize) -> Self {
        self.event_buffer = size;
        self
    }

    /// Builder method to cap every stage's output tokens.
    pub fn with_max_tokens_cap(mut self, cap: u32) -> Self {
        self.max_tokens_cap = Some(cap);
        self
    }

    /// Builder method to replace the per-stage parameters.
    pub fn with_stage_params(mut self, stages: StageParams) -> Self {
        self.stages = stages;
        self
    }
}

/// Parse an environment variable value into a type.
pub(crate) fn parse_env_value<T: std::str::FromStr>(value: &str, key: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("could not parse '{}'", value),
    })
}
