//! LLM integration for strategy-brain.
//!
//! Every pipeline stage talks to an LLM through the [`LlmProvider`] trait. Two
//! implementations ship with the crate:
//!
//! - [`OpenAiClient`] for OpenAI-compatible chat completion endpoints
//! - [`AnthropicProvider`] for the Anthropic Messages API
//!
//! [`ProviderConfig`] picks one of them from the environment or from explicit
//! settings, and [`TextGenerator`] wraps the chosen provider for stages:
//!
//! ```ignore
//! use strategy_brain::llm::{GenerationParams, ProviderConfig, TextGenerator};
//!
//! let config = ProviderConfig::from_env()?;
//! let generator = TextGenerator::new(config.build_provider()?, config.model());
//! let map = generator
//!     .generate_structured("You are a strategist.", "Analyse this brief", GenerationParams::default())
//!     .await?;
//! ```

pub mod client;
pub mod config;
pub mod generator;
pub mod providers;

pub use client::{
    Choice, GenerationRequest, GenerationResponse, LlmProvider, Message, OpenAiClient, Usage,
};
pub use config::{ProviderConfig, ProviderKind, ProviderStatus};
pub use generator::{GenerationParams, TextGenerator, JSON_ONLY_INSTRUCTION};
pub use providers::AnthropicProvider;
