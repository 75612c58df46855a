//! LLM provider implementations beyond the OpenAI-compatible client.

pub mod anthropic;

pub use anthropic::AnthropicProvider;

pub use super::client::LlmProvider;
