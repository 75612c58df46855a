//! Error types for strategy-brain operations.
//!
//! Defines the error taxonomy shared across subsystems:
//! - LLM transport faults (network, auth, quota, malformed API envelopes)
//! - Structured generation (transport fault or unrecoverable response text)
//! - Brief loading for the command line

use thiserror::Error;

use crate::utils::json_extraction::JsonExtractionError;

/// Errors that can occur during LLM operations.
///
/// Every variant is a transport-level fault: the external call itself did not
/// produce text. These are never recovered inside a stage.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Missing API key: {0} environment variable not set")]
    MissingApiKey(String),

    #[error("Unknown LLM provider '{0}': expected 'openai' or 'anthropic'")]
    UnknownProvider(String),

    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    #[error("Failed to parse LLM response: {0}")]
    ParseError(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Context length exceeded: {limit} tokens")]
    ContextLengthExceeded { limit: u32 },

    #[error("API error ({code}): {message}")]
    ApiError { code: u16, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from a structured generation call.
///
/// Stages recover `Extraction` locally and propagate `Transport`.
#[derive(Debug, Error)]
pub enum StructuredGenerationError {
    #[error(transparent)]
    Transport(#[from] LlmError),

    #[error(transparent)]
    Extraction(#[from] JsonExtractionError),
}

/// Errors that can occur while loading a brief from disk.
#[derive(Debug, Error)]
pub enum BriefError {
    #[error("Failed to read brief file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON brief parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML brief parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Brief must specify a product name")]
    MissingProductName,
}
