//! Stage execution contract.
//!
//! A stage sends one request through [`TextGenerator::generate_structured`]
//! and turns the recovered map into its typed result:
//!
//! 1. strict serde deserialization;
//! 2. on schema mismatch, [`FromStructured::from_structured`] over the same map;
//! 3. on extraction failure, `from_structured` over an empty map.
//!
//! Only transport faults escape a stage.

use serde::de::DeserializeOwned;

use crate::error::{LlmError, StructuredGenerationError};
use crate::llm::{GenerationParams, TextGenerator};
use crate::utils::structured::{from_map_strict, FromStructured, StructuredMap};

/// Provider-agnostic request built deterministically from a stage's inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct StageRequest {
    pub system: String,
    pub user: String,
    pub params: GenerationParams,
}

impl StageRequest {
    pub fn new(system: impl Into<String>, user: impl Into<String>, params: GenerationParams) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
            params,
        }
    }
}

/// Typed construction from a recovered map; never fails.
pub fn construct<T>(label: &str, map: &StructuredMap) -> T
where
    T: DeserializeOwned + FromStructured,
{
    match from_map_strict::<T>(map) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(
                stage = label,
                error = %e,
                fields = map.len(),
                "Response did not match schema, building result field by field"
            );
            T::from_structured(map)
        }
    }
}

/// Run one structured call and build the typed result.
///
/// # Errors
///
/// Only transport faults from the provider.
pub async fn run_structured<T>(
    generator: &TextGenerator,
    label: &str,
    request: &StageRequest,
) -> Result<T, LlmError>
where
    T: DeserializeOwned + FromStructured,
{
    let map = match generator
        .generate_structured(&request.system, &request.user, request.params)
        .await
    {
        Ok(map) => map,
        Err(StructuredGenerationError::Transport(e)) => return Err(e),
        Err(StructuredGenerationError::Extraction(e)) => {
            tracing::warn!(
                stage = label,
                error = %e,
                "No JSON object in response, using default result"
            );
            StructuredMap::new()
        }
    };

    Ok(construct(label, &map))
}
