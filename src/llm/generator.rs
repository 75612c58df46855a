//! Text generation facade used by pipeline stages.
//!
//! [`TextGenerator`] turns a (system, user, params) triple into a single
//! provider call and returns plain text. The structured variant appends a
//! JSON-only instruction to the system prompt and runs the extraction engine
//! over the response.

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::error::{LlmError, StructuredGenerationError};
use crate::llm::{GenerationRequest, LlmProvider, Message};
use crate::utils::json_extraction::extract_structured;
use crate::utils::structured::StructuredMap;

/// Appended to every system prompt of a structured generation call.
pub const JSON_ONLY_INSTRUCTION: &str = "\n\nIMPORTANT: Respond with a single valid JSON object only. \
Do not include any explanation, commentary, or markdown code fences before or after the JSON.";

/// Minimum sampling temperature.
pub const MIN_TEMPERATURE: f64 = 0.0;

/// Maximum sampling temperature.
pub const MAX_TEMPERATURE: f64 = 2.0;

/// Sampling parameters for one external call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    /// Sampling temperature in `[0.0, 2.0]`.
    pub temperature: f64,
    /// Maximum output tokens.
    pub max_tokens: u32,
}

impl GenerationParams {
    pub const fn new(temperature: f64, max_tokens: u32) -> Self {
        Self {
            temperature,
            max_tokens,
        }
    }

    /// Copy with the temperature clamped to `[0.0, 2.0]` and at least one token.
    pub fn clamped(self) -> Self {
        Self {
            temperature: self.temperature.clamp(MIN_TEMPERATURE, MAX_TEMPERATURE),
            max_tokens: self.max_tokens.max(1),
        }
    }

    /// Copy with `max_tokens` limited to `cap`.
    pub fn capped(self, cap: Option<u32>) -> Self {
        match cap {
            Some(cap) => Self {
                max_tokens: self.max_tokens.min(cap),
                ..self
            },
            None => self,
        }
    }
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self::new(0.7, 4096)
    }
}

/// Provider handle plus the model every call is sent to.
///
/// Cheap to clone; clones share the provider.
#[derive(Clone)]
pub struct TextGenerator {
    provider: Arc<dyn LlmProvider>,
    model: String,
}

impl std::fmt::Debug for TextGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextGenerator")
            .field("provider", &"<dyn LlmProvider>")
            .field("model", &self.model)
            .finish()
    }
}

impl TextGenerator {
    /// Create a generator. An empty `model` defers to the provider's default.
    pub fn new(provider: Arc<dyn LlmProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    /// Get the model requests are sent to.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Single external call returning the first choice's text.
    ///
    /// A response without choices or content yields an empty string.
    pub async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        params: GenerationParams,
    ) -> Result<String, LlmError> {
        let params = params.clamped();
        let request = GenerationRequest::new(
            self.model.clone(),
            vec![Message::system(system_prompt), Message::user(user_prompt)],
        )
        .with_temperature(params.temperature)
        .with_max_tokens(params.max_tokens);

        let started = Instant::now();
        let response = self.provider.generate(request).await?;
        let content = response.first_content().unwrap_or_default().to_string();

        tracing::debug!(
            model = %response.model,
            elapsed_ms = started.elapsed().as_millis() as u64,
            completion_tokens = response.usage.completion_tokens,
            chars = content.len(),
            "LLM call completed"
        );

        Ok(content)
    }

    /// External call constrained to JSON output, followed by extraction.
    ///
    /// # Errors
    ///
    /// `Transport` when the call itself fails; `Extraction` when no JSON
    /// object can be recovered from the response text.
    pub async fn generate_structured(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        params: GenerationParams,
    ) -> Result<StructuredMap, StructuredGenerationError> {
        let system = format!("{}{}", system_prompt, JSON_ONLY_INSTRUCTION);
        let text = self.generate(&system, user_prompt, params).await?;
        Ok(extract_structured(&text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::GenerationResponse;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct RecordingProvider {
        reply: String,
        seen: Mutex<Vec<GenerationRequest>>,
    }

    #[async_trait]
    impl LlmProvider for RecordingProvider {
        async fn generate(
            &self,
            request: GenerationRequest,
        ) -> Result<GenerationResponse, LlmError> {
            self.seen.lock().unwrap().push(request);
            Ok(GenerationResponse::single("mock", self.reply.clone()))
        }
    }

    fn generator(reply: &str) -> (Arc<RecordingProvider>, TextGenerator) {
        let provider = Arc::new(RecordingProvider {
            reply: reply.to_string(),
            seen: Mutex::new(Vec::new()),
        });
        let generator = TextGenerator::new(provider.clone(), "test-model");
        (provider, generator)
    }

    #[test]
    fn test_params_clamped() {
        let params = GenerationParams::new(3.5, 0).clamped();
        assert_eq!(params.temperature, 2.0);
        assert_eq!(params.max_tokens, 1);

        let params = GenerationParams::new(-1.0, 10).clamped();
        assert_eq!(params.temperature, 0.0);
    }

    #[test]
    fn test_params_capped() {
        let params = GenerationParams::new(0.85, 8192);
        assert_eq!(params.capped(Some(2048)).max_tokens, 2048);
        assert_eq!(params.capped(Some(10_000)).max_tokens, 8192);
        assert_eq!(params.capped(None), params);
    }

    #[tokio::test]
    async fn test_generate_builds_request() {
        let (provider, generator) = generator("hello");
        let text = generator
            .generate("sys", "usr", GenerationParams::new(0.9, 100))
            .await
            .unwrap();
        assert_eq!(text, "hello");

        let seen = provider.seen.lock().unwrap();
        let request = &seen[0];
        assert_eq!(request.model, "test-model");
        assert_eq!(request.messages[0], Message::system("sys"));
        assert_eq!(request.messages[1], Message::user("usr"));
        assert_eq!(request.temperature, Some(0.9));
        assert_eq!(request.max_tokens, Some(100));
    }

    #[tokio::test]
    async fn test_generate_structured_appends_instruction() {
        let (provider, generator) = generator("Sure! ```json\n{\"a\": 1,}\n``` Hope that helps!");
        let map = generator
            .generate_structured("sys", "usr", GenerationParams::default())
            .await
            .unwrap();
        assert_eq!(map["a"], 1);

        let seen = provider.seen.lock().unwrap();
        assert!(seen[0].messages[0].content.starts_with("sys"));
        assert!(seen[0].messages[0].content.ends_with(JSON_ONLY_INSTRUCTION));
    }

    #[tokio::test]
    async fn test_generate_structured_empty_reply_is_extraction_error() {
        let (_, generator) = generator("");
        let err = generator
            .generate_structured("sys", "usr", GenerationParams::default())
            .await
            .unwrap_err();
        assert!(matches!(err, StructuredGenerationError::Extraction(_)));
    }
}
