//! Alternative perspective: reframes the business challenge as a human one
//! in three moves (Doubt, Discover, Design).
//!
//! The result stands beside the main WHO/WHAT/BIG IDEA chain. Nothing
//! downstream reads it, so it runs alongside barrier analysis and only
//! appears in the composite result.

use std::fmt;

use super::types::AlternativePerspective;
use crate::brief::{or_unspecified, Brief};
use crate::error::LlmError;
use crate::llm::{GenerationParams, TextGenerator};
use crate::pipeline::stage::{run_structured, StageRequest};

pub const REFRAMING_SYSTEM_PROMPT: &str = r#"You are a specialist in challenge reframing with the Doubt / Discover / Design model. You turn business challenges into human challenges and unlock possibilities beyond the average answer.

This analysis is an independent alternative perspective, separate from the main WHO / WHAT / BIG IDEA strategy.

1. Doubt: question the challenge as given. Ask provocative questions from different angles, expose the hidden assumptions, and name the average answers everyone would reach for.
2. Discover: restate the business challenge as a human challenge. What hidden truth about people does it rest on, and what possibility would solving it unlock? Describe the reframing journey from the old framing to the new one.
3. Design: propose ideas that solve the human challenge. Say what each idea enables, why it is not the average answer, and what the world looks like after it. Recommend one.

Respond with this JSON structure:
{
  "doubt": {
    "original_challenge": "<...>",
    "questions": [{"angle": "<...>", "question": "<...>", "insight": "<...>"}],
    "hidden_assumptions": ["<...>"],
    "average_answers": ["<...>"]
  },
  "discover": {
    "business_challenge": "<...>",
    "human_challenge": "<...>",
    "hidden_truth": "<...>",
    "possibility_to_unlock": "<...>",
    "reframing_journey": {"from": "<...>", "to": "<...>", "because": "<...>"}
  },
  "design": {
    "ideas": [{"concept": "<...>", "enables": "<...>", "why_not_average": "<...>", "world_after": "<...>"}],
    "recommended_idea": <index of the recommended idea, starting at 0>,
    "recommendation_reason": "<...>"
  }
}"#;

/// Runs the Doubt / Discover / Design reframing for a brief.
#[derive(Clone)]
pub struct ReframingAnalyzer {
    generator: TextGenerator,
    params: GenerationParams,
}

impl fmt::Debug for ReframingAnalyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReframingAnalyzer")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

impl ReframingAnalyzer {
    /// Agent name constant for identification.
    pub const AGENT_NAME: &'static str = "reframing";

    pub fn new(generator: TextGenerator, params: GenerationParams) -> Self {
        Self { generator, params }
    }

    pub async fn analyze(&self, brief: &Brief) -> Result<AlternativePerspective, LlmError> {
        let request = StageRequest::new(REFRAMING_SYSTEM_PROMPT, build_user_prompt(brief), self.params);
        run_structured(&self.generator, Self::AGENT_NAME, &request).await
    }
}

pub fn build_user_prompt(brief: &Brief) -> String {
    format!(
        "## Brief\n\n\
         **Product / service**: {}\n\
         **Description**: {}\n\
         **Objectives**: {}\n\
         **Current situation**: {}\n\
         **Target market**: {}\n\
         **Additional information**: {}\n\n\
         Run the Doubt / Discover / Design analysis for this brief.",
        brief.product_name,
        or_unspecified(&brief.product_description),
        or_unspecified(&brief.objectives),
        or_unspecified(&brief.current_situation),
        or_unspecified(&brief.target_market),
        or_unspecified(&brief.additional_info),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{GenerationRequest, GenerationResponse, LlmProvider};
    use async_trait::async_trait;
    use std::sync::Arc;

    #[test]
    fn test_prompt_fills_missing_fields() {
        let brief = Brief::new("Public Library").with_objectives("Bring teenagers back");
        let prompt = build_user_prompt(&brief);
        assert!(prompt.contains("**Product / service**: Public Library"));
        assert!(prompt.contains("**Objectives**: Bring teenagers back"));
        assert!(prompt.contains("**Current situation**: not specified"));
    }

    struct LooseProvider;

    #[async_trait]
    impl LlmProvider for LooseProvider {
        async fn generate(&self, _: GenerationRequest) -> Result<GenerationResponse, LlmError> {
            Ok(GenerationResponse::single(
                "mock",
                "```json\n{\"doubt\": {\"questions\": [\"Is quiet really the point?\"], \"hidden_assumptions\": \"Teens dislike reading\"}, \"design\": {\"recommended_idea\": \"1\"}}\n```",
            ))
        }
    }

    #[tokio::test]
    async fn test_analyze_coerces_loose_shapes() {
        let analyzer = ReframingAnalyzer::new(
            TextGenerator::new(Arc::new(LooseProvider), "test"),
            GenerationParams::default(),
        );
        let result = analyzer.analyze(&Brief::new("Public Library")).await.unwrap();

        assert_eq!(result.doubt.questions.len(), 1);
        assert_eq!(result.doubt.questions[0].question, "Is quiet really the point?");
        assert_eq!(result.doubt.hidden_assumptions, vec!["Teens dislike reading"]);
        assert_eq!(result.design.recommended_idea, 1);
        assert!(result.discover.human_challenge.is_empty());
    }
}
