//! WHO analysis: who the target consumers are and what drives them.

use std::fmt;

use super::types::{BarrierResult, WhoAnalysis};
use crate::brief::Brief;
use crate::error::LlmError;
use crate::llm::{GenerationParams, TextGenerator};
use crate::pipeline::stage::{run_structured, StageRequest};

pub const WHO_SYSTEM_PROMPT: &str = r#"You are a senior consumer insight planner. Dissect the target audience for the brief you are given.

Cover:
1. Core target anatomy: who they are, their daily life, what they value
2. Segmentation: three to five segments, exactly one marked "primary"
3. Consumer insights: unspoken truths, each with the tension the consumer lives with and the opportunity it opens for the brand
4. Unmet needs the category does not serve today

Respond with this JSON structure:
{
  "core_target": {"profile": "<...>", "daily_life": "<...>", "values": "<...>"},
  "segments": [
    {
      "segment_name": "<name>",
      "description": "<who they are>",
      "demographics": "<age, income, location>",
      "psychographics": "<attitudes and values>",
      "behaviors": "<relevant behaviours>",
      "priority": "primary" | "secondary"
    }
  ],
  "insights": [
    {"insight": "<truth>", "tension": "<contradiction>", "opportunity": "<where the brand fits>"}
  ],
  "unmet_needs": ["<need>", "..."]
}"#;

/// Analyses the target audience from the brief and, when available, the key
/// barriers.
#[derive(Clone)]
pub struct WhoAnalyzer {
    generator: TextGenerator,
    params: GenerationParams,
}

impl fmt::Debug for WhoAnalyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WhoAnalyzer")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

impl WhoAnalyzer {
    /// Agent name constant for identification.
    pub const AGENT_NAME: &'static str = "who_analyzer";

    pub fn new(generator: TextGenerator, params: GenerationParams) -> Self {
        Self { generator, params }
    }

    pub async fn analyze(
        &self,
        brief: &Brief,
        barriers: Option<&BarrierResult>,
    ) -> Result<WhoAnalysis, LlmError> {
        let request = StageRequest::new(
            WHO_SYSTEM_PROMPT,
            build_user_prompt(brief, barriers),
            self.params,
        );
        run_structured(&self.generator, Self::AGENT_NAME, &request).await
    }
}

/// Brief plus the key barriers from barrier analysis, when present.
pub fn build_user_prompt(brief: &Brief, barriers: Option<&BarrierResult>) -> String {
    let mut prompt = brief.render();

    let key_barriers = barriers
        .map(BarrierResult::key_barrier_items)
        .unwrap_or_default();
    if !key_barriers.is_empty() {
        prompt.push_str("\n\n## Key barriers (from barrier analysis)\n");
        for barrier in key_barriers {
            prompt.push_str(&format!("- {}\n", barrier.barrier));
        }
    }

    prompt.push_str("\n\nBased on the above, carry out the WHO analysis.");
    prompt
}
