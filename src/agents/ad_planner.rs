//! Advertising plan generation: one campaign plan per ideation method.

use std::fmt;

use super::types::{AdPlanResult, BigIdea, WhatAnalysis, WhoAnalysis};
use crate::brief::{or_unspecified, Brief, NOT_SPECIFIED};
use crate::error::LlmError;
use crate::llm::{GenerationParams, TextGenerator};
use crate::pipeline::stage::{run_structured, StageRequest};

/// Differentiation points carried into the prompt.
const DIFFERENTIATION_POINTS: usize = 3;

pub const AD_PLAN_SYSTEM_PROMPT: &str = r#"You are a campaign planner. Turn the BIG IDEA into concrete advertising plans.

First define a brand concept and the story behind it, and list the new perspectives on the category it opens up.

Then write one plan for each of these six ideation methods:
1. Reversal: flip a category convention
2. Association: borrow meaning from an unrelated world
3. Exaggeration: push the insight to its extreme
4. Participation: make the audience complete the message
5. Context: let the place or moment carry the message
6. Social: turn the message into a conversation people want to join

Each plan names its method, states the core message and the mechanism that makes it work, gives out-of-home copy lines with rationale, social posts by format, one experiential tactic, success criteria, and example KPIs.

Respond with this JSON structure:
{
  "brand_concept": "<...>",
  "concept_story": "<...>",
  "new_perspectives": [{"perspective": "<...>", "description": "<...>"}],
  "plans": [
    {
      "plan_name": "<...>",
      "method": "<ideation method>",
      "core_message": "<...>",
      "mechanism": "<...>",
      "ooh_copies": [{"copy": "<...>", "rationale": "<...>"}],
      "sns_posts": [{"format": "<...>", "content": "<...>"}],
      "experiential_tactic": "<...>",
      "success_criteria": "<...>",
      "kpi_examples": ["<...>"]
    }
  ],
  "recommended_plan": <index of the recommended plan, starting at 0>,
  "recommendation_reason": "<why>"
}"#;

/// Builds campaign plans from the brief, the analyses and the BIG IDEA.
#[derive(Clone)]
pub struct AdPlanner {
    generator: TextGenerator,
    params: GenerationParams,
}

impl fmt::Debug for AdPlanner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdPlanner")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

impl AdPlanner {
    /// Agent name constant for identification.
    pub const AGENT_NAME: &'static str = "ad_planner";

    pub fn new(generator: TextGenerator, params: GenerationParams) -> Self {
        Self { generator, params }
    }

    pub async fn generate(
        &self,
        brief: &Brief,
        who: &WhoAnalysis,
        what: &WhatAnalysis,
        big_idea: &BigIdea,
    ) -> Result<AdPlanResult, LlmError> {
        let request = StageRequest::new(
            AD_PLAN_SYSTEM_PROMPT,
            build_user_prompt(brief, who, what, big_idea),
            self.params,
        );
        let result: AdPlanResult = run_structured(&self.generator, Self::AGENT_NAME, &request).await?;
        tracing::debug!(plans = result.plans.len(), "Ad plans generated");
        Ok(result)
    }
}

pub fn build_user_prompt(
    brief: &Brief,
    who: &WhoAnalysis,
    what: &WhatAnalysis,
    big_idea: &BigIdea,
) -> String {
    let target = who
        .primary_segment()
        .map(|s| or_unspecified(&s.description))
        .unwrap_or(NOT_SPECIFIED);
    let (insight, tension) = who
        .insights
        .first()
        .map(|i| (or_unspecified(&i.insight), or_unspecified(&i.tension)))
        .unwrap_or((NOT_SPECIFIED, NOT_SPECIFIED));
    let differentiation = what
        .differentiation
        .iter()
        .take(DIFFERENTIATION_POINTS)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    let value = &what.value_proposition;

    format!(
        "## Brief\n\n\
         **Product / service**: {}\n\
         **Description**: {}\n\
         **Target market**: {}\n\
         **Objectives**: {}\n\n\
         ## BIG IDEA\n{}\n\n\
         ## Core target\n{}\n\n\
         ## Core insight\n{}\n\n\
         ## Target tension\n{}\n\n\
         ## Value delivered\n\
         - Functional value: {}\n\
         - Emotional value: {}\n\
         - Social value: {}\n\
         - Core proposition: {}\n\n\
         ## Differentiation\n{}\n\n\
         Using the information above, write one advertising plan for each of the six ideation methods.",
        brief.product_name,
        or_unspecified(&brief.product_description),
        or_unspecified(&brief.target_market),
        or_unspecified(&brief.objectives),
        or_unspecified(&big_idea.idea),
        target,
        insight,
        tension,
        or_unspecified(&value.functional_value),
        or_unspecified(&value.emotional_value),
        or_unspecified(&value.social_value),
        or_unspecified(&value.core_proposition),
        or_unspecified(&differentiation),
    )
}
