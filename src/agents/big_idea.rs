//! BIG IDEA generation from the WHO and WHAT analyses.

use std::fmt;

use serde_json::Value;

use super::types::{BigIdea, WhatAnalysis, WhoAnalysis};
use crate::brief::{or_unspecified, NOT_SPECIFIED};
use crate::error::LlmError;
use crate::llm::{GenerationParams, TextGenerator};
use crate::pipeline::stage::{run_structured, StageRequest};
use crate::utils::structured::value_to_text;

pub const BIG_IDEA_SYSTEM_PROMPT: &str = r#"You are a creative director. Turn the strategic analysis you are given into one BIG IDEA: a single, simple thought that can carry a brand's communication for years.

A strong BIG IDEA:
- resolves the tension in a consumer insight
- is rooted in something only this brand can credibly say
- is short enough to remember and open enough to execute in many media

Score the idea from 1 to 5 on novelty, relevance, simplicity and extendability.

Respond with this JSON structure:
{
  "idea": "<the big idea in one sentence>",
  "rationale": "<why this idea follows from the analysis>",
  "evaluation": {"novelty": <1-5>, "relevance": <1-5>, "simplicity": <1-5>, "extendability": <1-5>},
  "alternative_ideas": ["<runner-up idea>", "..."]
}"#;

/// Generates the BIG IDEA that the copy and ad-plan stages build on.
#[derive(Clone)]
pub struct BigIdeaGenerator {
    generator: TextGenerator,
    params: GenerationParams,
}

impl fmt::Debug for BigIdeaGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BigIdeaGenerator")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

impl BigIdeaGenerator {
    /// Agent name constant for identification.
    pub const AGENT_NAME: &'static str = "big_idea";

    pub fn new(generator: TextGenerator, params: GenerationParams) -> Self {
        Self { generator, params }
    }

    pub async fn generate(&self, who: &WhoAnalysis, what: &WhatAnalysis) -> Result<BigIdea, LlmError> {
        let request = StageRequest::new(
            BIG_IDEA_SYSTEM_PROMPT,
            build_user_prompt(who, what),
            self.params,
        );
        let idea: BigIdea = run_structured(&self.generator, Self::AGENT_NAME, &request).await?;
        tracing::debug!(
            alternatives = idea.alternative_ideas.len(),
            "BIG IDEA generated"
        );
        Ok(idea)
    }
}

fn bullets<'a>(items: impl IntoIterator<Item = &'a String>) -> String {
    let lines: Vec<String> = items.into_iter().map(|item| format!("- {}", item)).collect();
    if lines.is_empty() {
        NOT_SPECIFIED.to_string()
    } else {
        lines.join("\n")
    }
}

/// WHO and WHAT summary the idea is generated from.
pub fn build_user_prompt(who: &WhoAnalysis, what: &WhatAnalysis) -> String {
    let core_target = if who.core_target.is_empty() {
        NOT_SPECIFIED.to_string()
    } else {
        value_to_text(&Value::Object(who.core_target.clone()))
    };

    let insights: Vec<String> = who
        .insights
        .iter()
        .map(|i| format!("{} (tension: {})", i.insight, or_unspecified(&i.tension)))
        .collect();

    format!(
        "## WHO summary\n\n\
         ### Core target\n{}\n\n\
         ### Consumer insights\n{}\n\n\
         ### Unmet needs\n{}\n\n\
         ## WHAT summary\n\n\
         ### Brand strengths\n{}\n\n\
         ### Core value proposition\n{}\n\n\
         ### Strategic differentiation\n{}\n\n\
         ### Positioning opportunity\n{}\n\n\
         Based on the WHO and WHAT analysis above, generate the strongest BIG IDEA.",
        core_target,
        bullets(&insights),
        bullets(&who.unmet_needs),
        bullets(&what.brand_diagnosis.strengths),
        or_unspecified(&what.value_proposition.core_proposition),
        bullets(&what.differentiation),
        or_unspecified(&what.market_analysis.positioning_opportunity),
    )
}
