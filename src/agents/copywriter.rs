//! Copywriting: ten headline variations built on the BIG IDEA.

use std::fmt;

use super::types::{BigIdea, CopyOutput, WhatAnalysis, WhoAnalysis};
use crate::brief::{or_unspecified, NOT_SPECIFIED};
use crate::error::LlmError;
use crate::llm::{GenerationParams, TextGenerator};
use crate::pipeline::stage::{run_structured, StageRequest};

pub const COPY_SYSTEM_PROMPT: &str = r#"You are an award-winning copywriter. Write advertising copy that expresses the BIG IDEA you are given.

Write ten variations. Each one uses a different angle (benefit, emotion, provocation, story, fact, humour...) and a different technique (contrast, question, metaphor, repetition, understatement...).

First restate the strategic brief in one object, then the variations, then pick the strongest one.

Respond with this JSON structure:
{
  "strategic_brief": {"target": "<...>", "insight": "<...>", "promise": "<...>", "tone": "<...>"},
  "variations": [
    {
      "headline": "<headline>",
      "subhead": "<subhead>",
      "body": "<short body copy>",
      "angle": "<angle>",
      "technique": "<technique>",
      "why_it_works": "<one sentence>"
    }
  ],
  "recommended": <index of the recommended variation, starting at 0>,
  "recommendation_reason": "<why>"
}"#;

/// Writes copy variations for the BIG IDEA.
#[derive(Clone)]
pub struct Copywriter {
    generator: TextGenerator,
    params: GenerationParams,
}

impl fmt::Debug for Copywriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Copywriter")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

impl Copywriter {
    /// Agent name constant for identification.
    pub const AGENT_NAME: &'static str = "copywriter";

    pub fn new(generator: TextGenerator, params: GenerationParams) -> Self {
        Self { generator, params }
    }

    pub async fn write(
        &self,
        big_idea: &BigIdea,
        who: &WhoAnalysis,
        what: &WhatAnalysis,
    ) -> Result<CopyOutput, LlmError> {
        let request = StageRequest::new(
            COPY_SYSTEM_PROMPT,
            build_user_prompt(big_idea, who, what),
            self.params,
        );
        run_structured(&self.generator, Self::AGENT_NAME, &request).await
    }
}

pub fn build_user_prompt(big_idea: &BigIdea, who: &WhoAnalysis, what: &WhatAnalysis) -> String {
    let target = who
        .primary_segment()
        .map(|s| or_unspecified(&s.description))
        .unwrap_or(NOT_SPECIFIED);
    let insight = who
        .insights
        .first()
        .map(|i| or_unspecified(&i.insight))
        .unwrap_or(NOT_SPECIFIED);
    let value = &what.value_proposition;

    format!(
        "## BIG IDEA\n{}\n\n\
         ### Rationale\n{}\n\n\
         ## Target\n{}\n\n\
         ## Core insight\n{}\n\n\
         ## Value delivered\n\
         - Functional value: {}\n\
         - Emotional value: {}\n\
         - Social value: {}\n\n\
         ## Core value proposition\n{}\n\n\
         Based on the BIG IDEA above, write 10 copy variations. \
         Give each a different angle and technique.",
        or_unspecified(&big_idea.idea),
        or_unspecified(&big_idea.rationale),
        target,
        insight,
        or_unspecified(&value.functional_value),
        or_unspecified(&value.emotional_value),
        or_unspecified(&value.social_value),
        or_unspecified(&value.core_proposition),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::types::{ConsumerInsight, SegmentPriority, TargetSegment};

    fn segment(name: &str, priority: SegmentPriority) -> TargetSegment {
        TargetSegment {
            segment_name: name.to_string(),
            description: format!("{} people", name),
            priority,
            ..Default::default()
        }
    }

    #[test]
    fn test_prompt_uses_primary_segment() {
        let who = WhoAnalysis {
            segments: vec![
                segment("Casual", SegmentPriority::Secondary),
                segment("Commuter", SegmentPriority::Primary),
            ],
            insights: vec![ConsumerInsight {
                insight: "Mornings are a race".to_string(),
                ..Default::default()
            }],
            ..Default::default()
        };
        let idea = BigIdea {
            idea: "Win the first ten minutes".to_string(),
            ..Default::default()
        };

        let prompt = build_user_prompt(&idea, &who, &WhatAnalysis::default());
        assert!(prompt.starts_with("## BIG IDEA\nWin the first ten minutes"));
        assert!(prompt.contains("## Target\nCommuter people"));
        assert!(prompt.contains("## Core insight\nMornings are a race"));
        assert!(prompt.contains("- Functional value: not specified"));
    }

    #[test]
    fn test_prompt_without_segments() {
        let prompt = build_user_prompt(&BigIdea::default(), &WhoAnalysis::default(), &WhatAnalysis::default());
        assert!(prompt.contains("## Target\nnot specified"));
        assert!(prompt.contains("## Core insight\nnot specified"));
    }
}
