//! WHAT analysis: market, brand and value proposition.

use std::fmt;

use super::types::{AbcClass, BarrierResult, WhatAnalysis};
use crate::brief::Brief;
use crate::error::LlmError;
use crate::llm::{GenerationParams, TextGenerator};
use crate::pipeline::stage::{run_structured, StageRequest};

/// Classified barriers listed per class in the prompt.
const ITEMS_PER_CLASS: usize = 5;

pub const WHAT_SYSTEM_PROMPT: &str = r#"You are a brand strategist. Define WHAT the brand should offer and say.

Cover:
1. Market analysis: overview, competitive landscape, and the open positioning opportunity
2. Brand diagnosis: strengths, weaknesses, and the gap between how the brand sees itself and how people see it
3. Barrier strategies: how to break the most important barriers
4. Value proposition: functional, emotional and social value, plus one core proposition
5. Strategic differentiation points

Respond with this JSON structure:
{
  "market_analysis": {
    "market_overview": "<...>",
    "competitive_landscape": "<...>",
    "positioning_opportunity": "<...>"
  },
  "brand_diagnosis": {
    "strengths": ["<...>"],
    "weaknesses": ["<...>"],
    "perception_gap": "<...>"
  },
  "barrier_strategies": [
    {"barrier": "<...>", "strategy": "<...>", "class": "A|B|C"}
  ],
  "value_proposition": {
    "functional_value": "<...>",
    "emotional_value": "<...>",
    "social_value": "<...>",
    "core_proposition": "<...>"
  },
  "differentiation": ["<...>"]
}"#;

/// Analyses market, brand and value from the brief and, when available, the
/// barrier classification.
#[derive(Clone)]
pub struct WhatAnalyzer {
    generator: TextGenerator,
    params: GenerationParams,
}

impl fmt::Debug for WhatAnalyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WhatAnalyzer")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

impl WhatAnalyzer {
    /// Agent name constant for identification.
    pub const AGENT_NAME: &'static str = "what_analyzer";

    pub fn new(generator: TextGenerator, params: GenerationParams) -> Self {
        Self { generator, params }
    }

    pub async fn analyze(
        &self,
        brief: &Brief,
        barriers: Option<&BarrierResult>,
    ) -> Result<WhatAnalysis, LlmError> {
        let request = StageRequest::new(
            WHAT_SYSTEM_PROMPT,
            build_user_prompt(brief, barriers),
            self.params,
        );
        run_structured(&self.generator, Self::AGENT_NAME, &request).await
    }
}

fn class_heading(class: AbcClass) -> &'static str {
    match class {
        AbcClass::A => "### A: solvable by the service",
        AbcClass::B => "### B: solvable by advertising and branding",
        AbcClass::C => "### C: solvable by PR and social change",
    }
}

/// Brief plus the first classified barriers of each class, when present.
pub fn build_user_prompt(brief: &Brief, barriers: Option<&BarrierResult>) -> String {
    let mut prompt = brief.render();

    if let Some(barriers) = barriers {
        let classification = &barriers.classification;
        if AbcClass::ALL
            .iter()
            .any(|class| !classification.items(*class).is_empty())
        {
            prompt.push_str("\n\n## Barrier classification (from barrier analysis)\n");
            for class in AbcClass::ALL {
                let items = classification.items(class);
                if items.is_empty() {
                    continue;
                }
                prompt.push_str(&format!("\n{}\n", class_heading(class)));
                for item in items.iter().take(ITEMS_PER_CLASS) {
                    prompt.push_str(&format!("- {}: {}\n", item.barrier, item.solution_approach));
                }
            }
        }
    }

    prompt.push_str("\n\nBased on the above, carry out the WHAT analysis.");
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::types::{AbcClassification, AbcItem};

    fn item(id: i64, class: AbcClass) -> AbcItem {
        AbcItem {
            barrier_id: id,
            barrier: format!("barrier {}", id),
            classification: class,
            solution_approach: format!("fix {}", id),
        }
    }

    #[test]
    fn test_prompt_limits_items_per_class() {
        let barriers = BarrierResult {
            classification: AbcClassification {
                a_items: (1..=7).map(|i| item(i, AbcClass::A)).collect(),
                b_items: vec![],
                c_items: vec![item(20, AbcClass::C)],
            },
            ..Default::default()
        };

        let prompt = build_user_prompt(&Brief::new("Bike Share"), Some(&barriers));
        assert!(prompt.contains("- barrier 5: fix 5\n"));
        assert!(!prompt.contains("barrier 6"));
        assert!(!prompt.contains("### B:"));
        assert!(prompt.contains("### C: solvable by PR and social change\n- barrier 20: fix 20"));
    }

    #[test]
    fn test_prompt_without_classification() {
        let prompt = build_user_prompt(&Brief::new("Bike Share"), Some(&BarrierResult::default()));
        assert!(!prompt.contains("Barrier classification"));
        let standalone = build_user_prompt(&Brief::new("Bike Share"), None);
        assert_eq!(prompt, standalone);
    }
}
