//! Barrier analysis: why people do not use the product.
//!
//! Runs three sequential LLM steps and one local rendering step:
//! 1. Barrier inventory (about thirty reasons for non-use)
//! 2. Causality between barriers and the key, most connected barriers
//! 3. A/B/C classification with a solution approach per barrier
//! 4. A Mermaid flowchart of the result

use std::fmt;

use super::mermaid::render_barrier_diagram;
use super::types::{AbcClassification, BarrierList, BarrierResult, CausalityResult};
use crate::brief::Brief;
use crate::error::LlmError;
use crate::llm::{GenerationParams, TextGenerator};
use crate::pipeline::stage::{run_structured, StageRequest};

pub const BARRIER_SYSTEM_PROMPT: &str = r#"You are a consumer behaviour strategist. Your job is to uncover every reason a person might NOT use a product or service.

Think across four categories:
- product: price, quality, convenience, availability
- psychological: anxiety, distrust, inertia, self-image
- social: what others think, norms, peer pressure
- cultural: habits, customs, traditions

Write each barrier in the consumer's own voice and keep it specific to this product.

Respond with this JSON structure:
{
  "barriers": [
    {"id": 1, "barrier": "<reason for not using it>", "category": "<product|psychological|social|cultural>"}
  ]
}"#;

pub const CAUSALITY_SYSTEM_PROMPT: &str = r#"You are a systems thinker mapping cause and effect between consumer barriers.

For the numbered barriers you are given, identify which barriers cause or reinforce others. Then identify the key barriers: the ones with the most connections, whose removal would unlock the most others.

Respond with this JSON structure:
{
  "relations": [
    {"from_id": <cause barrier id>, "to_id": <effect barrier id>, "relation": "<how one leads to the other>"}
  ],
  "key_barriers": [<barrier id>, ...]
}"#;

pub const CLASSIFY_SYSTEM_PROMPT: &str = r#"You are a marketing strategist deciding who should remove each consumer barrier.

Classify every barrier into exactly one class:
- A: can be solved by the product or service itself (features, pricing, distribution)
- B: can be solved by advertising and branding (perception, emotion, meaning)
- C: can be solved by PR and social change (norms, culture, public conversation)

Give a concrete solution approach for each barrier.

Respond with this JSON structure:
{
  "a_items": [{"barrier_id": <id>, "barrier": "<text>", "classification": "A", "solution_approach": "<approach>"}],
  "b_items": [{"barrier_id": <id>, "barrier": "<text>", "classification": "B", "solution_approach": "<approach>"}],
  "c_items": [{"barrier_id": <id>, "barrier": "<text>", "classification": "C", "solution_approach": "<approach>"}]
}"#;

/// Sampling parameters for the three LLM steps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarrierStepParams {
    pub inventory: GenerationParams,
    pub causality: GenerationParams,
    pub classification: GenerationParams,
}

impl Default for BarrierStepParams {
    fn default() -> Self {
        Self {
            inventory: GenerationParams::new(0.7, 4096),
            causality: GenerationParams::new(0.7, 4096),
            classification: GenerationParams::new(0.7, 4096),
        }
    }
}

/// Runs the full barrier analysis for a brief.
#[derive(Clone)]
pub struct BarrierAnalyzer {
    generator: TextGenerator,
    params: BarrierStepParams,
}

impl fmt::Debug for BarrierAnalyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BarrierAnalyzer")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

impl BarrierAnalyzer {
    /// Agent name constant for identification.
    pub const AGENT_NAME: &'static str = "barrier_analyzer";

    pub fn new(generator: TextGenerator, params: BarrierStepParams) -> Self {
        Self { generator, params }
    }

    /// Run inventory, causality and classification, then render the diagram.
    pub async fn analyze(&self, brief: &Brief) -> Result<BarrierResult, LlmError> {
        let barriers: BarrierList = run_structured(
            &self.generator,
            "barriers",
            &StageRequest::new(
                BARRIER_SYSTEM_PROMPT,
                inventory_prompt(brief),
                self.params.inventory,
            ),
        )
        .await?;
        tracing::debug!(count = barriers.barriers.len(), "Barrier inventory complete");

        let causality: CausalityResult = run_structured(
            &self.generator,
            "causality",
            &StageRequest::new(
                CAUSALITY_SYSTEM_PROMPT,
                causality_prompt(&barriers),
                self.params.causality,
            ),
        )
        .await?;

        let classification: AbcClassification = run_structured(
            &self.generator,
            "classification",
            &StageRequest::new(
                CLASSIFY_SYSTEM_PROMPT,
                classification_prompt(&barriers, &causality),
                self.params.classification,
            ),
        )
        .await?;

        let mermaid_diagram = render_barrier_diagram(&barriers, &causality, &classification);

        Ok(BarrierResult {
            barriers,
            causality,
            classification,
            mermaid_diagram,
        })
    }
}

fn barrier_lines(barriers: &BarrierList) -> String {
    barriers
        .barriers
        .iter()
        .map(|b| format!("- ID {}: [{}] {}", b.id, b.category, b.barrier))
        .collect::<Vec<_>>()
        .join("\n")
}

/// User prompt for the barrier inventory step.
pub fn inventory_prompt(brief: &Brief) -> String {
    format!(
        "{}\n\nBased on the brief above, list 30 reasons why people do not use this product or service.",
        brief.render()
    )
}

/// User prompt for the causality step.
pub fn causality_prompt(barriers: &BarrierList) -> String {
    format!(
        "## Barriers\n\n{}\n\nMap around 50 causal relationships between these barriers and identify the key barriers with the most connections.",
        barrier_lines(barriers)
    )
}

/// User prompt for the classification step.
pub fn classification_prompt(barriers: &BarrierList, causality: &CausalityResult) -> String {
    let key_ids = causality
        .key_barriers
        .iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "## Barriers\n\n{}\n\n## Key barriers (most connected)\nID: {}\n\nClassify every barrier as A, B or C and propose a solution approach for each.",
        barrier_lines(barriers),
        key_ids
    )
}
