//! Result types produced by the strategy stages.
//!
//! Every type deserializes strictly from the JSON schema its stage asks the
//! LLM for, and implements [`FromStructured`] for best-effort construction
//! when the response does not match that schema. Fields that the stage
//! prompts leave free-form are kept as opaque [`StructuredMap`]s.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::utils::structured::{
    deserialize_string_list, deserialize_text, integer, integer_list, list_of, nested, object,
    object_list, string_list, text, FromStructured, StructuredMap,
};

// =============================================================================
// Barrier analysis
// =============================================================================

/// One reason people do not use the product.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BarrierItem {
    pub id: i64,
    pub barrier: String,
    /// Product, psychological, social or cultural factor.
    pub category: String,
}

impl FromStructured for BarrierItem {
    fn from_structured(map: &StructuredMap) -> Self {
        Self {
            id: integer(map, "id"),
            barrier: text(map, "barrier"),
            category: text(map, "category"),
        }
    }
}

/// Step 1 of barrier analysis: the barrier inventory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BarrierList {
    pub barriers: Vec<BarrierItem>,
}

impl FromStructured for BarrierList {
    fn from_structured(map: &StructuredMap) -> Self {
        Self {
            barriers: list_of(map, "barriers"),
        }
    }
}

impl BarrierList {
    pub fn find(&self, id: i64) -> Option<&BarrierItem> {
        self.barriers.iter().find(|b| b.id == id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CausalRelation {
    pub from_id: i64,
    pub to_id: i64,
    pub relation: String,
}

impl FromStructured for CausalRelation {
    fn from_structured(map: &StructuredMap) -> Self {
        Self {
            from_id: integer(map, "from_id"),
            to_id: integer(map, "to_id"),
            relation: text(map, "relation"),
        }
    }
}

/// Step 2 of barrier analysis: cause and effect between barriers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CausalityResult {
    pub relations: Vec<CausalRelation>,
    /// Ids of the most connected barriers.
    pub key_barriers: Vec<i64>,
}

impl FromStructured for CausalityResult {
    fn from_structured(map: &StructuredMap) -> Self {
        Self {
            relations: list_of(map, "relations"),
            key_barriers: integer_list(map, "key_barriers"),
        }
    }
}

/// Who can remove a barrier: the service itself, advertising and branding,
/// or PR and social change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AbcClass {
    #[default]
    A,
    B,
    C,
}

impl AbcClass {
    pub const ALL: [AbcClass; 3] = [AbcClass::A, AbcClass::B, AbcClass::C];

    pub fn as_str(&self) -> &'static str {
        match self {
            AbcClass::A => "A",
            AbcClass::B => "B",
            AbcClass::C => "C",
        }
    }

    /// Lenient parse: first character, case-insensitive.
    pub fn parse_lenient(raw: &str) -> Option<Self> {
        match raw.trim().chars().next()?.to_ascii_uppercase() {
            'A' => Some(AbcClass::A),
            'B' => Some(AbcClass::B),
            'C' => Some(AbcClass::C),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AbcItem {
    pub barrier_id: i64,
    pub barrier: String,
    pub classification: AbcClass,
    pub solution_approach: String,
}

impl AbcItem {
    /// Lenient construction for an item listed under `bucket`; the bucket
    /// wins when the item's own classification is missing or unreadable.
    pub fn from_structured_in(map: &StructuredMap, bucket: AbcClass) -> Self {
        Self {
            barrier_id: integer(map, "barrier_id"),
            barrier: text(map, "barrier"),
            classification: AbcClass::parse_lenient(&text(map, "classification"))
                .unwrap_or(bucket),
            solution_approach: text(map, "solution_approach"),
        }
    }
}

impl FromStructured for AbcItem {
    fn from_structured(map: &StructuredMap) -> Self {
        Self::from_structured_in(map, AbcClass::default())
    }
}

/// Step 3 of barrier analysis: A/B/C classification.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AbcClassification {
    pub a_items: Vec<AbcItem>,
    pub b_items: Vec<AbcItem>,
    pub c_items: Vec<AbcItem>,
}

impl AbcClassification {
    pub fn items(&self, class: AbcClass) -> &[AbcItem] {
        match class {
            AbcClass::A => &self.a_items,
            AbcClass::B => &self.b_items,
            AbcClass::C => &self.c_items,
        }
    }

    fn bucket_key(class: AbcClass) -> &'static str {
        match class {
            AbcClass::A => "a_items",
            AbcClass::B => "b_items",
            AbcClass::C => "c_items",
        }
    }
}

impl FromStructured for AbcClassification {
    fn from_structured(map: &StructuredMap) -> Self {
        let read = |class: AbcClass| -> Vec<AbcItem> {
            object_list(map, Self::bucket_key(class))
                .iter()
                .map(|item| AbcItem::from_structured_in(item, class))
                .collect()
        };
        Self {
            a_items: read(AbcClass::A),
            b_items: read(AbcClass::B),
            c_items: read(AbcClass::C),
        }
    }
}

/// Complete barrier analysis: inventory, causality, classification and the
/// rendered causal diagram.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BarrierResult {
    pub barriers: BarrierList,
    pub causality: CausalityResult,
    pub classification: AbcClassification,
    /// Mermaid flowchart source.
    pub mermaid_diagram: String,
}

impl BarrierResult {
    /// Barrier items whose ids are listed as key barriers, in key order.
    pub fn key_barrier_items(&self) -> Vec<&BarrierItem> {
        self.causality
            .key_barriers
            .iter()
            .filter_map(|id| self.barriers.find(*id))
            .collect()
    }
}

// =============================================================================
// WHO
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentPriority {
    Primary,
    #[default]
    Secondary,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TargetSegment {
    pub segment_name: String,
    pub description: String,
    #[serde(deserialize_with = "deserialize_text")]
    pub demographics: String,
    #[serde(deserialize_with = "deserialize_text")]
    pub psychographics: String,
    #[serde(deserialize_with = "deserialize_text")]
    pub behaviors: String,
    pub priority: SegmentPriority,
}

impl FromStructured for TargetSegment {
    fn from_structured(map: &StructuredMap) -> Self {
        let priority = if text(map, "priority").trim().eq_ignore_ascii_case("primary") {
            SegmentPriority::Primary
        } else {
            SegmentPriority::Secondary
        };
        Self {
            segment_name: text(map, "segment_name"),
            description: text(map, "description"),
            demographics: text(map, "demographics"),
            psychographics: text(map, "psychographics"),
            behaviors: text(map, "behaviors"),
            priority,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConsumerInsight {
    pub insight: String,
    /// The contradiction or conflict the consumer lives with.
    pub tension: String,
    /// Where the brand can step in.
    pub opportunity: String,
}

impl FromStructured for ConsumerInsight {
    fn from_structured(map: &StructuredMap) -> Self {
        Self {
            insight: text(map, "insight"),
            tension: text(map, "tension"),
            opportunity: text(map, "opportunity"),
        }
    }
}

/// Target audience analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WhoAnalysis {
    /// Free-form anatomy of the core target.
    pub core_target: StructuredMap,
    pub segments: Vec<TargetSegment>,
    pub insights: Vec<ConsumerInsight>,
    pub unmet_needs: Vec<String>,
}

impl FromStructured for WhoAnalysis {
    fn from_structured(map: &StructuredMap) -> Self {
        Self {
            core_target: object(map, "core_target"),
            segments: list_of(map, "segments"),
            insights: list_of(map, "insights"),
            unmet_needs: string_list(map, "unmet_needs"),
        }
    }
}

impl WhoAnalysis {
    /// The first primary segment, else the first segment.
    pub fn primary_segment(&self) -> Option<&TargetSegment> {
        self.segments
            .iter()
            .find(|s| s.priority == SegmentPriority::Primary)
            .or_else(|| self.segments.first())
    }
}

// =============================================================================
// WHAT
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketAnalysis {
    pub market_overview: String,
    pub competitive_landscape: String,
    pub positioning_opportunity: String,
}

impl FromStructured for MarketAnalysis {
    fn from_structured(map: &StructuredMap) -> Self {
        Self {
            market_overview: text(map, "market_overview"),
            competitive_landscape: text(map, "competitive_landscape"),
            positioning_opportunity: text(map, "positioning_opportunity"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BrandDiagnosis {
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub perception_gap: String,
}

impl FromStructured for BrandDiagnosis {
    fn from_structured(map: &StructuredMap) -> Self {
        Self {
            strengths: string_list(map, "strengths"),
            weaknesses: string_list(map, "weaknesses"),
            perception_gap: text(map, "perception_gap"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValueProposition {
    pub functional_value: String,
    pub emotional_value: String,
    pub social_value: String,
    pub core_proposition: String,
}

impl FromStructured for ValueProposition {
    fn from_structured(map: &StructuredMap) -> Self {
        Self {
            functional_value: text(map, "functional_value"),
            emotional_value: text(map, "emotional_value"),
            social_value: text(map, "social_value"),
            core_proposition: text(map, "core_proposition"),
        }
    }
}

/// Market, brand and value analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WhatAnalysis {
    pub market_analysis: MarketAnalysis,
    pub brand_diagnosis: BrandDiagnosis,
    /// Free-form strategy per barrier.
    pub barrier_strategies: Vec<StructuredMap>,
    pub value_proposition: ValueProposition,
    pub differentiation: Vec<String>,
}

impl FromStructured for WhatAnalysis {
    fn from_structured(map: &StructuredMap) -> Self {
        Self {
            market_analysis: nested(map, "market_analysis"),
            brand_diagnosis: nested(map, "brand_diagnosis"),
            barrier_strategies: object_list(map, "barrier_strategies"),
            value_proposition: nested(map, "value_proposition"),
            differentiation: string_list(map, "differentiation"),
        }
    }
}

// =============================================================================
// Alternative perspective (doubt / discover / design reframing)
// =============================================================================

/// A question that doubts an industry assumption.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DoubtQuestion {
    #[serde(default)]
    pub angle: String,
    pub question: String,
    /// The truth that appears once the assumption is broken.
    pub insight: String,
}

impl FromStructured for DoubtQuestion {
    fn from_structured(map: &StructuredMap) -> Self {
        Self {
            angle: text(map, "angle"),
            question: text(map, "question"),
            insight: text(map, "insight"),
        }
    }
}

impl DoubtQuestion {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self::from_structured(map)),
            Value::String(s) if !s.trim().is_empty() => Some(Self {
                question: s.clone(),
                ..Self::default()
            }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DoubtAnalysis {
    pub original_challenge: String,
    pub questions: Vec<DoubtQuestion>,
    #[serde(deserialize_with = "deserialize_string_list")]
    pub hidden_assumptions: Vec<String>,
    /// Predictable answers a competitor or generic model would give.
    #[serde(deserialize_with = "deserialize_string_list")]
    pub average_answers: Vec<String>,
}

impl FromStructured for DoubtAnalysis {
    fn from_structured(map: &StructuredMap) -> Self {
        let questions = match map.get("questions") {
            Some(Value::Array(items)) => items.iter().filter_map(DoubtQuestion::from_value).collect(),
            _ => Vec::new(),
        };
        Self {
            original_challenge: text(map, "original_challenge"),
            questions,
            hidden_assumptions: string_list(map, "hidden_assumptions"),
            average_answers: string_list(map, "average_answers"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiscoverAnalysis {
    pub business_challenge: String,
    /// The business challenge reframed as a human one.
    pub human_challenge: String,
    pub hidden_truth: String,
    pub possibility_to_unlock: String,
    /// Free-form `from` / `to` / `because` reframing steps.
    pub reframing_journey: StructuredMap,
}

impl FromStructured for DiscoverAnalysis {
    fn from_structured(map: &StructuredMap) -> Self {
        Self {
            business_challenge: text(map, "business_challenge"),
            human_challenge: text(map, "human_challenge"),
            hidden_truth: text(map, "hidden_truth"),
            possibility_to_unlock: text(map, "possibility_to_unlock"),
            reframing_journey: object(map, "reframing_journey"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DesignIdea {
    pub concept: String,
    pub enables: String,
    pub why_not_average: String,
    pub world_after: String,
}

impl FromStructured for DesignIdea {
    fn from_structured(map: &StructuredMap) -> Self {
        Self {
            concept: text(map, "concept"),
            enables: text(map, "enables"),
            why_not_average: text(map, "why_not_average"),
            world_after: text(map, "world_after"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DesignAnalysis {
    pub ideas: Vec<DesignIdea>,
    /// Zero-based index into `ideas`.
    pub recommended_idea: i64,
    pub recommendation_reason: String,
}

impl FromStructured for DesignAnalysis {
    fn from_structured(map: &StructuredMap) -> Self {
        Self {
            ideas: list_of(map, "ideas"),
            recommended_idea: integer(map, "recommended_idea"),
            recommendation_reason: text(map, "recommendation_reason"),
        }
    }
}

/// Independent reframing of the brief. Attached to the composite result and
/// consumed by no other stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlternativePerspective {
    pub doubt: DoubtAnalysis,
    pub discover: DiscoverAnalysis,
    pub design: DesignAnalysis,
}

impl FromStructured for AlternativePerspective {
    fn from_structured(map: &StructuredMap) -> Self {
        Self {
            doubt: nested(map, "doubt"),
            discover: nested(map, "discover"),
            design: nested(map, "design"),
        }
    }
}

// =============================================================================
// BIG IDEA
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BigIdea {
    pub idea: String,
    pub rationale: String,
    /// Free-form scores against the evaluation criteria.
    pub evaluation: StructuredMap,
    pub alternative_ideas: Vec<String>,
}

impl FromStructured for BigIdea {
    fn from_structured(map: &StructuredMap) -> Self {
        Self {
            idea: text(map, "idea"),
            rationale: text(map, "rationale"),
            evaluation: object(map, "evaluation"),
            alternative_ideas: string_list(map, "alternative_ideas"),
        }
    }
}

// =============================================================================
// Copywriting
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CopyVariation {
    pub headline: String,
    #[serde(default)]
    pub subhead: String,
    #[serde(default)]
    pub body: String,
    pub angle: String,
    pub technique: String,
    #[serde(default)]
    pub why_it_works: String,
}

impl FromStructured for CopyVariation {
    fn from_structured(map: &StructuredMap) -> Self {
        Self {
            headline: text(map, "headline"),
            subhead: text(map, "subhead"),
            body: text(map, "body"),
            angle: text(map, "angle"),
            technique: text(map, "technique"),
            why_it_works: text(map, "why_it_works"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CopyOutput {
    /// Free-form GOAL / WHO / VALUE / ANGLE / TONE brief.
    pub strategic_brief: StructuredMap,
    pub variations: Vec<CopyVariation>,
    /// Zero-based index into `variations`.
    pub recommended: i64,
    pub recommendation_reason: String,
}

impl FromStructured for CopyOutput {
    fn from_structured(map: &StructuredMap) -> Self {
        Self {
            strategic_brief: object(map, "strategic_brief"),
            variations: list_of(map, "variations"),
            recommended: integer(map, "recommended"),
            recommendation_reason: text(map, "recommendation_reason"),
        }
    }
}

// =============================================================================
// Ad planning
// =============================================================================

/// Out-of-home advertising copy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OohCopy {
    #[serde(rename = "copy")]
    pub text: String,
    #[serde(default)]
    pub rationale: String,
}

impl FromStructured for OohCopy {
    fn from_structured(map: &StructuredMap) -> Self {
        let copy = text(map, "copy");
        Self {
            text: if copy.is_empty() { text(map, "text") } else { copy },
            rationale: text(map, "rationale"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnsPost {
    pub format: String,
    pub content: String,
}

impl FromStructured for SnsPost {
    fn from_structured(map: &StructuredMap) -> Self {
        Self {
            format: text(map, "format"),
            content: text(map, "content"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdPlan {
    pub plan_name: String,
    /// Ideation method the plan was derived with.
    pub method: String,
    pub core_message: String,
    /// How the plan works and spreads.
    pub mechanism: String,
    pub ooh_copies: Vec<OohCopy>,
    pub sns_posts: Vec<SnsPost>,
    pub experiential_tactic: String,
    pub success_criteria: String,
    pub kpi_examples: Vec<String>,
}

impl FromStructured for AdPlan {
    fn from_structured(map: &StructuredMap) -> Self {
        Self {
            plan_name: text(map, "plan_name"),
            method: text(map, "method"),
            core_message: text(map, "core_message"),
            mechanism: text(map, "mechanism"),
            ooh_copies: list_of(map, "ooh_copies"),
            sns_posts: list_of(map, "sns_posts"),
            experiential_tactic: text(map, "experiential_tactic"),
            success_criteria: text(map, "success_criteria"),
            kpi_examples: string_list(map, "kpi_examples"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdPlanResult {
    pub brand_concept: String,
    pub concept_story: String,
    /// Free-form new ways of looking at the product.
    pub new_perspectives: Vec<StructuredMap>,
    pub plans: Vec<AdPlan>,
    /// Zero-based index into `plans`.
    pub recommended_plan: i64,
    pub recommendation_reason: String,
}

impl FromStructured for AdPlanResult {
    fn from_structured(map: &StructuredMap) -> Self {
        Self {
            brand_concept: text(map, "brand_concept"),
            concept_story: text(map, "concept_story"),
            new_perspectives: object_list(map, "new_perspectives"),
            plans: list_of(map, "plans"),
            recommended_plan: integer(map, "recommended_plan"),
            recommendation_reason: text(map, "recommendation_reason"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::structured::from_map_strict;
    use serde_json::json;

    fn map(value: Value) -> StructuredMap {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_empty_map_yields_defaults() {
        let empty = StructuredMap::new();
        assert_eq!(WhoAnalysis::from_structured(&empty), WhoAnalysis::default());
        assert_eq!(WhatAnalysis::from_structured(&empty), WhatAnalysis::default());
        assert_eq!(BigIdea::from_structured(&empty), BigIdea::default());
        assert_eq!(CopyOutput::from_structured(&empty), CopyOutput::default());
        assert_eq!(AdPlanResult::from_structured(&empty), AdPlanResult::default());
        assert_eq!(
            AlternativePerspective::from_structured(&empty),
            AlternativePerspective::default()
        );
    }

    #[test]
    fn test_strict_rejects_missing_fields() {
        let partial = map(json!({"idea": "Make mornings lighter"}));
        assert!(from_map_strict::<BigIdea>(&partial).is_err());

        let lenient = BigIdea::from_structured(&partial);
        assert_eq!(lenient.idea, "Make mornings lighter");
        assert!(lenient.evaluation.is_empty());
    }

    #[test]
    fn test_segment_coercion_in_strict_mode() {
        let segment: TargetSegment = from_map_strict(&map(json!({
            "segment_name": "Busy parents",
            "description": "Dual-income households",
            "demographics": {"age": "30-45", "income": "upper-middle"},
            "psychographics": ["time-starved", "health-aware"],
            "behaviors": "Shops online weekly",
            "priority": "primary"
        })))
        .unwrap();

        assert_eq!(segment.demographics, "age: 30-45, income: upper-middle");
        assert_eq!(segment.psychographics, "time-starved, health-aware");
        assert_eq!(segment.priority, SegmentPriority::Primary);
    }

    #[test]
    fn test_primary_segment_fallback() {
        let who = WhoAnalysis {
            segments: vec![
                TargetSegment {
                    segment_name: "first".to_string(),
                    ..Default::default()
                },
                TargetSegment {
                    segment_name: "main".to_string(),
                    priority: SegmentPriority::Primary,
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        assert_eq!(who.primary_segment().unwrap().segment_name, "main");

        let who = WhoAnalysis {
            segments: vec![TargetSegment {
                segment_name: "only".to_string(),
                ..Default::default()
            }],
            ..Default::default()
        };
        assert_eq!(who.primary_segment().unwrap().segment_name, "only");
        assert!(WhoAnalysis::default().primary_segment().is_none());
    }

    #[test]
    fn test_abc_items_take_bucket_class() {
        let classification = AbcClassification::from_structured(&map(json!({
            "a_items": [{"barrier_id": 1, "barrier": "Too pricey", "solution_approach": "Trial size"}],
            "b_items": [{"barrier_id": "2", "barrier": "Looks dated", "classification": "b"}],
            "c_items": "not a list"
        })));

        assert_eq!(classification.a_items[0].classification, AbcClass::A);
        assert_eq!(classification.b_items[0].barrier_id, 2);
        assert_eq!(classification.b_items[0].classification, AbcClass::B);
        assert!(classification.c_items.is_empty());
    }

    #[test]
    fn test_doubt_questions_accept_strings() {
        let doubt = DoubtAnalysis::from_structured(&map(json!({
            "original_challenge": "Sell more",
            "questions": ["Why must it be a drink?", {"angle": "usage", "question": "Why only at breakfast?", "insight": "Snacking"}, 3],
            "hidden_assumptions": "People want convenience",
            "average_answers": ["Discount campaign"]
        })));

        assert_eq!(doubt.questions.len(), 2);
        assert_eq!(doubt.questions[0].question, "Why must it be a drink?");
        assert_eq!(doubt.questions[1].angle, "usage");
        assert_eq!(doubt.hidden_assumptions, vec!["People want convenience"]);
    }

    #[test]
    fn test_ooh_copy_uses_copy_key() {
        let copy: OohCopy = from_map_strict(&map(json!({"copy": "Stop. Breathe."}))).unwrap();
        assert_eq!(copy.text, "Stop. Breathe.");
        assert_eq!(copy.rationale, "");

        let serialized = serde_json::to_value(&copy).unwrap();
        assert_eq!(serialized["copy"], "Stop. Breathe.");
    }

    #[test]
    fn test_key_barrier_items() {
        let result = BarrierResult {
            barriers: BarrierList {
                barriers: vec![
                    BarrierItem {
                        id: 1,
                        barrier: "Price".to_string(),
                        category: "product".to_string(),
                    },
                    BarrierItem {
                        id: 2,
                        barrier: "Habit".to_string(),
                        category: "culture".to_string(),
                    },
                ],
            },
            causality: CausalityResult {
                relations: vec![],
                key_barriers: vec![2, 99],
            },
            ..Default::default()
        };

        let keys = result.key_barrier_items();
        assert_eq!(keys.len(), 1);
        assert_eq!(keys[0].barrier, "Habit");
    }
}
