//! Strategy stage agents.
//!
//! Each agent owns one system prompt and turns its upstream results into a
//! typed stage result through a single [`TextGenerator`](crate::llm::TextGenerator)
//! call (barrier analysis makes three).

pub mod ad_planner;
pub mod barrier_analyzer;
pub mod big_idea;
pub mod copywriter;
pub mod mermaid;
pub mod reframing;
pub mod types;
pub mod what_analyzer;
pub mod who_analyzer;

pub use ad_planner::AdPlanner;
pub use barrier_analyzer::{BarrierAnalyzer, BarrierStepParams};
pub use big_idea::BigIdeaGenerator;
pub use copywriter::Copywriter;
pub use mermaid::render_barrier_diagram;
pub use reframing::ReframingAnalyzer;
pub use types::{
    AbcClass, AbcClassification, AbcItem, AdPlan, AdPlanResult, AlternativePerspective,
    BarrierItem, BarrierList, BarrierResult, BigIdea, BrandDiagnosis, CausalRelation,
    CausalityResult, ConsumerInsight, CopyOutput, CopyVariation, DesignAnalysis, DesignIdea,
    DiscoverAnalysis, DoubtAnalysis, DoubtQuestion, MarketAnalysis, OohCopy, SegmentPriority,
    SnsPost, TargetSegment, ValueProposition, WhatAnalysis, WhoAnalysis,
};
pub use what_analyzer::WhatAnalyzer;
pub use who_analyzer::WhoAnalyzer;
