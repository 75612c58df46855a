//! strategy-brain: LLM-driven marketing strategy pipeline.
//!
//! This library runs a fixed graph of LLM stages over a product brief
//! (barrier analysis, WHO/WHAT analysis, BIG IDEA, copy, ad plans and an
//! independent alternative perspective) and recovers structured results
//! from free-form model output.

// Core modules
pub mod agents;
pub mod brief;
pub mod cli;
pub mod error;
pub mod llm;
pub mod pipeline;
pub mod utils;

// Re-export commonly used types
pub use brief::Brief;
pub use error::{BriefError, LlmError, StructuredGenerationError};
pub use pipeline::{
    CompositeResult, PipelineConfig, PipelineError, ProgressEvent, ProgressStream,
    StrategyOrchestrator,
};
pub use utils::json_extraction::{extract_structured, JsonExtractionError};
