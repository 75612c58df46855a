//! Strategy pipeline: the stage graph, its orchestrator and progress
//! streaming.
//!
//! # Pipeline Flow
//!
//! 1. **Barrier analysis** and the **alternative perspective** start together
//! 2. **WHO** and **WHAT** start once barrier analysis completes
//! 3. **BIG IDEA** starts once WHO and WHAT complete
//! 4. **Copy** and **ad plan** start once BIG IDEA completes
//! 5. The composite result is assembled after every stage, the alternative
//!    perspective included, has completed
//!
//! # Example
//!
//! ```rust,ignore
//! use strategy_brain::brief::Brief;
//! use strategy_brain::llm::{ProviderConfig, TextGenerator};
//! use strategy_brain::pipeline::{PipelineConfig, StrategyOrchestrator};
//!
//! let providers = ProviderConfig::from_env()?;
//! let generator = TextGenerator::new(providers.build_provider()?, providers.model());
//! let orchestrator = StrategyOrchestrator::new(generator, PipelineConfig::from_env()?);
//!
//! let result = orchestrator.run_all(&Brief::new("Oat milk")).await?;
//! println!("BIG IDEA: {}", result.big_idea.idea);
//!
//! let mut stream = orchestrator.run_streaming(&Brief::new("Oat milk"));
//! while let Some(event) = stream.recv().await {
//!     println!("{} {:?}", event.stage, event.status);
//! }
//! ```

pub mod config;
pub mod events;
pub mod graph;
pub mod orchestrator;
pub mod stage;
pub mod streaming;

// Re-export main types for convenience
pub use config::{ConfigError, PipelineConfig, StageParams};
pub use events::{EventSink, EventStage, ProgressEvent, ProgressStatus};
pub use graph::{StageId, SCHEDULE};
pub use orchestrator::{CompositeResult, PipelineError, StrategyOrchestrator};
pub use stage::{run_structured, StageRequest};
pub use streaming::ProgressStream;
