//! Strategy pipeline orchestrator.
//!
//! Runs the stages of [`SCHEDULE`](super::graph::SCHEDULE) inside one task:
//!
//! - group 0: barrier analysis and the alternative perspective, concurrently
//! - group 1: WHO and WHAT, once barrier analysis completes
//! - group 2: BIG IDEA, once WHO and WHAT complete
//! - group 3: copy and ad plan, once BIG IDEA completes
//!
//! The alternative perspective runs beside the main chain and is only
//! awaited before the composite result is assembled. Joins are
//! all-or-nothing: the first transport fault drops every in-flight stage and
//! ends the run.

use std::future::Future;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

use crate::agents::{
    AdPlanResult, AdPlanner, AlternativePerspective, BarrierAnalyzer, BarrierResult,
    BarrierStepParams, BigIdea, BigIdeaGenerator, CopyOutput, Copywriter, ReframingAnalyzer,
    WhatAnalysis, WhatAnalyzer, WhoAnalysis, WhoAnalyzer,
};
use crate::brief::Brief;
use crate::error::LlmError;
use crate::llm::TextGenerator;

use super::config::PipelineConfig;
use super::events::{EventSink, ProgressEvent};
use super::graph::{StageId, SCHEDULE};

/// Errors that end a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A stage hit a transport fault.
    #[error("Stage '{stage}' failed: {source}")]
    Stage {
        stage: StageId,
        #[source]
        source: LlmError,
    },

    /// The run was cancelled before it finished.
    #[error("Pipeline cancelled")]
    Cancelled,
}

impl PipelineError {
    /// The failing stage, if a stage failed.
    pub fn stage(&self) -> Option<StageId> {
        match self {
            PipelineError::Stage { stage, .. } => Some(*stage),
            PipelineError::Cancelled => None,
        }
    }
}

/// The brief and every stage result of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositeResult {
    pub brief: Brief,
    pub alternative_perspective: AlternativePerspective,
    pub barrier_analysis: BarrierResult,
    pub who: WhoAnalysis,
    pub what: WhatAnalysis,
    pub big_idea: BigIdea,
    pub copy: CopyOutput,
    pub ad_plan: AdPlanResult,
}

/// Coordinates the strategy stages for a brief.
///
/// Cheap to clone: every agent shares the same provider handle.
#[derive(Debug, Clone)]
pub struct StrategyOrchestrator {
    barriers: BarrierAnalyzer,
    who: WhoAnalyzer,
    what: WhatAnalyzer,
    big_idea: BigIdeaGenerator,
    copywriter: Copywriter,
    ad_planner: AdPlanner,
    reframing: ReframingAnalyzer,
    config: PipelineConfig,
}

impl StrategyOrchestrator {
    /// Build the stage agents over one generator.
    pub fn new(generator: TextGenerator, config: PipelineConfig) -> Self {
        let params = config.effective_stage_params();
        Self {
            barriers: BarrierAnalyzer::new(
                generator.clone(),
                BarrierStepParams {
                    inventory: params.barriers,
                    causality: params.causality,
                    classification: params.classification,
                },
            ),
            who: WhoAnalyzer::new(generator.clone(), params.who),
            what: WhatAnalyzer::new(generator.clone(), params.what),
            big_idea: BigIdeaGenerator::new(generator.clone(), params.big_idea),
            copywriter: Copywriter::new(generator.clone(), params.copy),
            ad_planner: AdPlanner::new(generator.clone(), params.ad_plan),
            reframing: ReframingAnalyzer::new(generator, params.alternative),
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    // =========================================================================
    // Individual stages
    // =========================================================================

    pub async fn analyze_barriers(&self, brief: &Brief) -> Result<BarrierResult, LlmError> {
        self.barriers.analyze(brief).await
    }

    /// WHO analysis; runs without barrier input when `barriers` is `None`.
    pub async fn analyze_who(
        &self,
        brief: &Brief,
        barriers: Option<&BarrierResult>,
    ) -> Result<WhoAnalysis, LlmError> {
        self.who.analyze(brief, barriers).await
    }

    /// WHAT analysis; runs without barrier input when `barriers` is `None`.
    pub async fn analyze_what(
        &self,
        brief: &Brief,
        barriers: Option<&BarrierResult>,
    ) -> Result<WhatAnalysis, LlmError> {
        self.what.analyze(brief, barriers).await
    }

    pub async fn generate_big_idea(
        &self,
        who: &WhoAnalysis,
        what: &WhatAnalysis,
    ) -> Result<BigIdea, LlmError> {
        self.big_idea.generate(who, what).await
    }

    pub async fn generate_copy(
        &self,
        big_idea: &BigIdea,
        who: &WhoAnalysis,
        what: &WhatAnalysis,
    ) -> Result<CopyOutput, LlmError> {
        self.copywriter.write(big_idea, who, what).await
    }

    pub async fn generate_ad_plan(
        &self,
        brief: &Brief,
        who: &WhoAnalysis,
        what: &WhatAnalysis,
        big_idea: &BigIdea,
    ) -> Result<AdPlanResult, LlmError> {
        self.ad_planner.generate(brief, who, what, big_idea).await
    }

    pub async fn analyze_alternative_perspective(
        &self,
        brief: &Brief,
    ) -> Result<AlternativePerspective, LlmError> {
        self.reframing.analyze(brief).await
    }

    // =========================================================================
    // Full runs
    // =========================================================================

    /// Run every stage and assemble the composite result.
    ///
    /// # Errors
    ///
    /// [`PipelineError::Stage`] on the first transport fault.
    pub async fn run_all(&self, brief: &Brief) -> Result<CompositeResult, PipelineError> {
        self.run_all_with_cancellation(brief, &CancellationToken::new())
            .await
    }

    /// Like [`run_all`](Self::run_all), stopping with
    /// [`PipelineError::Cancelled`] once `token` is cancelled.
    pub async fn run_all_with_cancellation(
        &self,
        brief: &Brief,
        token: &CancellationToken,
    ) -> Result<CompositeResult, PipelineError> {
        self.execute(brief, None, token).await
    }

    /// Shared by blocking and streaming runs. With a sink, emits the
    /// pipeline `running` event, `running` before each group and `complete`
    /// or `error` after each stage. The terminal event is left to the caller.
    pub(crate) async fn execute(
        &self,
        brief: &Brief,
        sink: Option<&EventSink>,
        token: &CancellationToken,
    ) -> Result<CompositeResult, PipelineError> {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("pipeline", run_id = %run_id);
        let started = Instant::now();

        let run = async {
            tracing::info!(product = %brief.product_name, "Pipeline started");
            if let Some(sink) = sink {
                sink.emit(ProgressEvent::pipeline_started(&run_id.to_string()))
                    .await;
            }
            announce(sink, SCHEDULE[0]).await;

            let alternative = track(
                sink,
                StageId::AlternativePerspective,
                self.analyze_alternative_perspective(brief),
            );

            let main_chain = async {
                let barriers =
                    track(sink, StageId::BarrierAnalysis, self.analyze_barriers(brief)).await?;

                announce(sink, SCHEDULE[1]).await;
                let (who, what) = tokio::try_join!(
                    track(sink, StageId::Who, self.analyze_who(brief, Some(&barriers))),
                    track(sink, StageId::What, self.analyze_what(brief, Some(&barriers))),
                )?;

                announce(sink, SCHEDULE[2]).await;
                let big_idea =
                    track(sink, StageId::BigIdea, self.generate_big_idea(&who, &what)).await?;

                announce(sink, SCHEDULE[3]).await;
                let (copy, ad_plan) = tokio::try_join!(
                    track(sink, StageId::Copy, self.generate_copy(&big_idea, &who, &what)),
                    track(
                        sink,
                        StageId::AdPlan,
                        self.generate_ad_plan(brief, &who, &what, &big_idea)
                    ),
                )?;

                Ok::<_, PipelineError>((barriers, who, what, big_idea, copy, ad_plan))
            };

            let (alternative_perspective, (barrier_analysis, who, what, big_idea, copy, ad_plan)) =
                tokio::try_join!(alternative, main_chain)?;

            Ok::<_, PipelineError>(CompositeResult {
                brief: brief.clone(),
                alternative_perspective,
                barrier_analysis,
                who,
                what,
                big_idea,
                copy,
                ad_plan,
            })
        };

        let result = async {
            tokio::select! {
                biased;
                _ = token.cancelled() => Err(PipelineError::Cancelled),
                result = run => result,
            }
        }
        .instrument(span.clone())
        .await;

        let elapsed_ms = started.elapsed().as_millis() as u64;
        span.in_scope(|| match &result {
            Ok(_) => tracing::info!(elapsed_ms, "Pipeline complete"),
            Err(PipelineError::Cancelled) => tracing::warn!(elapsed_ms, "Pipeline cancelled"),
            Err(e) => tracing::error!(elapsed_ms, error = %e, "Pipeline failed"),
        });
        result
    }
}

/// Emit a `running` event for each member of a group.
async fn announce(sink: Option<&EventSink>, group: &[StageId]) {
    if let Some(sink) = sink {
        for stage in group {
            sink.emit(ProgressEvent::running(*stage)).await;
        }
    }
}

/// Await one stage, then log and emit its outcome.
async fn track<T, F>(sink: Option<&EventSink>, stage: StageId, future: F) -> Result<T, PipelineError>
where
    T: Serialize,
    F: Future<Output = Result<T, LlmError>>,
{
    let started = Instant::now();
    tracing::debug!(stage = %stage, "Stage started");

    match future.await {
        Ok(result) => {
            tracing::info!(
                stage = %stage,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Stage complete"
            );
            if let Some(sink) = sink {
                sink.emit(ProgressEvent::complete(stage, serde_json::to_value(&result).ok()))
                    .await;
            }
            Ok(result)
        }
        Err(source) => {
            tracing::error!(stage = %stage, error = %source, "Stage failed");
            if let Some(sink) = sink {
                sink.emit(ProgressEvent::error(stage, source.to_string())).await;
            }
            Err(PipelineError::Stage { stage, source })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{GenerationRequest, GenerationResponse, LlmProvider};
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    /// Replies with an empty object and records each system prompt.
    #[derive(Default)]
    struct RecordingProvider {
        systems: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl LlmProvider for RecordingProvider {
        async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse, LlmError> {
            self.systems
                .lock()
                .unwrap()
                .push(request.system_text().to_string());
            Ok(GenerationResponse::single("mock", "{}"))
        }
    }

    #[tokio::test]
    async fn test_run_all_with_empty_replies_yields_defaults() {
        let provider = Arc::new(RecordingProvider::default());
        let orchestrator =
            StrategyOrchestrator::new(TextGenerator::new(provider.clone(), "mock"), PipelineConfig::default());

        let result = orchestrator.run_all(&Brief::new("Tea")).await.unwrap();
        assert_eq!(result.brief.product_name, "Tea");
        assert_eq!(result.who, WhoAnalysis::default());
        assert_eq!(result.ad_plan, AdPlanResult::default());
        assert!(result.barrier_analysis.mermaid_diagram.starts_with("flowchart TB"));

        // three barrier steps plus six single-call stages
        assert_eq!(provider.systems.lock().unwrap().len(), 9);
    }

    #[tokio::test]
    async fn test_cancelled_token_stops_run() {
        let orchestrator = StrategyOrchestrator::new(
            TextGenerator::new(Arc::new(RecordingProvider::default()), "mock"),
            PipelineConfig::default(),
        );
        let token = CancellationToken::new();
        token.cancel();

        let result = orchestrator
            .run_all_with_cancellation(&Brief::new("Tea"), &token)
            .await;
        assert!(matches!(result, Err(PipelineError::Cancelled)));
    }

    #[test]
    fn test_composite_result_field_names() {
        let composite = CompositeResult {
            brief: Brief::new("Tea"),
            alternative_perspective: AlternativePerspective::default(),
            barrier_analysis: BarrierResult::default(),
            who: WhoAnalysis::default(),
            what: WhatAnalysis::default(),
            big_idea: BigIdea::default(),
            copy: CopyOutput::default(),
            ad_plan: AdPlanResult::default(),
        };
        let value = serde_json::to_value(&composite).unwrap();
        let mut keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            vec!["adPlan", "alternativePerspective", "barrierAnalysis", "bigIdea", "brief", "copy", "what", "who"]
        );
    }

    #[test]
    fn test_pipeline_error_display() {
        let err = PipelineError::Stage {
            stage: StageId::Who,
            source: LlmError::RateLimited("slow down".to_string()),
        };
        assert_eq!(err.stage(), Some(StageId::Who));
        assert!(err.to_string().starts_with("Stage 'who' failed"));
    }
}
