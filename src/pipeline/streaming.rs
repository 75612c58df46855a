//! Streaming runs: the same schedule, reported as progress events.
//!
//! The producer task owns the only sender, so the stream ends exactly once:
//! after the terminal `pipeline` event on success, or right after the
//! failing stage's `error` event on a transport fault. Dropping the
//! [`ProgressStream`] cancels the producer.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::{Stream, StreamExt};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::brief::Brief;

use super::events::{EventSink, ProgressEvent};
use super::orchestrator::{PipelineError, StrategyOrchestrator};

/// Progress events of one run. Finite and not restartable.
#[derive(Debug)]
pub struct ProgressStream {
    inner: ReceiverStream<ProgressEvent>,
    token: CancellationToken,
    _guard: DropGuard,
}

impl ProgressStream {
    /// Next event, or `None` once the run has ended.
    pub async fn recv(&mut self) -> Option<ProgressEvent> {
        self.inner.next().await
    }

    /// Stop the run. Events already queued are still delivered.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Stream for ProgressStream {
    type Item = ProgressEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

impl StrategyOrchestrator {
    /// Start a run in the background and return its progress events.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn run_streaming(&self, brief: &Brief) -> ProgressStream {
        let (tx, rx) = mpsc::channel(self.config().event_buffer.max(1));
        let token = CancellationToken::new();

        let orchestrator = self.clone();
        let brief = brief.clone();
        let sink = EventSink::new(tx, token.clone());
        let task_token = token.clone();

        tokio::spawn(async move {
            match orchestrator.execute(&brief, Some(&sink), &task_token).await {
                Ok(composite) => {
                    let data = serde_json::to_value(&composite).ok();
                    sink.emit(ProgressEvent::pipeline_complete(data)).await;
                }
                Err(PipelineError::Cancelled) => {
                    sink.try_emit(ProgressEvent::pipeline_error("Pipeline cancelled"));
                }
                // the failing stage already emitted its error event
                Err(_) => {}
            }
        });

        ProgressStream {
            inner: ReceiverStream::new(rx),
            token: token.clone(),
            _guard: token.drop_guard(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LlmError;
    use crate::llm::{GenerationRequest, GenerationResponse, LlmProvider, TextGenerator};
    use crate::pipeline::config::PipelineConfig;
    use crate::pipeline::events::{EventStage, ProgressStatus};
    use crate::pipeline::graph::StageId;
    use async_trait::async_trait;
    use std::sync::Arc;

    struct EmptyObjectProvider;

    #[async_trait]
    impl LlmProvider for EmptyObjectProvider {
        async fn generate(&self, _: GenerationRequest) -> Result<GenerationResponse, LlmError> {
            Ok(GenerationResponse::single("mock", "{}"))
        }
    }

    fn orchestrator() -> StrategyOrchestrator {
        StrategyOrchestrator::new(
            TextGenerator::new(Arc::new(EmptyObjectProvider), "mock"),
            PipelineConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_stream_ends_with_composite() {
        let events: Vec<ProgressEvent> = orchestrator()
            .run_streaming(&Brief::new("Tea"))
            .collect()
            .await;

        let first = events.first().unwrap();
        assert_eq!(first.stage, EventStage::Pipeline);
        assert_eq!(first.status, ProgressStatus::Running);

        let last = events.last().unwrap();
        assert!(last.is_terminal());
        assert_eq!(last.status, ProgressStatus::Complete);
        assert_eq!(last.data.as_ref().unwrap()["brief"]["productName"], "Tea");

        for stage in StageId::ALL {
            let statuses: Vec<ProgressStatus> = events
                .iter()
                .filter(|e| e.stage == EventStage::Stage(stage))
                .map(|e| e.status)
                .collect();
            assert_eq!(statuses, vec![ProgressStatus::Running, ProgressStatus::Complete], "{}", stage);
        }
    }

    #[tokio::test]
    async fn test_cancel_ends_stream_without_composite() {
        let mut stream = orchestrator().run_streaming(&Brief::new("Tea"));
        stream.cancel();

        let mut events = Vec::new();
        while let Some(event) = stream.recv().await {
            events.push(event);
        }
        assert!(stream.is_cancelled());
        assert!(!events
            .iter()
            .any(|e| e.is_terminal() && e.status == ProgressStatus::Complete));
    }
}
