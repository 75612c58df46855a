//! Progress events emitted by streaming runs.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::graph::StageId;

/// Wire name of the whole-run pseudo stage.
pub const PIPELINE_STAGE: &str = "pipeline";

/// What an event is about: one stage, or the run as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventStage {
    Pipeline,
    Stage(StageId),
}

impl EventStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStage::Pipeline => PIPELINE_STAGE,
            EventStage::Stage(stage) => stage.as_str(),
        }
    }
}

impl fmt::Display for EventStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<StageId> for EventStage {
    fn from(stage: StageId) -> Self {
        EventStage::Stage(stage)
    }
}

impl Serialize for EventStage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EventStage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        if name == PIPELINE_STAGE {
            return Ok(EventStage::Pipeline);
        }
        StageId::ALL
            .iter()
            .find(|stage| stage.as_str() == name)
            .map(|stage| EventStage::Stage(*stage))
            .ok_or_else(|| serde::de::Error::custom(format!("unknown stage '{}'", name)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressStatus {
    Running,
    Complete,
    Error,
}

/// One progress notification.
///
/// `complete` events carry the serialized stage result in `data`; the
/// terminal pipeline event carries the whole composite result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub stage: EventStage,
    pub status: ProgressStatus,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    pub timestamp: DateTime<Utc>,
}

impl ProgressEvent {
    fn new(stage: EventStage, status: ProgressStatus, message: String, data: Option<Value>) -> Self {
        Self {
            stage,
            status,
            message,
            data,
            timestamp: Utc::now(),
        }
    }

    /// A stage is about to start.
    pub fn running(stage: StageId) -> Self {
        Self::new(
            stage.into(),
            ProgressStatus::Running,
            format!("Running {}", stage),
            None,
        )
    }

    /// A stage finished with a result.
    pub fn complete(stage: StageId, data: Option<Value>) -> Self {
        Self::new(
            stage.into(),
            ProgressStatus::Complete,
            format!("{} complete", stage),
            data,
        )
    }

    /// A stage failed; no `complete` event follows for it.
    pub fn error(stage: StageId, message: impl Into<String>) -> Self {
        Self::new(stage.into(), ProgressStatus::Error, message.into(), None)
    }

    pub fn pipeline_started(run_id: &str) -> Self {
        Self::new(
            EventStage::Pipeline,
            ProgressStatus::Running,
            format!("Pipeline {} started", run_id),
            None,
        )
    }

    /// Terminal event of a successful run.
    pub fn pipeline_complete(composite: Option<Value>) -> Self {
        Self::new(
            EventStage::Pipeline,
            ProgressStatus::Complete,
            "Pipeline complete".to_string(),
            composite,
        )
    }

    pub fn pipeline_error(message: impl Into<String>) -> Self {
        Self::new(EventStage::Pipeline, ProgressStatus::Error, message.into(), None)
    }

    pub fn is_terminal(&self) -> bool {
        self.stage == EventStage::Pipeline && self.status != ProgressStatus::Running
    }
}

/// Sending half of a progress channel.
///
/// A failed send means the consumer went away, so it cancels the run.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: mpsc::Sender<ProgressEvent>,
    token: CancellationToken,
}

impl EventSink {
    pub fn new(tx: mpsc::Sender<ProgressEvent>, token: CancellationToken) -> Self {
        Self { tx, token }
    }

    /// Send an event, waiting for channel capacity.
    pub async fn emit(&self, event: ProgressEvent) {
        if self.tx.send(event).await.is_err() {
            tracing::debug!("Progress consumer closed, cancelling run");
            self.token.cancel();
        }
    }

    /// Send an event only if the channel has room right now.
    pub fn try_emit(&self, event: ProgressEvent) {
        if let Err(e) = self.tx.try_send(event) {
            tracing::debug!(error = %e, "Dropped progress event");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_serialization() {
        let event = ProgressEvent::complete(StageId::BigIdea, Some(json!({"idea": "x"})));
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["stage"], "bigIdea");
        assert_eq!(value["status"], "complete");
        assert_eq!(value["data"]["idea"], "x");

        let running = serde_json::to_value(ProgressEvent::running(StageId::Who)).unwrap();
        assert!(running.get("data").is_none());
    }

    #[test]
    fn test_event_stage_roundtrip() {
        let event = ProgressEvent::pipeline_complete(None);
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"stage\":\"pipeline\""));
        let parsed: ProgressEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.stage, EventStage::Pipeline);
        assert!(parsed.is_terminal());

        assert!(serde_json::from_str::<EventStage>("\"summary\"").is_err());
    }

    #[tokio::test]
    async fn test_sink_cancels_when_consumer_gone() {
        let (tx, rx) = mpsc::channel(1);
        let token = CancellationToken::new();
        let sink = EventSink::new(tx, token.clone());
        drop(rx);

        sink.emit(ProgressEvent::running(StageId::Who)).await;
        assert!(token.is_cancelled());
    }
}
