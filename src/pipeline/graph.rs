//! The fixed stage dependency graph.
//!
//! ```text
//! BarrierAnalysis ──┬──> Who ──┬──> BigIdea ──┬──> Copy
//!                   └──> What ─┘              └──> AdPlan
//!
//! AlternativePerspective   (no edges; attached to the composite only)
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifies one pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StageId {
    BarrierAnalysis,
    AlternativePerspective,
    Who,
    What,
    BigIdea,
    Copy,
    AdPlan,
}

impl StageId {
    /// All stages in schedule order.
    pub const ALL: [StageId; 7] = [
        StageId::BarrierAnalysis,
        StageId::AlternativePerspective,
        StageId::Who,
        StageId::What,
        StageId::BigIdea,
        StageId::Copy,
        StageId::AdPlan,
    ];

    /// Wire name, as used in progress events and the composite result.
    pub fn as_str(&self) -> &'static str {
        match self {
            StageId::BarrierAnalysis => "barrierAnalysis",
            StageId::AlternativePerspective => "alternativePerspective",
            StageId::Who => "who",
            StageId::What => "what",
            StageId::BigIdea => "bigIdea",
            StageId::Copy => "copy",
            StageId::AdPlan => "adPlan",
        }
    }

    /// Stages whose results this stage consumes.
    pub fn dependencies(&self) -> &'static [StageId] {
        match self {
            StageId::BarrierAnalysis | StageId::AlternativePerspective => &[],
            StageId::Who | StageId::What => &[StageId::BarrierAnalysis],
            StageId::BigIdea => &[StageId::Who, StageId::What],
            StageId::Copy | StageId::AdPlan => &[StageId::BigIdea],
        }
    }

    /// Index of the schedule group this stage belongs to.
    pub fn group(&self) -> usize {
        SCHEDULE
            .iter()
            .position(|group| group.contains(self))
            .unwrap_or(SCHEDULE.len())
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for StageId {
    type Err = String;

    /// Accepts the wire name as well as snake_case and kebab-case spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .flat_map(char::to_lowercase)
            .collect();
        match normalized.as_str() {
            "barrieranalysis" | "barriers" => Ok(StageId::BarrierAnalysis),
            "alternativeperspective" | "alternative" => Ok(StageId::AlternativePerspective),
            "who" => Ok(StageId::Who),
            "what" => Ok(StageId::What),
            "bigidea" => Ok(StageId::BigIdea),
            "copy" => Ok(StageId::Copy),
            "adplan" => Ok(StageId::AdPlan),
            _ => Err(format!(
                "unknown stage '{}', expected one of: {}",
                s,
                StageId::ALL
                    .iter()
                    .map(StageId::as_str)
                    .collect::<Vec<_>>()
                    .join(", ")
            )),
        }
    }
}

/// Static execution schedule. A group starts once the dependencies of its
/// members are complete; members of a group run concurrently.
///
/// Group 1 waits on barrier analysis only, never on the alternative
/// perspective that shares group 0 with it.
pub const SCHEDULE: [&[StageId]; 4] = [
    &[StageId::BarrierAnalysis, StageId::AlternativePerspective],
    &[StageId::Who, StageId::What],
    &[StageId::BigIdea],
    &[StageId::Copy, StageId::AdPlan],
];

/// Order the stages so that every stage follows its dependencies.
///
/// Returns `None` if the graph has a cycle.
pub fn topological_order() -> Option<Vec<StageId>> {
    let mut order: Vec<StageId> = Vec::with_capacity(StageId::ALL.len());
    while order.len() < StageId::ALL.len() {
        let next = StageId::ALL.iter().copied().find(|stage| {
            !order.contains(stage) && stage.dependencies().iter().all(|dep| order.contains(dep))
        })?;
        order.push(next);
    }
    Some(order)
}

/// Whether `sequence` lists each stage at most once and only after all of
/// its dependencies.
pub fn is_valid_linearization(sequence: &[StageId]) -> bool {
    sequence.iter().enumerate().all(|(i, stage)| {
        !sequence[..i].contains(stage)
            && stage
                .dependencies()
                .iter()
                .all(|dep| sequence[..i].contains(dep))
    })
}
