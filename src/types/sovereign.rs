//! Loop run record and forensic trace

use serde::{Deserialize, Serialize};

use crate::types::axis::AxisName;
use crate::types::reason::ReasonCode;
use crate::types::sscore::SScoreResult;

/// Terminal state of a loop run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoopOutcome {
    Sealed,
    Exhausted,
    ExecutionFailed,
}

impl std::fmt::Display for LoopOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sealed => write!(f, "SEALED"),
            Self::Exhausted => write!(f, "EXHAUSTED"),
            Self::ExecutionFailed => write!(f, "EXECUTION_FAILED"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PassDecision {
    Accept,
    Rollback,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisDelta {
    pub axis: AxisName,
    pub delta: f64,
}

/// Recorded for every rolled-back pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollbackEntry {
    pub pass_index: u32,
    /// Always < 0
    pub delta_composite: f64,
    /// Decreased axes, largest |delta| first
    pub trigger_axes: Vec<AxisDelta>,
    pub judge_latency_ms: u64,
}

/// One completed pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassRecord {
    pub pass_index: u32,
    pub strategy: String,
    pub oracle_hash: String,
    pub candidate_hash: String,
    pub candidate_composite: f64,
    pub delta_composite: f64,
    pub decision: PassDecision,
    pub reason: ReasonCode,
    pub judge_latency_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    Patch,
    Judge,
}

/// Provider failure that ended the run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureRecord {
    pub pass_index: u32,
    pub stage: FailureStage,
    pub reason: ReasonCode,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SovereignLoopRun {
    pub packet_id: String,
    pub outcome: LoopOutcome,
    pub reason: ReasonCode,
    /// Completed passes (accepted + rolled back)
    pub iterations: u32,
    pub accepted_count: u32,
    pub rollback_count: u32,
    pub s_score_initial: SScoreResult,
    pub s_score_final: SScoreResult,
    /// s_score_final.composite - s_score_initial.composite, never negative
    pub loop_delta_composite: f64,
    pub final_prose: String,
    pub rollback_log: Vec<RollbackEntry>,
    pub trace: Vec<PassRecord>,
    pub failure: Option<FailureRecord>,
    pub trace_hash: String,
}

impl SovereignLoopRun {
    pub fn is_sealed(&self) -> bool {
        self.outcome == LoopOutcome::Sealed
    }
}
