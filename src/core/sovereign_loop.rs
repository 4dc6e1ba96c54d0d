//! Sovereign loop: propose → patch → rescore → accept or roll back
//!
//! SCORING → (ACCEPT | ROLLBACK) → SCORING → … → SEALED | EXHAUSTED |
//! EXECUTION_FAILED
//!
//! The composite never decreases: a candidate is adopted only when its
//! composite is ≥ the current one. Rollback means not adopting the
//! candidate; snapshots are shared, never mutated.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::core::aggregator::compute_sscore;
use crate::core::delta::build_delta_report;
use crate::core::hash::hash_record;
use crate::core::oracle::{select_best_strategy, PitchOracle};
use crate::core::providers::{screen_output, with_timeout, JudgeProvider, PatchProvider};
use crate::types::{
    AxesScores, AxisDelta, AxisName, EmotionPhysicsTable, FailureRecord, FailureStage,
    LoopOutcome, PassDecision, PassRecord, ReasonCode, RollbackEntry, SScoreResult,
    ScenePacket, SovereignConfig, SovereignLoopRun, SovereignResult,
};

/// Adopted state: prose plus its score, shared by reference
#[derive(Debug, Clone)]
struct Snapshot {
    prose: Arc<str>,
    result: Arc<SScoreResult>,
}

/// Axes whose score dropped, largest |delta| first (canonical order on ties)
pub fn decreased_axes(current: &AxesScores, candidate: &AxesScores) -> Vec<AxisDelta> {
    let mut out: Vec<AxisDelta> = AxisName::ALL
        .iter()
        .map(|&axis| AxisDelta {
            axis,
            delta: candidate.get(axis).score - current.get(axis).score,
        })
        .filter(|d| d.delta < 0.0)
        .collect();
    out.sort_by(|a, b| b.delta.abs().total_cmp(&a.delta.abs()));
    out
}

#[derive(Serialize)]
struct TraceFields<'a> {
    packet_id: &'a str,
    outcome: LoopOutcome,
    initial_hash: &'a str,
    final_hash: &'a str,
    trace: &'a [PassRecord],
    rollback_log: &'a [RollbackEntry],
    failure: &'a Option<FailureRecord>,
}

pub struct SovereignLoop<'a> {
    config: &'a SovereignConfig,
    physics: &'a EmotionPhysicsTable,
    judge: &'a JudgeProvider,
    patcher: &'a dyn PatchProvider,
    oracle: PitchOracle,
}

impl<'a> SovereignLoop<'a> {
    pub fn new(
        config: &'a SovereignConfig,
        physics: &'a EmotionPhysicsTable,
        judge: &'a JudgeProvider,
        patcher: &'a dyn PatchProvider,
    ) -> Self {
        Self {
            config,
            physics,
            judge,
            patcher,
            oracle: PitchOracle::new(),
        }
    }

    /// Run the loop to a terminal state.
    ///
    /// Errors only for an invalid packet or a failed initial scoring; every
    /// later provider failure ends the run as `ExecutionFailed` with its trace.
    pub async fn run(&self, packet: &ScenePacket, prose: &str) -> SovereignResult<SovereignLoopRun> {
        packet.validate(self.physics)?;
        let timeout = self.config.provider_timeout_ms;

        info!(
            packet_id = %packet.packet_id,
            max_passes = self.config.max_passes,
            judge = ?self.judge,
            "sovereign loop started"
        );

        let initial_axes = with_timeout(timeout, self.judge.judge(packet, prose)).await?;
        let initial = Arc::new(compute_sscore(initial_axes));
        let mut current = Snapshot {
            prose: Arc::from(prose),
            result: Arc::clone(&initial),
        };

        let mut trace: Vec<PassRecord> = Vec::new();
        let mut rollback_log: Vec<RollbackEntry> = Vec::new();
        let mut failure: Option<FailureRecord> = None;
        let mut accepted_count = 0u32;
        let mut rollback_count = 0u32;
        let mut pass_index = 0u32;

        while !current.result.is_sealed() && pass_index < self.config.max_passes {
            let delta = build_delta_report(&current.result);
            let candidates = self.oracle.candidates(&delta);
            let Some(selection) = select_best_strategy(&candidates, &delta) else {
                break;
            };
            let strategy = &candidates[selection.selected_index];

            let patched = with_timeout(
                timeout,
                self.patcher.apply_patch(&current.prose, strategy, packet),
            )
            .await
            .and_then(screen_output);
            let candidate_prose = match patched {
                Ok(text) => text,
                Err(err) => {
                    let reason = ReasonCode::for_patch_error(&err);
                    warn!(pass_index, %reason, error = %err, "patch provider failed");
                    failure = Some(FailureRecord {
                        pass_index,
                        stage: FailureStage::Patch,
                        reason,
                        error: err.to_string(),
                    });
                    break;
                }
            };

            let started = Instant::now();
            let judged = with_timeout(timeout, self.judge.judge(packet, &candidate_prose)).await;
            let judge_latency_ms = if self.judge.is_deterministic() {
                0
            } else {
                started.elapsed().as_millis() as u64
            };
            let candidate_axes = match judged {
                Ok(axes) => axes,
                Err(err) => {
                    let reason = ReasonCode::for_judge_error(&err);
                    warn!(pass_index, %reason, error = %err, "judge provider failed");
                    failure = Some(FailureRecord {
                        pass_index,
                        stage: FailureStage::Judge,
                        reason,
                        error: err.to_string(),
                    });
                    break;
                }
            };

            let candidate = compute_sscore(candidate_axes);
            let delta_composite = candidate.composite - current.result.composite;

            let (decision, reason) = if delta_composite >= 0.0 {
                let reason = if delta_composite > 0.0 {
                    ReasonCode::L002_ACCEPTED_IMPROVED
                } else {
                    ReasonCode::L002_ACCEPTED_NEUTRAL
                };
                (PassDecision::Accept, reason)
            } else {
                (PassDecision::Rollback, ReasonCode::L003_ROLLBACK_REGRESSION)
            };

            trace.push(PassRecord {
                pass_index,
                strategy: strategy.name.clone(),
                oracle_hash: selection.oracle_hash.clone(),
                candidate_hash: candidate.content_hash.clone(),
                candidate_composite: candidate.composite,
                delta_composite,
                decision,
                reason,
                judge_latency_ms,
            });

            match decision {
                PassDecision::Accept => {
                    debug!(pass_index, delta_composite, strategy = %strategy.name, "pass accepted");
                    accepted_count += 1;
                    current = Snapshot {
                        prose: Arc::from(candidate_prose),
                        result: Arc::new(candidate),
                    };
                }
                PassDecision::Rollback => {
                    let trigger_axes = decreased_axes(&current.result.axes, &candidate.axes);
                    warn!(
                        pass_index,
                        delta_composite,
                        triggers = trigger_axes.len(),
                        "pass rolled back"
                    );
                    rollback_count += 1;
                    rollback_log.push(RollbackEntry {
                        pass_index,
                        delta_composite,
                        trigger_axes,
                        judge_latency_ms,
                    });
                }
            }

            pass_index += 1;
        }

        let (outcome, reason) = match &failure {
            Some(f) => (LoopOutcome::ExecutionFailed, f.reason),
            None if current.result.is_sealed() && pass_index == 0 => {
                (LoopOutcome::Sealed, ReasonCode::L001_SEALED_INITIAL)
            }
            None if current.result.is_sealed() => (LoopOutcome::Sealed, ReasonCode::L001_SEALED),
            None => (LoopOutcome::Exhausted, ReasonCode::L004_EXHAUSTED),
        };

        let trace_hash = hash_record(&TraceFields {
            packet_id: &packet.packet_id,
            outcome,
            initial_hash: &initial.content_hash,
            final_hash: &current.result.content_hash,
            trace: &trace,
            rollback_log: &rollback_log,
            failure: &failure,
        });

        let s_score_initial = SScoreResult::clone(&initial);
        let s_score_final = SScoreResult::clone(&current.result);
        let loop_delta_composite = s_score_final.composite - s_score_initial.composite;

        info!(
            packet_id = %packet.packet_id,
            %outcome,
            iterations = pass_index,
            accepted_count,
            rollback_count,
            composite_initial = s_score_initial.composite,
            composite_final = s_score_final.composite,
            "sovereign loop finished"
        );

        Ok(SovereignLoopRun {
            packet_id: packet.packet_id.clone(),
            outcome,
            reason,
            iterations: pass_index,
            accepted_count,
            rollback_count,
            s_score_initial,
            s_score_final,
            loop_delta_composite,
            final_prose: current.prose.to_string(),
            rollback_log,
            trace,
            failure,
            trace_hash,
        })
    }
}
