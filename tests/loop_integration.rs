//! Integration tests for the sovereign loop
//!
//! Tests terminal states, accept/rollback accounting, provider failures and
//! replay determinism. Model-judge runs use single-sentence prose so the
//! computed axes stay fixed and the backend alone moves the composite:
//! composite = (9.5 × model + 510) / 15.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use pretty_assertions::assert_eq;

use sovereign_core::core::{
    BeatBudgetPolicy, CalcJudge, JudgeProvider, ModelBackend, PatchProvider, ReplayPatchProvider,
    SovereignLoop,
};
use sovereign_core::types::{
    AxisName, EmotionPhysicsTable, FailureStage, LoopOutcome, PassDecision, PitchStrategy,
    ProviderError, QuartileTarget, ReasonCode, SceneIntent, ScenePacket, SovereignConfig,
    SovereignError, SovereignLoopRun,
};

// =============================================================================
// FIXTURES
// =============================================================================

fn packet() -> ScenePacket {
    let q = |label: &str| QuartileTarget {
        target: BTreeMap::from([(label.to_string(), 1.0)]),
        valence: -0.3,
        arousal: 0.5,
        dominant: label.to_string(),
    };
    ScenePacket {
        packet_id: "pkt-loop".into(),
        scene_id: "scene-3".into(),
        language: Default::default(),
        intent: SceneIntent::default(),
        emotion_curve: vec![q("anticipation"), q("fear"), q("fear"), q("sadness")],
        beats: Vec::new(),
        style: Default::default(),
        canon: Vec::new(),
        continuity: Default::default(),
        seed: "99".into(),
    }
}

fn config(max_passes: u32) -> SovereignConfig {
    SovereignConfig {
        max_passes,
        ..Default::default()
    }
}

fn calc(config: &SovereignConfig) -> CalcJudge {
    CalcJudge::new(
        Arc::new(config.clone()),
        Arc::new(EmotionPhysicsTable::canonical()),
        Arc::new(BeatBudgetPolicy::default()),
    )
}

/// Scores every model axis by looking the prose up in a script
struct ScriptedBackend {
    scores: HashMap<String, f64>,
}

impl ScriptedBackend {
    fn new(script: &[(&str, f64)]) -> Self {
        Self {
            scores: script.iter().map(|(p, s)| (p.to_string(), *s)).collect(),
        }
    }
}

#[async_trait]
impl ModelBackend for ScriptedBackend {
    async fn score_axis(
        &self,
        _axis: AxisName,
        _packet: &ScenePacket,
        prose: &str,
    ) -> Result<f64, ProviderError> {
        self.scores
            .get(prose)
            .copied()
            .ok_or_else(|| ProviderError::Failed(format!("no script for '{prose}'")))
    }
}

fn model_judge(config: &SovereignConfig, script: &[(&str, f64)]) -> JudgeProvider {
    JudgeProvider::Model {
        calc: calc(config),
        backend: Arc::new(ScriptedBackend::new(script)),
    }
}

/// Never answers within a short timeout
struct SlowPatch;

#[async_trait]
impl PatchProvider for SlowPatch {
    async fn apply_patch(
        &self,
        prose: &str,
        _strategy: &PitchStrategy,
        _packet: &ScenePacket,
    ) -> Result<String, ProviderError> {
        tokio::time::sleep(Duration::from_millis(500)).await;
        Ok(prose.to_string())
    }
}

const DRAFT: &str = "Draft zero she waited at the door.";
const REV_1: &str = "Revision one she waited at the door and listened.";
const REV_2: &str = "Revision two the door.";
const REV_3: &str = "Revision three she held her breath at the door and listened for the keeper.";

async fn run_model(
    max_passes: u32,
    script: &[(&str, f64)],
    revisions: &[&str],
) -> SovereignLoopRun {
    let config = config(max_passes);
    let physics = EmotionPhysicsTable::canonical();
    let judge = model_judge(&config, script);
    let patcher = ReplayPatchProvider::new(revisions.iter().map(|r| r.to_string()).collect());
    SovereignLoop::new(&config, &physics, &judge, &patcher)
        .run(&packet(), DRAFT)
        .await
        .unwrap()
}

fn assert_invariants(run: &SovereignLoopRun) {
    assert!(run.s_score_final.composite >= run.s_score_initial.composite);
    assert!(run.loop_delta_composite >= 0.0);
    assert_eq!(
        run.loop_delta_composite,
        run.s_score_final.composite - run.s_score_initial.composite
    );
    assert_eq!(run.rollback_count + run.accepted_count, run.iterations);
    assert_eq!(run.trace.len() as u32, run.iterations);
    assert_eq!(run.rollback_log.len() as u32, run.rollback_count);
    for entry in &run.rollback_log {
        assert!(entry.delta_composite < 0.0);
        assert!(!entry.trigger_axes.is_empty());
    }
}

// =============================================================================
// TERMINAL STATES
// =============================================================================

#[tokio::test]
async fn test_accept_rollback_then_seal() {
    let run = run_model(
        5,
        &[(DRAFT, 60.0), (REV_1, 70.0), (REV_2, 50.0), (REV_3, 100.0)],
        &[REV_1, REV_2, REV_3],
    )
    .await;

    assert_invariants(&run);
    assert_eq!(run.outcome, LoopOutcome::Sealed);
    assert_eq!(run.reason, ReasonCode::L001_SEALED);
    assert_eq!(run.iterations, 3);
    assert_eq!(run.accepted_count, 2);
    assert_eq!(run.rollback_count, 1);
    assert_eq!(run.final_prose, REV_3);
    assert!(run.s_score_final.is_sealed());

    let decisions: Vec<_> = run.trace.iter().map(|p| p.decision).collect();
    assert_eq!(
        decisions,
        vec![PassDecision::Accept, PassDecision::Rollback, PassDecision::Accept]
    );
    assert_eq!(run.trace[0].reason, ReasonCode::L002_ACCEPTED_IMPROVED);
    assert_eq!(run.trace[1].reason, ReasonCode::L003_ROLLBACK_REGRESSION);
}

#[tokio::test]
async fn test_rollback_entry_lists_decreased_axes() {
    let run = run_model(
        5,
        &[(DRAFT, 60.0), (REV_1, 70.0), (REV_2, 50.0), (REV_3, 100.0)],
        &[REV_1, REV_2, REV_3],
    )
    .await;

    let entry = &run.rollback_log[0];
    assert_eq!(entry.pass_index, 1);
    assert!((entry.delta_composite - (-9.5 * 20.0 / 15.0)).abs() < 1e-9);
    let axes: Vec<_> = entry.trigger_axes.iter().map(|d| d.axis).collect();
    assert_eq!(
        axes,
        vec![
            AxisName::Interiority,
            AxisName::Tension,
            AxisName::SensoryDensity,
            AxisName::Necessity,
            AxisName::Impact,
        ]
    );
    assert!(entry.trigger_axes.iter().all(|d| d.delta == -20.0));
}

#[tokio::test]
async fn test_exhausted_never_regresses() {
    let run = run_model(
        2,
        &[(DRAFT, 60.0), (REV_1, 60.0), (REV_2, 50.0)],
        &[REV_1, REV_2],
    )
    .await;

    assert_invariants(&run);
    assert_eq!(run.outcome, LoopOutcome::Exhausted);
    assert_eq!(run.reason, ReasonCode::L004_EXHAUSTED);
    assert_eq!(run.iterations, 2);
    assert_eq!(run.trace[0].reason, ReasonCode::L002_ACCEPTED_NEUTRAL);
    assert_eq!(run.final_prose, REV_1);
    assert_eq!(run.loop_delta_composite, 0.0);
}

#[tokio::test]
async fn test_initial_seal_runs_no_pass() {
    let run = run_model(5, &[(DRAFT, 100.0)], &[REV_1]).await;
    assert_invariants(&run);
    assert_eq!(run.outcome, LoopOutcome::Sealed);
    assert_eq!(run.reason, ReasonCode::L001_SEALED_INITIAL);
    assert_eq!(run.iterations, 0);
    assert_eq!(run.final_prose, DRAFT);
}

// =============================================================================
// PROVIDER FAILURES
// =============================================================================

#[tokio::test]
async fn test_refusal_is_execution_failure() {
    let refusal = "I'm sorry, but I can't help with rewriting this scene.";
    let run = run_model(5, &[(DRAFT, 60.0), (refusal, 100.0)], &[refusal]).await;

    assert_invariants(&run);
    assert_eq!(run.outcome, LoopOutcome::ExecutionFailed);
    assert_eq!(run.reason, ReasonCode::L005_PATCH_REFUSAL);
    assert_eq!(run.iterations, 0);
    assert_eq!(run.final_prose, DRAFT);
    let failure = run.failure.unwrap();
    assert_eq!(failure.stage, FailureStage::Patch);
    assert_eq!(failure.pass_index, 0);
}

#[tokio::test]
async fn test_empty_output_is_execution_failure() {
    let run = run_model(5, &[(DRAFT, 60.0)], &["  \n\n  "]).await;
    assert_eq!(run.outcome, LoopOutcome::ExecutionFailed);
    assert_eq!(run.reason, ReasonCode::L005_PATCH_EMPTY);
}

#[tokio::test]
async fn test_failure_keeps_prior_passes() {
    let run = run_model(5, &[(DRAFT, 60.0), (REV_1, 70.0)], &[REV_1]).await;

    assert_invariants(&run);
    assert_eq!(run.outcome, LoopOutcome::ExecutionFailed);
    assert_eq!(run.reason, ReasonCode::L005_PATCH_FAILED);
    assert_eq!(run.iterations, 1);
    assert_eq!(run.accepted_count, 1);
    assert_eq!(run.final_prose, REV_1);
    assert_eq!(run.failure.unwrap().pass_index, 1);
    assert!(!run.s_score_final.is_sealed());
}

#[tokio::test]
async fn test_judge_failure_is_distinguished() {
    let run = run_model(5, &[(DRAFT, 60.0)], &[REV_1]).await;
    assert_eq!(run.outcome, LoopOutcome::ExecutionFailed);
    assert_eq!(run.reason, ReasonCode::L006_JUDGE_FAILED);
    assert_eq!(run.failure.unwrap().stage, FailureStage::Judge);
    assert_eq!(run.rollback_count, 0);
}

#[tokio::test]
async fn test_patch_timeout() {
    let config = SovereignConfig {
        provider_timeout_ms: Some(20),
        ..config(3)
    };
    let physics = EmotionPhysicsTable::canonical();
    let judge = model_judge(&config, &[(DRAFT, 60.0)]);
    let run = SovereignLoop::new(&config, &physics, &judge, &SlowPatch)
        .run(&packet(), DRAFT)
        .await
        .unwrap();

    assert_eq!(run.outcome, LoopOutcome::ExecutionFailed);
    assert_eq!(run.reason, ReasonCode::L005_PATCH_TIMEOUT);
}

#[tokio::test]
async fn test_initial_judge_failure_is_error() {
    let config = config(3);
    let physics = EmotionPhysicsTable::canonical();
    let judge = model_judge(&config, &[]);
    let patcher = ReplayPatchProvider::new(Vec::new());
    let err = SovereignLoop::new(&config, &physics, &judge, &patcher)
        .run(&packet(), DRAFT)
        .await
        .unwrap_err();
    assert!(matches!(err, SovereignError::Provider(ProviderError::Failed(_))));
}

#[tokio::test]
async fn test_invalid_packet_fails_before_any_pass() {
    let config = config(3);
    let physics = EmotionPhysicsTable::canonical();
    let judge = JudgeProvider::Calc(calc(&config));
    let patcher = ReplayPatchProvider::new(vec![REV_1.to_string()]);

    let mut bad = packet();
    bad.seed.clear();
    let err = SovereignLoop::new(&config, &physics, &judge, &patcher)
        .run(&bad, DRAFT)
        .await
        .unwrap_err();
    assert!(matches!(err, SovereignError::Validation(_)));
    assert_eq!(patcher.remaining(), 1);

    let mut unknown = packet();
    unknown.emotion_curve[2].dominant = "nostalgia".into();
    let err = SovereignLoop::new(&config, &physics, &judge, &patcher)
        .run(&unknown, DRAFT)
        .await
        .unwrap_err();
    assert!(matches!(err, SovereignError::MissingPhysics { .. }));
}

// =============================================================================
// DETERMINISM
// =============================================================================

const CALC_DRAFT: &str = "She climbed the stairs.\n\n\
                          The door was locked and fear came up her throat, dread, panic.\n\n\
                          She sat down.";

const CALC_REVISIONS: [&str; 3] = [
    "She climbed the stairs, hoping, counting each step.\n\n\
     The door was locked. Fear rose in her, slow, then all at once.\n\n\
     She sat on the cold stone and waited for the sadness to pass.",
    "Stairs.\n\nDoor.\n\nShe sat.",
    "She climbed the stairs with the lantern, hoping the keeper was awake.\n\n\
     The door was locked. She knew, with a fear that had been waiting for her all \
     evening, that no one had lit the lamp.\n\n\
     She sat on the cold stone. The salt wind moved through the rail. She wept.",
];

async fn run_calc() -> SovereignLoopRun {
    let config = config(3);
    let physics = EmotionPhysicsTable::canonical();
    let judge = JudgeProvider::Calc(calc(&config));
    let patcher = ReplayPatchProvider::new(CALC_REVISIONS.iter().map(|r| r.to_string()).collect());
    SovereignLoop::new(&config, &physics, &judge, &patcher)
        .run(&packet(), CALC_DRAFT)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_calc_run_is_reproducible() {
    let first = run_calc().await;
    assert_invariants(&first);
    assert!(first.trace.iter().all(|p| p.judge_latency_ms == 0));

    for _ in 0..100 {
        let again = run_calc().await;
        assert_eq!(again.trace_hash, first.trace_hash);
        assert_eq!(again.s_score_initial.content_hash, first.s_score_initial.content_hash);
        assert_eq!(again.s_score_final.content_hash, first.s_score_final.content_hash);
        assert_eq!(again.rollback_log, first.rollback_log);
        assert_eq!(again.trace, first.trace);
        assert_eq!(again.final_prose, first.final_prose);
    }
}

#[tokio::test]
async fn test_run_serializes_with_screaming_outcome() {
    let run = run_calc().await;
    let json = serde_json::to_value(&run).unwrap();
    let outcome = json["outcome"].as_str().unwrap();
    assert!(["SEALED", "EXHAUSTED", "EXECUTION_FAILED"].contains(&outcome));
    assert_eq!(json["trace_hash"].as_str().unwrap().len(), 64);
}
