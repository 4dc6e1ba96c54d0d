//! Core engines for the sovereign judge

pub mod hash;
pub mod text;
pub mod physics;
pub mod emotion_text;
pub mod feasibility;
pub mod trajectory;
pub mod axes;
pub mod aggregator;
pub mod delta;
pub mod oracle;
pub mod providers;
pub mod sovereign_loop;
pub mod api;

pub use hash::{hash_record, sha256_hex};
pub use emotion_text::extract_states;
pub use feasibility::{BeatBudgetPolicy, FeasibilityPolicy};
pub use trajectory::TrajectoryAnalyzer;
pub use axes::{AxisScorer, CalcJudge};
pub use aggregator::{compute_composite, compute_sscore, compute_sscore_at, verdict_for};
pub use delta::build_delta_report;
pub use oracle::{select_best_strategy, PitchOracle};
pub use providers::{
    detect_refusal, JudgeProvider, ModelBackend, PatchProvider, ReplayPatchProvider,
};
pub use sovereign_loop::SovereignLoop;
pub use api::{create_router, run_server, AppState};
