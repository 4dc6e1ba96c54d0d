//! Core types for the sovereign judge

mod axis;
mod config;
mod delta;
mod error;
mod laws;
mod omega;
mod packet;
mod physics;
mod pitch;
mod reason;
mod sovereign;
mod sscore;

pub use axis::{AxesScores, AxisDetails, AxisName, AxisScore, ScoringMethod};
pub use config::SovereignConfig;
pub use delta::{AxisGap, DeltaReport};
pub use error::{ProviderError, SovereignError, SovereignResult};
pub use laws::{
    DecayCurve, FeasibilityCheck, FluxConservationResult, InertiaCheck, LawComplianceReport,
    OrganicDecayAnalysis,
};
pub use omega::{EmotionTransition, OmegaState};
pub use packet::{
    BeatKind, BeatPolarity, CanonFact, ContinuityState, Language, NarrativeBeat, NarrativePlan,
    QuartileTarget, SceneIntent, ScenePacket, StyleConstraints,
};
pub use physics::{canonical_valence, DampingRegime, EmotionPhysics, EmotionPhysicsTable, EMOTION_LABELS};
pub use pitch::{CorrectionOp, OpCategory, OracleSelection, PitchStrategy};
pub use reason::ReasonCode;
pub use sovereign::{
    AxisDelta, FailureRecord, FailureStage, LoopOutcome, PassDecision, PassRecord, RollbackEntry,
    SovereignLoopRun,
};
pub use sscore::{SScoreResult, Verdict};
