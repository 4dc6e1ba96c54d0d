//! Compliance law results
//!
//! Law 1: Inertia, Law 2: Feasibility, Law 4: Organic Decay, Law 5: Flux.
//! Violations are recorded here, never raised as errors.

use serde::{Deserialize, Serialize};

use crate::types::omega::EmotionTransition;
use crate::types::physics::DampingRegime;

/// Inertia law outcome for one transition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InertiaCheck {
    pub force: f64,
    pub mass: f64,
    pub resistance: f64,
    /// true iff force ≤ mass × resistance
    pub forced: bool,
}

/// Feasibility law outcome for one transition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeasibilityCheck {
    pub feasible: bool,
    /// Largest |ΔY| the originating beat can justify
    pub max_intensity_delta: f64,
    /// Largest |Δvalence| the originating beat can justify
    pub max_valence_swing: f64,
    pub detail: String,
}

impl FeasibilityCheck {
    /// Fail-closed result for unusable inputs
    pub fn infeasible(detail: impl Into<String>) -> Self {
        Self {
            feasible: false,
            max_intensity_delta: 0.0,
            max_valence_swing: 0.0,
            detail: detail.into(),
        }
    }
}

/// Parameters of one theoretical decay curve.
///
/// Phase convention: φ = 0 for every regime, so the curve starts at
/// `initial` exactly. For ζ ≥ 1 the cosine factor is 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecayCurve {
    /// I0
    pub initial: f64,
    /// E0
    pub baseline: f64,
    /// λ
    pub decay_rate: f64,
    /// μ
    pub saturation_coupling: f64,
    /// Z
    pub saturation: f64,
    /// C
    pub capacity: f64,
    /// ζ
    pub damping_ratio: f64,
    /// ω
    pub frequency: f64,
    /// φ
    pub phase: f64,
}

/// Organic decay (Law 4) for one segment between spikes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrganicDecayAnalysis {
    /// First paragraph index of the segment
    pub start: usize,
    /// Last paragraph index of the segment (inclusive)
    pub end: usize,
    pub emotion: String,
    pub regime: Option<DampingRegime>,
    pub actual: Vec<f64>,
    pub theoretical: Vec<f64>,
    /// RMS deviation between the two curves; `None` when the segment
    /// could not be analyzed (missing or invalid constants, bad samples)
    pub deviation: Option<f64>,
    pub tolerance: f64,
    pub compliant: bool,
}

/// Flux conservation (Law 5) over the whole sequence.
///
/// All quantities are in normalized energy units (intensity / 100,
/// saturation / C).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FluxConservationResult {
    /// Energy carried off by transitions beyond natural decay
    pub transferred: f64,
    /// Net change of accumulated load
    pub stored: f64,
    /// Energy lost to natural decay
    pub dissipated: f64,
    /// Energy injected by intensity rises
    pub total: f64,
    pub balance_error: f64,
    pub tolerance: f64,
    pub compliant: bool,
}

/// Aggregate verdict of all laws over one trajectory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LawComplianceReport {
    pub paragraph_count: usize,
    pub transitions: Vec<EmotionTransition>,
    pub decay_segments: Vec<OrganicDecayAnalysis>,
    pub flux: FluxConservationResult,
    pub forced_transitions: usize,
    pub feasibility_failures: usize,
    /// Non-compliant decay segments
    pub law4_violations: usize,
    /// Compliant transitions / total transitions; 1 when there are none
    pub overall_compliance: f64,
    pub content_hash: String,
}

impl LawComplianceReport {
    pub fn is_fully_compliant(&self) -> bool {
        self.forced_transitions == 0
            && self.feasibility_failures == 0
            && self.law4_violations == 0
            && self.flux.compliant
    }
}
