//! Per-paragraph emotional state and the transitions between states

use serde::{Deserialize, Serialize};

use crate::types::laws::{FeasibilityCheck, InertiaCheck};
use crate::types::physics::canonical_valence;

/// A paragraph's emotional snapshot. Never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OmegaState {
    /// Y: intensity, clamped to [0, INTENSITY_MAX]
    pub intensity: f64,
    /// Z: accumulated load, in [0, C]
    pub saturation: f64,
    /// Dominant emotion label
    pub dominant: String,
    /// Valence in [-1, 1]
    pub valence: f64,
}

impl OmegaState {
    /// State whose valence is the canonical valence of its dominant emotion
    pub fn new(intensity: f64, saturation: f64, dominant: impl Into<String>) -> Self {
        let dominant = dominant.into();
        let valence = canonical_valence(&dominant);
        Self {
            intensity: clamp_intensity(intensity),
            saturation: if saturation.is_finite() { saturation.max(0.0) } else { 0.0 },
            dominant,
            valence,
        }
    }

    pub fn with_valence(mut self, valence: f64) -> Self {
        self.valence = if valence.is_finite() { valence.clamp(-1.0, 1.0) } else { 0.0 };
        self
    }
}

fn clamp_intensity(y: f64) -> f64 {
    if y.is_finite() {
        y.clamp(0.0, crate::INTENSITY_MAX)
    } else {
        0.0
    }
}

/// One consecutive paragraph pair with its law verdicts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionTransition {
    /// Index of the originating paragraph
    pub from_index: usize,
    pub from: OmegaState,
    pub to: OmegaState,
    /// Beat that caused the transition, if any
    pub beat_id: Option<String>,
    pub intensity_delta: f64,
    pub valence_delta: f64,
    pub inertia: InertiaCheck,
    pub feasibility: FeasibilityCheck,
    /// Inertia law violated
    pub forced_transition: bool,
    /// Feasibility law violated
    pub feasibility_fail: bool,
}

impl EmotionTransition {
    /// Neither Inertia nor Feasibility violated
    pub fn is_compliant(&self) -> bool {
        !self.forced_transition && !self.feasibility_fail
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_clamps_intensity() {
        assert_eq!(OmegaState::new(140.0, 0.0, "joy").intensity, 100.0);
        assert_eq!(OmegaState::new(-3.0, 0.0, "joy").intensity, 0.0);
        assert_eq!(OmegaState::new(f64::NAN, 0.0, "joy").intensity, 0.0);
    }

    #[test]
    fn test_valence_from_label() {
        let s = OmegaState::new(50.0, 10.0, "fear");
        assert_eq!(s.valence, -0.7);
        assert_eq!(s.with_valence(3.0).valence, 1.0);
    }
}
