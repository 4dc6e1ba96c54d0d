//! Axis scores and the fixed nine-axis set

use serde::{Deserialize, Serialize};

use crate::types::laws::LawComplianceReport;
use crate::{
    W_ANTI_CLICHE, W_EMOTION_COHERENCE, W_IMPACT, W_INTERIORITY, W_NECESSITY, W_RHYTHM,
    W_SENSORY_DENSITY, W_SIGNATURE, W_TENSION,
};

/// The nine judged axes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisName {
    Interiority,
    Tension,
    SensoryDensity,
    Necessity,
    AntiCliche,
    Rhythm,
    Signature,
    Impact,
    EmotionCoherence,
}

impl AxisName {
    /// All axes in canonical order
    pub const ALL: [AxisName; 9] = [
        Self::Interiority,
        Self::Tension,
        Self::SensoryDensity,
        Self::Necessity,
        Self::AntiCliche,
        Self::Rhythm,
        Self::Signature,
        Self::Impact,
        Self::EmotionCoherence,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Interiority => "interiority",
            Self::Tension => "tension",
            Self::SensoryDensity => "sensory_density",
            Self::Necessity => "necessity",
            Self::AntiCliche => "anti_cliche",
            Self::Rhythm => "rhythm",
            Self::Signature => "signature",
            Self::Impact => "impact",
            Self::EmotionCoherence => "emotion_coherence",
        }
    }

    /// Fixed weight of this axis
    pub fn weight(&self) -> f64 {
        match self {
            Self::Interiority => W_INTERIORITY,
            Self::Tension => W_TENSION,
            Self::SensoryDensity => W_SENSORY_DENSITY,
            Self::Necessity => W_NECESSITY,
            Self::AntiCliche => W_ANTI_CLICHE,
            Self::Rhythm => W_RHYTHM,
            Self::Signature => W_SIGNATURE,
            Self::Impact => W_IMPACT,
            Self::EmotionCoherence => W_EMOTION_COHERENCE,
        }
    }

    /// Emotion-category axes carry the 63.3% emotion weight share
    pub fn is_emotion(&self) -> bool {
        matches!(
            self,
            Self::Tension | Self::EmotionCoherence | Self::Interiority | Self::Impact
        )
    }

    /// Axes a model backend may score
    pub fn is_model_eligible(&self) -> bool {
        matches!(
            self,
            Self::Tension
                | Self::Interiority
                | Self::Impact
                | Self::SensoryDensity
                | Self::Necessity
        )
    }

    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl std::fmt::Display for AxisName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How an axis score was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoringMethod {
    /// Pure computation (CALC)
    Pure,
    Model,
    Hybrid,
}

/// Audit payload attached to an axis score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum AxisDetails {
    Note(String),
    Physics(Box<LawComplianceReport>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisScore {
    pub name: AxisName,
    /// [0, 100]
    pub score: f64,
    pub weight: f64,
    pub method: ScoringMethod,
    pub details: AxisDetails,
}

impl AxisScore {
    /// Inside or under the floor band
    pub fn below_floor(&self) -> bool {
        self.score < crate::AXIS_FLOOR_EXCLUSIVE
    }

    /// Score clamped into [0, 100]; non-finite input fails closed to 0.
    pub fn new(name: AxisName, score: f64, method: ScoringMethod, details: AxisDetails) -> Self {
        let score = if score.is_finite() { score.clamp(0.0, 100.0) } else { 0.0 };
        Self {
            name,
            score,
            weight: name.weight(),
            method,
            details,
        }
    }

    pub fn pure(name: AxisName, score: f64, note: impl Into<String>) -> Self {
        Self::new(name, score, ScoringMethod::Pure, AxisDetails::Note(note.into()))
    }

    /// Compliance report, when this is the physics-backed axis
    pub fn physics_report(&self) -> Option<&LawComplianceReport> {
        match &self.details {
            AxisDetails::Physics(report) => Some(report),
            AxisDetails::Note(_) => None,
        }
    }
}

/// Exactly nine axis scores, one per `AxisName`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxesScores {
    pub interiority: AxisScore,
    pub tension: AxisScore,
    pub sensory_density: AxisScore,
    pub necessity: AxisScore,
    pub anti_cliche: AxisScore,
    pub rhythm: AxisScore,
    pub signature: AxisScore,
    pub impact: AxisScore,
    pub emotion_coherence: AxisScore,
}

impl AxesScores {
    /// Build the set by producing each axis in canonical order
    pub fn from_fn(mut f: impl FnMut(AxisName) -> AxisScore) -> Self {
        Self {
            interiority: f(AxisName::Interiority),
            tension: f(AxisName::Tension),
            sensory_density: f(AxisName::SensoryDensity),
            necessity: f(AxisName::Necessity),
            anti_cliche: f(AxisName::AntiCliche),
            rhythm: f(AxisName::Rhythm),
            signature: f(AxisName::Signature),
            impact: f(AxisName::Impact),
            emotion_coherence: f(AxisName::EmotionCoherence),
        }
    }

    /// Every axis at the same pure score
    pub fn uniform(score: f64) -> Self {
        Self::from_fn(|axis| AxisScore::pure(axis, score, "uniform"))
    }

    pub fn get(&self, axis: AxisName) -> &AxisScore {
        match axis {
            AxisName::Interiority => &self.interiority,
            AxisName::Tension => &self.tension,
            AxisName::SensoryDensity => &self.sensory_density,
            AxisName::Necessity => &self.necessity,
            AxisName::AntiCliche => &self.anti_cliche,
            AxisName::Rhythm => &self.rhythm,
            AxisName::Signature => &self.signature,
            AxisName::Impact => &self.impact,
            AxisName::EmotionCoherence => &self.emotion_coherence,
        }
    }

    /// Copy of this set with one axis replaced
    pub fn with(&self, replacement: AxisScore) -> Self {
        let mut next = self.clone();
        let slot = match replacement.name {
            AxisName::Interiority => &mut next.interiority,
            AxisName::Tension => &mut next.tension,
            AxisName::SensoryDensity => &mut next.sensory_density,
            AxisName::Necessity => &mut next.necessity,
            AxisName::AntiCliche => &mut next.anti_cliche,
            AxisName::Rhythm => &mut next.rhythm,
            AxisName::Signature => &mut next.signature,
            AxisName::Impact => &mut next.impact,
            AxisName::EmotionCoherence => &mut next.emotion_coherence,
        };
        *slot = replacement;
        next
    }

    /// Axes in canonical order
    pub fn iter(&self) -> impl Iterator<Item = &AxisScore> {
        AxisName::ALL.into_iter().map(move |axis| self.get(axis))
    }

    pub fn physics_report(&self) -> Option<&LawComplianceReport> {
        self.emotion_coherence.physics_report()
    }
}
