//! Emotion physics constants
//!
//! One `EmotionPhysics` record per emotion label. The table is built once
//! and shared read-only (behind `Arc`) by every run.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::error::{SovereignError, SovereignResult};

/// The 14 emotion labels of the analysis space, in canonical order.
///
/// Order matters: dominant-emotion ties resolve to the earlier label.
pub const EMOTION_LABELS: [&str; 14] = [
    "joy",
    "trust",
    "fear",
    "surprise",
    "sadness",
    "disgust",
    "anger",
    "anticipation",
    "love",
    "submission",
    "awe",
    "disapproval",
    "remorse",
    "contempt",
];

/// Canonical valence of an emotion label in [-1, 1]. Unknown labels are neutral.
pub fn canonical_valence(label: &str) -> f64 {
    match label {
        "joy" => 0.8,
        "trust" => 0.6,
        "fear" => -0.7,
        "surprise" => 0.1,
        "sadness" => -0.7,
        "disgust" => -0.6,
        "anger" => -0.6,
        "anticipation" => 0.3,
        "love" => 0.9,
        "submission" => -0.2,
        "awe" => 0.5,
        "disapproval" => -0.5,
        "remorse" => -0.6,
        "contempt" => -0.5,
        _ => 0.0,
    }
}

/// Damping regime of the decay envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DampingRegime {
    /// ζ < 1: oscillating decay
    Underdamped,
    /// ζ = 1: fastest non-oscillating decay
    Critical,
    /// ζ > 1: slow non-oscillating decay
    Overdamped,
}

impl std::fmt::Display for DampingRegime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Underdamped => write!(f, "underdamped"),
            Self::Critical => write!(f, "critical"),
            Self::Overdamped => write!(f, "overdamped"),
        }
    }
}

/// Physical constants of one emotion
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmotionPhysics {
    /// M: resistance to change
    pub mass: f64,
    /// λ: base decay rate per paragraph
    pub decay_rate: f64,
    /// ζ: damping ratio
    pub damping_ratio: f64,
    /// μ: saturation coupling in [0, 1]
    pub saturation_coupling: f64,
    /// E0: resting intensity
    pub baseline: f64,
}

impl EmotionPhysics {
    pub const fn new(
        mass: f64,
        decay_rate: f64,
        damping_ratio: f64,
        saturation_coupling: f64,
        baseline: f64,
    ) -> Self {
        Self {
            mass,
            decay_rate,
            damping_ratio,
            saturation_coupling,
            baseline,
        }
    }

    /// Constants usable by the laws. Anything else fails closed.
    pub fn is_valid(&self) -> bool {
        self.mass.is_finite()
            && self.mass > 0.0
            && self.decay_rate.is_finite()
            && self.decay_rate >= 0.0
            && self.damping_ratio.is_finite()
            && self.damping_ratio >= 0.0
            && (0.0..=1.0).contains(&self.saturation_coupling)
            && self.baseline.is_finite()
            && self.baseline >= 0.0
    }
}

/// Immutable label → constants lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionPhysicsTable {
    entries: BTreeMap<String, EmotionPhysics>,
}

impl EmotionPhysicsTable {
    /// Build a table from explicit entries
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, EmotionPhysics)>,
        S: Into<String>,
    {
        Self {
            entries: entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Constants for all 14 emotions
    pub fn canonical() -> Self {
        Self::from_entries([
            ("joy", EmotionPhysics::new(3.0, 0.15, 0.6, 0.3, 10.0)),
            ("trust", EmotionPhysics::new(5.0, 0.06, 1.2, 0.2, 15.0)),
            ("fear", EmotionPhysics::new(4.0, 0.12, 0.5, 0.4, 5.0)),
            ("surprise", EmotionPhysics::new(1.5, 0.35, 0.3, 0.1, 0.0)),
            ("sadness", EmotionPhysics::new(7.0, 0.05, 1.5, 0.5, 10.0)),
            ("disgust", EmotionPhysics::new(4.0, 0.14, 0.8, 0.3, 0.0)),
            ("anger", EmotionPhysics::new(5.0, 0.10, 0.4, 0.4, 5.0)),
            ("anticipation", EmotionPhysics::new(3.0, 0.12, 0.7, 0.2, 15.0)),
            ("love", EmotionPhysics::new(6.0, 0.04, 1.3, 0.3, 15.0)),
            ("submission", EmotionPhysics::new(5.0, 0.08, 1.0, 0.2, 5.0)),
            ("awe", EmotionPhysics::new(4.0, 0.10, 0.9, 0.2, 5.0)),
            ("disapproval", EmotionPhysics::new(4.0, 0.09, 1.1, 0.3, 5.0)),
            ("remorse", EmotionPhysics::new(6.0, 0.05, 1.4, 0.5, 5.0)),
            ("contempt", EmotionPhysics::new(5.0, 0.07, 1.2, 0.3, 5.0)),
        ])
    }

    /// Load a table from JSON (`{"joy": {"mass": ..}, ..}`)
    pub fn from_json(json: &str) -> SovereignResult<Self> {
        let entries: BTreeMap<String, EmotionPhysics> = serde_json::from_str(json)?;
        let table = Self { entries };
        table.validate()?;
        Ok(table)
    }

    /// Every label extraction can produce needs usable constants.
    pub fn validate(&self) -> SovereignResult<()> {
        let fallback = std::iter::once(crate::FALLBACK_EMOTION);
        for label in EMOTION_LABELS.into_iter().chain(fallback) {
            self.require(label)?;
        }
        for (label, physics) in &self.entries {
            if !physics.is_valid() {
                return Err(SovereignError::Validation(format!(
                    "invalid physics constants for emotion '{label}'"
                )));
            }
        }
        Ok(())
    }

    pub fn get(&self, label: &str) -> Option<&EmotionPhysics> {
        self.entries.get(label)
    }

    /// Lookup that turns a missing label into a validation error
    pub fn require(&self, label: &str) -> SovereignResult<&EmotionPhysics> {
        self.get(label).ok_or_else(|| SovereignError::MissingPhysics {
            label: label.to_string(),
        })
    }

    pub fn contains(&self, label: &str) -> bool {
        self.entries.contains_key(label)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for EmotionPhysicsTable {
    fn default() -> Self {
        Self::canonical()
    }
}
