//! Upstream scene packet (consumed, not owned) and narrative beat planning

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::error::{SovereignError, SovereignResult};
use crate::types::physics::EmotionPhysicsTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Fr,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SceneIntent {
    pub scene_goal: String,
    pub conflict_type: String,
    pub pov: String,
    pub tense: String,
    #[serde(default)]
    pub story_premise: String,
}

/// Target emotion for one quartile of the scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuartileTarget {
    /// Emotion label → weight in [0, 1]; missing labels are 0
    pub target: BTreeMap<String, f64>,
    /// [-1, 1]
    pub valence: f64,
    /// [0, 1]
    pub arousal: f64,
    pub dominant: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BeatKind {
    Description,
    Reflection,
    Dialogue,
    Action,
    Confrontation,
    Revelation,
    Rupture,
}

impl BeatKind {
    /// Base narrative force of this kind of beat, per unit of beat intensity
    pub fn base_force(&self) -> f64 {
        match self {
            Self::Description => 0.2,
            Self::Reflection => 0.3,
            Self::Dialogue => 0.4,
            Self::Action => 0.6,
            Self::Confrontation => 0.8,
            Self::Revelation => 0.9,
            Self::Rupture => 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BeatPolarity {
    Rising,
    Falling,
    #[default]
    Neutral,
}

impl BeatPolarity {
    /// Whether an intensity change of `delta` runs against this polarity
    pub fn opposes(&self, delta: f64) -> bool {
        match self {
            Self::Rising => delta < 0.0,
            Self::Falling => delta > 0.0,
            Self::Neutral => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrativeBeat {
    pub beat_id: String,
    pub kind: BeatKind,
    /// [0, 1]
    pub intensity: f64,
    #[serde(default)]
    pub polarity: BeatPolarity,
    /// Paragraph this beat lands on, if pinned
    #[serde(default)]
    pub paragraph: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleConstraints {
    #[serde(default)]
    pub signature_words: Vec<String>,
    #[serde(default)]
    pub banned_cliches: Vec<String>,
    #[serde(default)]
    pub banned_words: Vec<String>,
    /// Sensory markers per 100 words
    #[serde(default = "default_sensory_target")]
    pub sensory_density_target: f64,
}

fn default_sensory_target() -> f64 {
    4.0
}

impl Default for StyleConstraints {
    fn default() -> Self {
        Self {
            signature_words: Vec::new(),
            banned_cliches: Vec::new(),
            banned_words: Vec::new(),
            sensory_density_target: default_sensory_target(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonFact {
    pub id: String,
    pub statement: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ContinuityState {
    #[serde(default)]
    pub previous_summary: String,
    /// Character name → state description
    #[serde(default)]
    pub character_states: BTreeMap<String, String>,
}

/// Immutable bundle describing one scene to judge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenePacket {
    pub packet_id: String,
    pub scene_id: String,
    #[serde(default)]
    pub language: Language,
    pub intent: SceneIntent,
    /// Exactly four quartile targets
    pub emotion_curve: Vec<QuartileTarget>,
    #[serde(default)]
    pub beats: Vec<NarrativeBeat>,
    #[serde(default)]
    pub style: StyleConstraints,
    #[serde(default)]
    pub canon: Vec<CanonFact>,
    #[serde(default)]
    pub continuity: ContinuityState,
    pub seed: String,
}

impl ScenePacket {
    /// Reject malformed packets before any scoring runs.
    pub fn validate(&self, physics: &EmotionPhysicsTable) -> SovereignResult<()> {
        if self.packet_id.trim().is_empty() {
            return Err(invalid("packet_id must not be empty"));
        }
        if self.scene_id.trim().is_empty() {
            return Err(invalid("scene_id must not be empty"));
        }
        if self.seed.trim().is_empty() {
            return Err(invalid("seed must not be empty"));
        }
        if self.emotion_curve.len() != 4 {
            return Err(invalid(format!(
                "emotion_curve must have 4 quartiles, got {}",
                self.emotion_curve.len()
            )));
        }

        physics.validate()?;
        for (q, quartile) in self.emotion_curve.iter().enumerate() {
            physics.require(&quartile.dominant)?;
            for (label, weight) in &quartile.target {
                physics.require(label)?;
                if !weight.is_finite() || !(0.0..=1.0).contains(weight) {
                    return Err(invalid(format!(
                        "quartile {q}: target weight for {label} out of [0, 1]"
                    )));
                }
            }
            if !(-1.0..=1.0).contains(&quartile.valence) {
                return Err(invalid(format!("quartile {q}: valence out of [-1, 1]")));
            }
            if !(0.0..=1.0).contains(&quartile.arousal) {
                return Err(invalid(format!("quartile {q}: arousal out of [0, 1]")));
            }
        }

        let mut seen = std::collections::BTreeSet::new();
        for beat in &self.beats {
            if beat.beat_id.trim().is_empty() {
                return Err(invalid("beat_id must not be empty"));
            }
            if !seen.insert(beat.beat_id.as_str()) {
                return Err(invalid(format!("duplicate beat_id {}", beat.beat_id)));
            }
            if !(0.0..=1.0).contains(&beat.intensity) {
                return Err(invalid(format!(
                    "beat {}: intensity out of [0, 1]",
                    beat.beat_id
                )));
            }
        }

        let target = self.style.sensory_density_target;
        if !target.is_finite() || target <= 0.0 {
            return Err(invalid("sensory_density_target must be > 0"));
        }
        Ok(())
    }
}

fn invalid(msg: impl Into<String>) -> SovereignError {
    SovereignError::Validation(msg.into())
}

/// Resolves the originating beat of each paragraph transition.
///
/// A beat pinned to a paragraph owns exactly that paragraph. Unpinned beats
/// split the paragraphs proportionally, in order. The transition into
/// paragraph `p` is caused by the beat owning `p`.
#[derive(Debug, Clone)]
pub struct NarrativePlan<'a> {
    owners: Vec<Option<&'a NarrativeBeat>>,
}

impl<'a> NarrativePlan<'a> {
    pub fn new(beats: &'a [NarrativeBeat], paragraph_count: usize) -> Self {
        let mut owners: Vec<Option<&'a NarrativeBeat>> = vec![None; paragraph_count];

        let floating: Vec<&NarrativeBeat> =
            beats.iter().filter(|b| b.paragraph.is_none()).collect();
        if !floating.is_empty() {
            let n = paragraph_count;
            let k = floating.len();
            for (p, owner) in owners.iter_mut().enumerate() {
                *owner = Some(floating[(p * k / n.max(1)).min(k - 1)]);
            }
        }

        for beat in beats {
            if let Some(p) = beat.paragraph {
                if p < paragraph_count {
                    owners[p] = Some(beat);
                }
            }
        }

        Self { owners }
    }

    /// Plan with no beats
    pub fn empty(paragraph_count: usize) -> Self {
        Self {
            owners: vec![None; paragraph_count],
        }
    }

    /// Beat that caused the transition into paragraph `to_index`
    pub fn beat_for_transition(&self, to_index: usize) -> Option<&'a NarrativeBeat> {
        self.owners.get(to_index).copied().flatten()
    }

    pub fn paragraph_count(&self) -> usize {
        self.owners.len()
    }
}
