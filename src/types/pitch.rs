//! Correction pitches: named, ordered edit-operation sequences.
//!
//! Purely descriptive. A strategy carries no text; the PatchProvider
//! decides how to realize it.

use serde::{Deserialize, Serialize};

use crate::core::hash::hash_record;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpCategory {
    Emotion,
    Craft,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrectionOp {
    // emotion
    AddMicroRuptureEvent,
    IncreaseInterioritySignal,
    AddConsequenceLine,
    ShiftEmotionRegister,
    InjectSilenceZone,
    DeepenClosing,
    // craft
    InjectSensoryDetail,
    ConvertDialogueToIndirect,
    TightenSentenceRhythm,
    ReplaceCliche,
    CompressExposition,
    SharpenOpening,
    ReinforceSignature,
}

impl CorrectionOp {
    pub const ALL: [CorrectionOp; 13] = [
        Self::AddMicroRuptureEvent,
        Self::IncreaseInterioritySignal,
        Self::AddConsequenceLine,
        Self::ShiftEmotionRegister,
        Self::InjectSilenceZone,
        Self::DeepenClosing,
        Self::InjectSensoryDetail,
        Self::ConvertDialogueToIndirect,
        Self::TightenSentenceRhythm,
        Self::ReplaceCliche,
        Self::CompressExposition,
        Self::SharpenOpening,
        Self::ReinforceSignature,
    ];

    pub fn category(&self) -> OpCategory {
        match self {
            Self::AddMicroRuptureEvent
            | Self::IncreaseInterioritySignal
            | Self::AddConsequenceLine
            | Self::ShiftEmotionRegister
            | Self::InjectSilenceZone
            | Self::DeepenClosing => OpCategory::Emotion,
            Self::InjectSensoryDetail
            | Self::ConvertDialogueToIndirect
            | Self::TightenSentenceRhythm
            | Self::ReplaceCliche
            | Self::CompressExposition
            | Self::SharpenOpening
            | Self::ReinforceSignature => OpCategory::Craft,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AddMicroRuptureEvent => "add_micro_rupture_event",
            Self::IncreaseInterioritySignal => "increase_interiority_signal",
            Self::AddConsequenceLine => "add_consequence_line",
            Self::ShiftEmotionRegister => "shift_emotion_register",
            Self::InjectSilenceZone => "inject_silence_zone",
            Self::DeepenClosing => "deepen_closing",
            Self::InjectSensoryDetail => "inject_sensory_detail",
            Self::ConvertDialogueToIndirect => "convert_dialogue_to_indirect",
            Self::TightenSentenceRhythm => "tighten_sentence_rhythm",
            Self::ReplaceCliche => "replace_cliche",
            Self::CompressExposition => "compress_exposition",
            Self::SharpenOpening => "sharpen_opening",
            Self::ReinforceSignature => "reinforce_signature",
        }
    }

    /// Instruction handed to a patch provider
    pub fn instruction(&self) -> &'static str {
        match self {
            Self::AddMicroRuptureEvent => "Insert a small event that breaks the expected flow",
            Self::IncreaseInterioritySignal => "Let the POV character's inner thought surface",
            Self::AddConsequenceLine => "Show the consequence of the emotional turn",
            Self::ShiftEmotionRegister => "Move the dominant emotion toward the quartile target",
            Self::InjectSilenceZone => "Leave a beat of silence before the next action",
            Self::DeepenClosing => "End on an image that carries the scene's emotion",
            Self::InjectSensoryDetail => "Add a concrete sensory detail",
            Self::ConvertDialogueToIndirect => "Turn a stretch of dialogue into indirect speech",
            Self::TightenSentenceRhythm => "Vary sentence lengths; cut slack clauses",
            Self::ReplaceCliche => "Replace stock phrases with specific ones",
            Self::CompressExposition => "Cut repeated or explanatory material",
            Self::SharpenOpening => "Open on a short, concrete sentence",
            Self::ReinforceSignature => "Weave in the author's signature vocabulary",
        }
    }
}

impl std::fmt::Display for CorrectionOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PitchStrategy {
    pub name: String,
    pub ops: Vec<CorrectionOp>,
    pub rationale: String,
    /// Hash of name, ops and rationale
    pub content_hash: String,
}

impl PitchStrategy {
    pub fn new(name: impl Into<String>, ops: Vec<CorrectionOp>, rationale: impl Into<String>) -> Self {
        let mut strategy = Self {
            name: name.into(),
            ops,
            rationale: rationale.into(),
            content_hash: String::new(),
        };
        strategy.content_hash = hash_record(&strategy);
        strategy
    }

    pub fn count(&self, category: OpCategory) -> usize {
        self.ops.iter().filter(|op| op.category() == category).count()
    }
}

/// Outcome of ranking a candidate list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OracleSelection {
    pub selected_index: usize,
    /// One score per candidate, in input order
    pub scores: Vec<f64>,
    pub oracle_hash: String,
}
