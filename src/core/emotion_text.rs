//! Keyword emotion extraction: prose → per-paragraph `OmegaState`s
//!
//! EN + FR stems for the 14 emotions. A word counts at most once per
//! emotion. Deterministic: no randomness, no clock.

use crate::core::text::{split_paragraphs, words};
use crate::types::{canonical_valence, OmegaState, SovereignConfig, EMOTION_LABELS};
use crate::FALLBACK_EMOTION;

/// Stems per emotion, in `EMOTION_LABELS` order
const EMOTION_STEMS: [&[&str]; 14] = [
    // joy
    &["joy", "happ", "delight", "glad", "cheer", "elat", "laugh", "smil", "joie", "heureu", "rire", "riant", "souri", "ravi"],
    // trust
    &["trust", "faith", "rely", "relied", "confid", "loyal", "confian", "fidèl", "sûr"],
    // fear
    &["fear", "afraid", "terrif", "terror", "dread", "panic", "scare", "fright", "peur", "effr", "angoiss", "craint", "terreur", "paniq"],
    // surprise
    &["surpris", "astonish", "startl", "stun", "amaz", "sudden", "étonn", "soudain", "stupé"],
    // sadness
    &["sad", "sorrow", "grief", "griev", "weep", "wept", "mourn", "melanchol", "trist", "chagrin", "larme", "pleur", "deuil"],
    // disgust
    &["disgust", "revolt", "nause", "repuls", "sicken", "dégoût", "écœur", "répugn"],
    // anger
    &["anger", "angry", "rage", "furi", "fury", "wrath", "irrit", "colère", "fureur", "enrag"],
    // anticipation
    &["anticip", "expect", "await", "eager", "hope", "espoir", "espér", "impatien", "guett"],
    // love
    &["lov", "ador", "belov", "tender", "cherish", "amour", "aime", "aimer", "chéri"],
    // submission
    &["submit", "submiss", "obey", "yield", "surrend", "resign", "soumi", "soumet", "obéi", "résign"],
    // awe
    &["awe", "wonder", "marvel", "majest", "sublime", "émerveil", "grandios"],
    // disapproval
    &["disapprov", "reproach", "frown", "disappoint", "condemn", "désapprouv", "reproch", "déçu", "décept"],
    // remorse
    &["remorse", "regret", "guilt", "ashamed", "shame", "repent", "remords", "culpab", "honte"],
    // contempt
    &["contempt", "scorn", "disdain", "sneer", "mépris", "dédain"],
];

/// Keyword hit counts for one span of text
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EmotionProfile {
    /// Hits per emotion, in `EMOTION_LABELS` order
    pub counts: [usize; 14],
    pub word_count: usize,
}

impl EmotionProfile {
    pub fn total_hits(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Most frequent emotion; ties go to the earlier label
    pub fn dominant(&self) -> Option<&'static str> {
        let mut best: Option<(usize, usize)> = None;
        for (i, &count) in self.counts.iter().enumerate() {
            if count > 0 && best.map_or(true, |(_, c)| count > c) {
                best = Some((i, count));
            }
        }
        best.map(|(i, _)| EMOTION_LABELS[i])
    }

    /// Hit-weighted mean valence; 0 without hits
    pub fn valence(&self) -> f64 {
        let total = self.total_hits();
        if total == 0 {
            return 0.0;
        }
        let sum: f64 = self
            .counts
            .iter()
            .zip(EMOTION_LABELS)
            .map(|(&c, label)| c as f64 * canonical_valence(label))
            .sum();
        sum / total as f64
    }

    /// Hit share per emotion, in `EMOTION_LABELS` order
    pub fn distribution(&self) -> [f64; 14] {
        let total = self.total_hits();
        let mut out = [0.0; 14];
        if total > 0 {
            for (slot, &c) in out.iter_mut().zip(&self.counts) {
                *slot = c as f64 / total as f64;
            }
        }
        out
    }

    pub fn merge(&mut self, other: &EmotionProfile) {
        for (a, b) in self.counts.iter_mut().zip(&other.counts) {
            *a += b;
        }
        self.word_count += other.word_count;
    }
}

/// Count emotion keyword hits in `text`
pub fn emotion_profile(text: &str) -> EmotionProfile {
    let tokens = words(text);
    let mut profile = EmotionProfile {
        counts: [0; 14],
        word_count: tokens.len(),
    };
    for word in &tokens {
        for (i, stems) in EMOTION_STEMS.iter().enumerate() {
            if stems.iter().any(|stem| word.starts_with(stem)) {
                profile.counts[i] += 1;
            }
        }
    }
    profile
}

/// Whether a word carries any emotion stem
pub fn is_emotion_word(word: &str) -> bool {
    let lower = word.to_lowercase();
    EMOTION_STEMS
        .iter()
        .any(|stems| stems.iter().any(|stem| lower.starts_with(stem)))
}

/// Y = min(100, hits / words × 100 × gain)
pub fn intensity_of(profile: &EmotionProfile, gain: f64) -> f64 {
    if profile.word_count == 0 {
        return 0.0;
    }
    let density = profile.total_hits() as f64 / profile.word_count as f64;
    (density * crate::INTENSITY_MAX * gain).min(crate::INTENSITY_MAX)
}

/// One `OmegaState` per paragraph.
///
/// Load accumulates injected intensity: Z_i = min(C, Z_{i-1} + g × max(Y_i − Y_{i-1}, 0))
/// with Y_{-1} = 0 and g = `saturation_gain`.
pub fn extract_states(prose: &str, config: &SovereignConfig) -> Vec<OmegaState> {
    let mut states = Vec::new();
    let mut prev_y = 0.0;
    let mut z = 0.0_f64;

    for paragraph in split_paragraphs(prose) {
        let profile = emotion_profile(paragraph);
        let y = intensity_of(&profile, config.intensity_gain);
        z = (z + config.saturation_gain * (y - prev_y).max(0.0)).min(config.saturation_capacity);
        prev_y = y;

        let state = match profile.dominant() {
            Some(label) => OmegaState::new(y, z, label).with_valence(profile.valence()),
            None => OmegaState::new(y, z, FALLBACK_EMOTION).with_valence(0.0),
        };
        states.push(state);
    }
    states
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_counts_en_and_fr() {
        let p = emotion_profile("Fear crawled in. La peur montait, and she was afraid.");
        assert_eq!(p.counts[2], 3);
        assert_eq!(p.dominant(), Some("fear"));
        assert!(p.valence() < 0.0);
    }

    #[test]
    fn test_tie_goes_to_earlier_label() {
        let p = emotion_profile("joy and fear");
        assert_eq!(p.dominant(), Some("joy"));
    }

    #[test]
    fn test_no_hits_falls_back() {
        let config = SovereignConfig::default();
        let states = extract_states("The table stood by the window.", &config);
        assert_eq!(states.len(), 1);
        assert_eq!(states[0].dominant, FALLBACK_EMOTION);
        assert_eq!(states[0].intensity, 0.0);
        assert_eq!(states[0].valence, 0.0);
    }

    #[test]
    fn test_empty_prose_has_no_states() {
        assert!(extract_states("", &SovereignConfig::default()).is_empty());
    }

    #[test]
    fn test_saturation_accumulates_and_caps() {
        let config = SovereignConfig::default();
        let prose = "Rage. Fury.\n\nCalm room.\n\nRage rage rage.";
        let states = extract_states(prose, &config);
        assert_eq!(states.len(), 3);
        assert_eq!(states[0].intensity, 100.0);
        assert_eq!(states[0].saturation, 50.0);
        assert_eq!(states[1].saturation, 50.0);
        assert_eq!(states[2].saturation, 100.0);
        for s in &states {
            assert!(s.saturation <= config.saturation_capacity);
        }
    }

    #[test]
    fn test_intensity_capped() {
        let p = emotion_profile("joy joy joy");
        assert_eq!(intensity_of(&p, 8.0), 100.0);
        assert_eq!(intensity_of(&EmotionProfile::default(), 8.0), 0.0);
    }
}
