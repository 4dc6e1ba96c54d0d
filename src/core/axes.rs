//! CALC axis scorers
//!
//! Nine independent scorers, each `score(packet, prose) -> AxisScore` in
//! [0, 100]. None depends on another's output; all are pure.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use lazy_static::lazy_static;

use crate::core::emotion_text::{emotion_profile, extract_states, is_emotion_word, EmotionProfile};
use crate::core::feasibility::FeasibilityPolicy;
use crate::core::text::{split_paragraphs, split_sentences, word_count, words};
use crate::core::trajectory::TrajectoryAnalyzer;
use crate::types::{
    AxesScores, AxisDetails, AxisName, AxisScore, EmotionPhysicsTable, LawComplianceReport,
    NarrativePlan, ScenePacket, ScoringMethod, SovereignConfig, EMOTION_LABELS,
};

/// Rhythm peaks when the sentence-length coefficient of variation hits this
const RHYTHM_TARGET_CV: f64 = 0.65;

/// Rhythm score when there are fewer than two sentences to compare
const RHYTHM_NEUTRAL: f64 = 60.0;

lazy_static! {
    static ref INTERIORITY_MARKERS: Vec<&'static str> = vec![
        // en
        "thought", "think", "wonder", "remember", "realiz", "realis", "knew", "know",
        "felt", "feel", "wish", "imagin", "suppos", "doubt", "perhaps", "maybe",
        "herself", "himself", "myself", "mind", "memor",
        // fr
        "pensa", "pensait", "pense", "songe", "souvenir", "sentit", "sentait", "savait",
        "comprit", "comprenait", "peut-être", "esprit", "doute", "demanda",
    ];

    static ref SENSORY_MARKERS: Vec<&'static str> = vec![
        // en
        "smell", "scent", "odor", "odour", "stench", "taste", "bitter", "sweet", "salt",
        "sour", "cold", "warm", "hot", "rough", "smooth", "soft", "sharp", "sound",
        "noise", "hum", "whisper", "creak", "echo", "light", "shadow", "glow", "bright",
        "dark", "gleam", "red", "grey", "gray", "rust", "metal", "damp", "wet", "dust",
        "smoke", "ash",
        // fr
        "odeur", "parfum", "goût", "amer", "sucré", "froid", "chaud", "rugueux", "doux",
        "bruit", "murmure", "grince", "écho", "lumière", "ombre", "lueur", "sombre",
        "rouge", "gris", "rouille", "humide", "poussière", "fumée", "cendre",
    ];

    static ref CLICHE_KILL_LIST: Vec<&'static str> = vec![
        // en
        "heart pounded", "heart raced", "blood ran cold", "shiver down", "time stood still",
        "in the blink of an eye", "let out a breath", "didn't know she was holding",
        "didn't know he was holding", "all hell broke loose", "at the end of the day",
        "deafening silence", "a wave of", "butterflies in her stomach",
        // fr
        "le cœur battant", "un frisson parcourut", "le temps s'arrêta", "en un clin d'œil",
        "le sang se glaça", "un silence de mort", "une vague de",
    ];
}

/// Exact match, or prefix match for markers of five bytes or more
fn matches_marker(word: &str, markers: &[&str]) -> bool {
    markers
        .iter()
        .any(|m| word == *m || (m.len() >= 5 && word.starts_with(m)))
}

fn density_per_100(hits: usize, total_words: usize) -> f64 {
    if total_words == 0 {
        0.0
    } else {
        hits as f64 * 100.0 / total_words as f64
    }
}

/// Independent scorer for one axis
pub trait AxisScorer: Send + Sync + std::fmt::Debug {
    fn axis(&self) -> AxisName;

    fn score(&self, packet: &ScenePacket, prose: &str) -> AxisScore;
}

fn empty_prose(axis: AxisName) -> AxisScore {
    AxisScore::pure(axis, 0.0, "empty prose")
}

// =============================================================================
// EMOTION AXES
// =============================================================================

/// Quartile emotion distribution vs the packet's target curve
#[derive(Debug, Default)]
pub struct TensionScorer;

impl TensionScorer {
    fn cosine(a: &[f64; 14], b: &[f64; 14]) -> f64 {
        let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
        let na = a.iter().map(|x| x * x).sum::<f64>().sqrt();
        let nb = b.iter().map(|x| x * x).sum::<f64>().sqrt();
        if na == 0.0 || nb == 0.0 {
            0.0
        } else {
            (dot / (na * nb)).clamp(0.0, 1.0)
        }
    }
}

impl AxisScorer for TensionScorer {
    fn axis(&self) -> AxisName {
        AxisName::Tension
    }

    fn score(&self, packet: &ScenePacket, prose: &str) -> AxisScore {
        let paragraphs = split_paragraphs(prose);
        if paragraphs.is_empty() {
            return empty_prose(self.axis());
        }

        let n = paragraphs.len();
        let mut quartiles: [Option<EmotionProfile>; 4] = Default::default();
        for (i, paragraph) in paragraphs.iter().enumerate() {
            let q = i * 4 / n;
            quartiles[q]
                .get_or_insert_with(EmotionProfile::default)
                .merge(&emotion_profile(paragraph));
        }

        let mut sims = Vec::new();
        for (q, profile) in quartiles.iter().enumerate() {
            let Some(profile) = profile else { continue };
            let mut target = [0.0; 14];
            if let Some(quartile) = packet.emotion_curve.get(q) {
                for (slot, label) in target.iter_mut().zip(EMOTION_LABELS) {
                    *slot = quartile.target.get(label).copied().unwrap_or(0.0);
                }
            }
            sims.push(Self::cosine(&profile.distribution(), &target));
        }

        let mean = sims.iter().sum::<f64>() / sims.len() as f64;
        AxisScore::pure(
            self.axis(),
            100.0 * mean,
            format!("mean quartile cosine {:.3} over {} quartiles", mean, sims.len()),
        )
    }
}

/// Interior-monologue marker density
#[derive(Debug, Default)]
pub struct InteriorityScorer;

impl AxisScorer for InteriorityScorer {
    fn axis(&self) -> AxisName {
        AxisName::Interiority
    }

    fn score(&self, _packet: &ScenePacket, prose: &str) -> AxisScore {
        let tokens = words(prose);
        if tokens.is_empty() {
            return empty_prose(self.axis());
        }
        let hits = tokens
            .iter()
            .filter(|w| matches_marker(w.as_str(), INTERIORITY_MARKERS.as_slice()))
            .count();
        let density = density_per_100(hits, tokens.len());
        let score = match density {
            d if d >= 5.0 => 95.0,
            d if d >= 3.0 => 85.0,
            d if d >= 2.0 => 72.0,
            d if d >= 1.0 => 58.0,
            d if d > 0.0 => 45.0,
            _ => 25.0,
        };
        AxisScore::pure(self.axis(), score, format!("{hits} markers, {density:.2}/100 words"))
    }
}

/// Opening and closing sentence heuristics
#[derive(Debug, Default)]
pub struct ImpactScorer;

impl ImpactScorer {
    fn charged(sentence: &str) -> bool {
        words(sentence)
            .iter()
            .any(|w| is_emotion_word(w) || matches_marker(w.as_str(), SENSORY_MARKERS.as_slice()))
    }
}

impl AxisScorer for ImpactScorer {
    fn axis(&self) -> AxisName {
        AxisName::Impact
    }

    fn score(&self, _packet: &ScenePacket, prose: &str) -> AxisScore {
        let sentences = split_sentences(prose);
        let (Some(first), Some(last)) = (sentences.first(), sentences.last()) else {
            return empty_prose(self.axis());
        };

        let mut opening = 0.0;
        if word_count(first) <= 15 {
            opening += 0.5;
        }
        if Self::charged(first) {
            opening += 0.5;
        }

        let mut closing = 0.0;
        if Self::charged(last) {
            closing += 0.5;
        }
        let lower = last.to_lowercase();
        if word_count(last) <= 25 && !CLICHE_KILL_LIST.iter().any(|c| lower.contains(c)) {
            closing += 0.5;
        }

        let score = 30.0 + 70.0 * (0.5 * opening + 0.5 * closing);
        AxisScore::pure(
            self.axis(),
            score,
            format!("opening {opening:.1}, closing {closing:.1}"),
        )
    }
}

/// Physics-backed axis: 100 × overall law compliance
#[derive(Debug, Clone)]
pub struct EmotionCoherenceScorer {
    config: Arc<SovereignConfig>,
    physics: Arc<EmotionPhysicsTable>,
    policy: Arc<dyn FeasibilityPolicy>,
}

impl EmotionCoherenceScorer {
    pub fn new(
        config: Arc<SovereignConfig>,
        physics: Arc<EmotionPhysicsTable>,
        policy: Arc<dyn FeasibilityPolicy>,
    ) -> Self {
        Self {
            config,
            physics,
            policy,
        }
    }

    /// Full law compliance report for `prose`
    pub fn report(&self, packet: &ScenePacket, prose: &str) -> LawComplianceReport {
        let states = extract_states(prose, &self.config);
        let plan = NarrativePlan::new(&packet.beats, states.len());
        TrajectoryAnalyzer::new(&self.config, &self.physics, self.policy.as_ref())
            .analyze(&states, &plan)
    }
}

impl AxisScorer for EmotionCoherenceScorer {
    fn axis(&self) -> AxisName {
        AxisName::EmotionCoherence
    }

    fn score(&self, packet: &ScenePacket, prose: &str) -> AxisScore {
        let report = self.report(packet, prose);
        AxisScore::new(
            self.axis(),
            100.0 * report.overall_compliance,
            ScoringMethod::Pure,
            AxisDetails::Physics(Box::new(report)),
        )
    }
}

// =============================================================================
// CRAFT AXES
// =============================================================================

/// Sensory markers per 100 words against the packet target
#[derive(Debug, Default)]
pub struct SensoryDensityScorer;

impl AxisScorer for SensoryDensityScorer {
    fn axis(&self) -> AxisName {
        AxisName::SensoryDensity
    }

    fn score(&self, packet: &ScenePacket, prose: &str) -> AxisScore {
        let tokens = words(prose);
        if tokens.is_empty() {
            return empty_prose(self.axis());
        }
        let hits = tokens
            .iter()
            .filter(|w| matches_marker(w.as_str(), SENSORY_MARKERS.as_slice()))
            .count();
        let density = density_per_100(hits, tokens.len());
        let target = packet.style.sensory_density_target;
        let ratio = if target > 0.0 { density / target } else { 0.0 };
        AxisScore::pure(
            self.axis(),
            100.0 * ratio.min(1.0),
            format!("{density:.2}/100 words vs target {target:.2}"),
        )
    }
}

/// Redundancy: share of repeated word trigrams
#[derive(Debug, Default)]
pub struct NecessityScorer;

impl NecessityScorer {
    pub fn redundancy_ratio(tokens: &[String]) -> f64 {
        if tokens.len() < 3 {
            return 0.0;
        }
        let mut seen: HashMap<(&str, &str, &str), usize> = HashMap::new();
        for w in tokens.windows(3) {
            *seen
                .entry((w[0].as_str(), w[1].as_str(), w[2].as_str()))
                .or_insert(0) += 1;
        }
        let total = tokens.len() - 2;
        let repeated = total - seen.len();
        repeated as f64 / total as f64
    }
}

impl AxisScorer for NecessityScorer {
    fn axis(&self) -> AxisName {
        AxisName::Necessity
    }

    fn score(&self, _packet: &ScenePacket, prose: &str) -> AxisScore {
        let tokens = words(prose);
        if tokens.is_empty() {
            return empty_prose(self.axis());
        }
        let ratio = Self::redundancy_ratio(&tokens);
        let score = if ratio == 0.0 {
            100.0
        } else if ratio < 0.02 {
            85.0
        } else if ratio < 0.05 {
            65.0
        } else if ratio < 0.10 {
            40.0
        } else {
            20.0
        };
        AxisScore::pure(self.axis(), score, format!("redundancy ratio {ratio:.4}"))
    }
}

/// Kill-list and banned-word matches per sentence
#[derive(Debug, Default)]
pub struct AntiClicheScorer;

impl AxisScorer for AntiClicheScorer {
    fn axis(&self) -> AxisName {
        AxisName::AntiCliche
    }

    fn score(&self, packet: &ScenePacket, prose: &str) -> AxisScore {
        let sentences = split_sentences(prose);
        if sentences.is_empty() {
            return empty_prose(self.axis());
        }

        let packet_cliches: Vec<String> = packet
            .style
            .banned_cliches
            .iter()
            .map(|c| c.to_lowercase())
            .filter(|c| !c.trim().is_empty())
            .collect();
        let banned: BTreeSet<String> = packet
            .style
            .banned_words
            .iter()
            .map(|w| w.to_lowercase())
            .collect();

        let mut matches = 0usize;
        for sentence in &sentences {
            let lower = sentence.to_lowercase();
            matches += CLICHE_KILL_LIST.iter().filter(|c| lower.contains(*c)).count();
            matches += packet_cliches.iter().filter(|c| lower.contains(c.as_str())).count();
            matches += words(sentence).iter().filter(|w| banned.contains(*w)).count();
        }

        let ratio = matches as f64 / sentences.len() as f64;
        AxisScore::pure(
            self.axis(),
            100.0 * (1.0 - ratio).max(0.0),
            format!("{matches} matches over {} sentences", sentences.len()),
        )
    }
}

/// Sentence-length variation
#[derive(Debug, Default)]
pub struct RhythmScorer;

impl AxisScorer for RhythmScorer {
    fn axis(&self) -> AxisName {
        AxisName::Rhythm
    }

    fn score(&self, _packet: &ScenePacket, prose: &str) -> AxisScore {
        let sentences = split_sentences(prose);
        if sentences.is_empty() {
            return empty_prose(self.axis());
        }
        if sentences.len() < 2 {
            return AxisScore::pure(self.axis(), RHYTHM_NEUTRAL, "single sentence");
        }

        let lengths: Vec<f64> = sentences.iter().map(|s| word_count(s) as f64).collect();
        let n = lengths.len() as f64;
        let mean = lengths.iter().sum::<f64>() / n;
        let variance = lengths.iter().map(|l| (l - mean).powi(2)).sum::<f64>() / n;
        let cv = if mean > 0.0 { variance.sqrt() / mean } else { 0.0 };
        let score = 100.0 * (1.0 - (cv - RHYTHM_TARGET_CV).abs() / RHYTHM_TARGET_CV).max(0.0);
        AxisScore::pure(self.axis(), score, format!("length cv {cv:.3}"))
    }
}

/// Share of signature words present
#[derive(Debug, Default)]
pub struct SignatureScorer;

impl AxisScorer for SignatureScorer {
    fn axis(&self) -> AxisName {
        AxisName::Signature
    }

    fn score(&self, packet: &ScenePacket, prose: &str) -> AxisScore {
        let tokens = words(prose);
        if tokens.is_empty() {
            return empty_prose(self.axis());
        }
        let signature: Vec<String> = packet
            .style
            .signature_words
            .iter()
            .map(|w| w.trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        if signature.is_empty() {
            return AxisScore::pure(self.axis(), 100.0, "no signature words configured");
        }

        let present: BTreeSet<&str> = tokens.iter().map(String::as_str).collect();
        let lower = prose.to_lowercase();
        let hits = signature
            .iter()
            .filter(|w| {
                if w.contains(char::is_whitespace) {
                    lower.contains(w.as_str())
                } else {
                    present.contains(w.as_str())
                }
            })
            .count();
        AxisScore::pure(
            self.axis(),
            100.0 * hits as f64 / signature.len() as f64,
            format!("{hits}/{} signature words", signature.len()),
        )
    }
}

// =============================================================================
// CALC JUDGE
// =============================================================================

/// All nine CALC scorers. Pure: no clock, no randomness.
#[derive(Debug)]
pub struct CalcJudge {
    /// Indexed by `AxisName::index()`
    scorers: Vec<Box<dyn AxisScorer>>,
    coherence: EmotionCoherenceScorer,
}

impl CalcJudge {
    pub fn new(
        config: Arc<SovereignConfig>,
        physics: Arc<EmotionPhysicsTable>,
        policy: Arc<dyn FeasibilityPolicy>,
    ) -> Self {
        let coherence = EmotionCoherenceScorer::new(config, physics, policy);
        let scorers: Vec<Box<dyn AxisScorer>> = AxisName::ALL
            .iter()
            .map(|axis| -> Box<dyn AxisScorer> {
                match axis {
                    AxisName::Interiority => Box::new(InteriorityScorer),
                    AxisName::Tension => Box::new(TensionScorer),
                    AxisName::SensoryDensity => Box::new(SensoryDensityScorer),
                    AxisName::Necessity => Box::new(NecessityScorer),
                    AxisName::AntiCliche => Box::new(AntiClicheScorer),
                    AxisName::Rhythm => Box::new(RhythmScorer),
                    AxisName::Signature => Box::new(SignatureScorer),
                    AxisName::Impact => Box::new(ImpactScorer),
                    AxisName::EmotionCoherence => Box::new(coherence.clone()),
                }
            })
            .collect();
        Self { scorers, coherence }
    }

    pub fn score_axis(&self, axis: AxisName, packet: &ScenePacket, prose: &str) -> AxisScore {
        self.scorers[axis.index()].score(packet, prose)
    }

    pub fn judge(&self, packet: &ScenePacket, prose: &str) -> AxesScores {
        AxesScores::from_fn(|axis| self.score_axis(axis, packet, prose))
    }

    pub fn physics_report(&self, packet: &ScenePacket, prose: &str) -> LawComplianceReport {
        self.coherence.report(packet, prose)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::feasibility::BeatBudgetPolicy;
    use crate::types::{QuartileTarget, SceneIntent, StyleConstraints};
    use std::collections::BTreeMap;

    fn packet() -> ScenePacket {
        let quartile = |label: &str| QuartileTarget {
            target: BTreeMap::from([(label.to_string(), 1.0)]),
            valence: -0.5,
            arousal: 0.6,
            dominant: label.to_string(),
        };
        ScenePacket {
            packet_id: "p1".into(),
            scene_id: "s1".into(),
            language: Default::default(),
            intent: SceneIntent::default(),
            emotion_curve: vec![quartile("fear"), quartile("fear"), quartile("anger"), quartile("sadness")],
            beats: Vec::new(),
            style: StyleConstraints {
                signature_words: vec!["lantern".into(), "salt".into()],
                banned_cliches: vec!["dark and stormy".into()],
                banned_words: vec!["suddenly".into()],
                sensory_density_target: 4.0,
            },
            canon: Vec::new(),
            continuity: Default::default(),
            seed: "seed".into(),
        }
    }

    fn judge() -> CalcJudge {
        CalcJudge::new(
            Arc::new(SovereignConfig::default()),
            Arc::new(EmotionPhysicsTable::canonical()),
            Arc::new(BeatBudgetPolicy::default()),
        )
    }

    #[test]
    fn test_empty_prose_physics_axis_is_100() {
        let axes = judge().judge(&packet(), "");
        assert_eq!(axes.emotion_coherence.score, 100.0);
        assert_eq!(axes.physics_report().unwrap().overall_compliance, 1.0);
        assert_eq!(axes.tension.score, 0.0);
    }

    #[test]
    fn test_tension_matches_target() {
        let prose = "Fear.\n\nFear.\n\nRage.\n\nGrief.";
        let score = TensionScorer.score(&packet(), prose);
        assert!((score.score - 100.0).abs() < 1e-9);
        let off = TensionScorer.score(&packet(), "Joy.\n\nJoy.\n\nJoy.\n\nJoy.");
        assert_eq!(off.score, 0.0);
    }

    #[test]
    fn test_signature_hits() {
        let s = SignatureScorer.score(&packet(), "The lantern swung.");
        assert_eq!(s.score, 50.0);
    }

    #[test]
    fn test_anti_cliche() {
        let clean = AntiClicheScorer.score(&packet(), "She counted the nails. The door held.");
        assert_eq!(clean.score, 100.0);
        let dirty = AntiClicheScorer.score(
            &packet(),
            "Her heart pounded. Suddenly the door opened.",
        );
        assert_eq!(dirty.score, 0.0);
    }

    #[test]
    fn test_necessity_redundancy() {
        let once = words("the cat sat on the mat");
        assert_eq!(NecessityScorer::redundancy_ratio(&once), 0.0);
        let twice = words("the cat sat the cat sat");
        assert!(NecessityScorer::redundancy_ratio(&twice) > 0.1);
        assert_eq!(NecessityScorer.score(&packet(), "the cat sat the cat sat").score, 20.0);
    }

    #[test]
    fn test_rhythm() {
        assert_eq!(RhythmScorer.score(&packet(), "One sentence only.").score, RHYTHM_NEUTRAL);
        let flat = RhythmScorer.score(&packet(), "Two words. Two words. Two words.");
        assert_eq!(flat.score, 0.0);
    }

    #[test]
    fn test_interiority_tiers() {
        let none = InteriorityScorer.score(&packet(), "The door opened.");
        assert_eq!(none.score, 25.0);
        let dense = InteriorityScorer.score(&packet(), "She thought and wondered. She remembered.");
        assert_eq!(dense.score, 95.0);
    }

    #[test]
    fn test_sensory_capped_at_target() {
        let s = SensoryDensityScorer.score(&packet(), "Cold smoke and salt.");
        assert_eq!(s.score, 100.0);
    }

    #[test]
    fn test_judge_is_deterministic() {
        let prose = "Fear crept in.\n\nShe thought of the cold lantern.\n\nRage.";
        let j = judge();
        assert_eq!(j.judge(&packet(), prose), j.judge(&packet(), prose));
    }
}
