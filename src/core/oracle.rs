//! Pitch oracle: deterministic strategy generation and ranking
//!
//! Score = 0.63 × emotion ops + 0.37 × craft ops. Arg-max, first wins ties.

use serde::Serialize;

use crate::core::hash::hash_record;
use crate::types::{
    AxisName, CorrectionOp, DeltaReport, OpCategory, OracleSelection, PitchStrategy,
};
use crate::{ORACLE_W_CRAFT, ORACLE_W_EMOTION};

pub const STRATEGY_EMOTIONAL_INTENSIFICATION: &str = "emotional_intensification";
pub const STRATEGY_STRUCTURAL_RUPTURE: &str = "structural_rupture";
pub const STRATEGY_COMPRESSION_MUSICALITY: &str = "compression_musicality";

/// Oracle score of one strategy
pub fn strategy_score(strategy: &PitchStrategy) -> f64 {
    ORACLE_W_EMOTION * strategy.count(OpCategory::Emotion) as f64
        + ORACLE_W_CRAFT * strategy.count(OpCategory::Craft) as f64
}

#[derive(Serialize)]
struct OracleInputs<'a> {
    candidates: Vec<&'a str>,
    delta_hash: &'a str,
    scores: &'a [f64],
    selected_index: usize,
}

/// Rank `candidates` and pick the best. `None` for an empty list.
pub fn select_best_strategy(
    candidates: &[PitchStrategy],
    delta: &DeltaReport,
) -> Option<OracleSelection> {
    let scores: Vec<f64> = candidates.iter().map(strategy_score).collect();
    let mut selected_index = None;
    for (i, &score) in scores.iter().enumerate() {
        match selected_index {
            Some(best) if scores[best] >= score => {}
            _ => selected_index = Some(i),
        }
    }
    let selected_index = selected_index?;

    let oracle_hash = hash_record(&OracleInputs {
        candidates: candidates.iter().map(|c| c.content_hash.as_str()).collect(),
        delta_hash: &delta.content_hash,
        scores: &scores,
        selected_index,
    });

    Some(OracleSelection {
        selected_index,
        scores,
        oracle_hash,
    })
}

/// Builds the three canonical strategies from a delta report
#[derive(Debug, Default, Clone, Copy)]
pub struct PitchOracle;

impl PitchOracle {
    pub fn new() -> Self {
        Self
    }

    /// Candidates in fixed order: intensification, rupture, compression
    pub fn candidates(&self, delta: &DeltaReport) -> Vec<PitchStrategy> {
        vec![
            self.emotional_intensification(delta),
            self.structural_rupture(delta),
            self.compression_musicality(delta),
        ]
    }

    fn emotional_intensification(&self, delta: &DeltaReport) -> PitchStrategy {
        let mut ops = vec![
            CorrectionOp::IncreaseInterioritySignal,
            CorrectionOp::ShiftEmotionRegister,
            CorrectionOp::DeepenClosing,
        ];
        if delta.forced_transitions + delta.feasibility_failures > 0 {
            ops.push(CorrectionOp::AddConsequenceLine);
        }
        PitchStrategy::new(
            STRATEGY_EMOTIONAL_INTENSIFICATION,
            ops,
            format!(
                "interiority gap {:.1}, tension gap {:.1}, {} unjustified transitions",
                delta.gap(AxisName::Interiority),
                delta.gap(AxisName::Tension),
                delta.forced_transitions + delta.feasibility_failures
            ),
        )
    }

    fn structural_rupture(&self, delta: &DeltaReport) -> PitchStrategy {
        let mut ops = vec![
            CorrectionOp::AddMicroRuptureEvent,
            CorrectionOp::InjectSilenceZone,
            CorrectionOp::SharpenOpening,
        ];
        if delta.gap(AxisName::Necessity) > 0.0 {
            ops.push(CorrectionOp::CompressExposition);
        }
        PitchStrategy::new(
            STRATEGY_STRUCTURAL_RUPTURE,
            ops,
            format!(
                "impact gap {:.1}, {} decay violations",
                delta.gap(AxisName::Impact),
                delta.law4_violations
            ),
        )
    }

    fn compression_musicality(&self, delta: &DeltaReport) -> PitchStrategy {
        let mut ops = vec![
            CorrectionOp::CompressExposition,
            CorrectionOp::TightenSentenceRhythm,
            CorrectionOp::ReplaceCliche,
        ];
        if delta.gap(AxisName::SensoryDensity) > 0.0 {
            ops.push(CorrectionOp::InjectSensoryDetail);
        }
        if delta.gap(AxisName::Signature) > 0.0 {
            ops.push(CorrectionOp::ReinforceSignature);
        }
        if delta.gap(AxisName::Rhythm) > 0.0 {
            ops.push(CorrectionOp::ConvertDialogueToIndirect);
        }
        PitchStrategy::new(
            STRATEGY_COMPRESSION_MUSICALITY,
            ops,
            format!(
                "rhythm gap {:.1}, anti-cliche gap {:.1}, sensory gap {:.1}",
                delta.gap(AxisName::Rhythm),
                delta.gap(AxisName::AntiCliche),
                delta.gap(AxisName::SensoryDensity)
            ),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::aggregator::compute_sscore;
    use crate::core::delta::build_delta_report;
    use crate::types::AxesScores;

    fn delta() -> DeltaReport {
        build_delta_report(&compute_sscore(AxesScores::uniform(70.0)))
    }

    #[test]
    fn test_scores() {
        let s = PitchStrategy::new(
            "mixed",
            vec![CorrectionOp::DeepenClosing, CorrectionOp::ReplaceCliche],
            "",
        );
        assert!((strategy_score(&s) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_candidates() {
        assert!(select_best_strategy(&[], &delta()).is_none());
    }

    #[test]
    fn test_tie_first_wins() {
        let a = PitchStrategy::new("a", vec![CorrectionOp::DeepenClosing], "");
        let b = PitchStrategy::new("b", vec![CorrectionOp::InjectSilenceZone], "");
        let sel = select_best_strategy(&[a, b], &delta()).unwrap();
        assert_eq!(sel.selected_index, 0);
    }

    #[test]
    fn test_every_op_has_one_category() {
        let emotion = CorrectionOp::ALL
            .iter()
            .filter(|op| op.category() == OpCategory::Emotion)
            .count();
        assert_eq!(emotion, 6);
        assert_eq!(CorrectionOp::ALL.len() - emotion, 7);
    }

    #[test]
    fn test_candidates_deterministic() {
        let oracle = PitchOracle::new();
        let d = delta();
        assert_eq!(oracle.candidates(&d), oracle.candidates(&d));
        let names: Vec<_> = oracle.candidates(&d).into_iter().map(|c| c.name).collect();
        assert_eq!(
            names,
            vec![
                STRATEGY_EMOTIONAL_INTENSIFICATION,
                STRATEGY_STRUCTURAL_RUPTURE,
                STRATEGY_COMPRESSION_MUSICALITY
            ]
        );
    }
}
