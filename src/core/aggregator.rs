//! S-Score aggregator
//!
//! Composite = Σ(score·weight) / Σ(weight). Verdict, in order:
//! 1. any axis < AXIS_FLOOR_EXCLUSIVE (50) → REJECT
//! 2. composite ≥ SOVEREIGN_THRESHOLD (within COMPOSITE_EPSILON) → SEAL
//! 3. otherwise REJECT

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::core::hash::hash_record;
use crate::types::{AxesScores, AxisName, SScoreResult, Verdict};
use crate::{COMPOSITE_EPSILON, SOVEREIGN_THRESHOLD};

/// Share of total axis weight on emotion-category axes, in percent
pub fn emotion_weight_pct() -> f64 {
    let total: f64 = AxisName::ALL.iter().map(|a| a.weight()).sum();
    let emotion: f64 = AxisName::ALL
        .iter()
        .filter(|a| a.is_emotion())
        .map(|a| a.weight())
        .sum();
    100.0 * emotion / total
}

/// Weight-normalized sum of axis scores, in [0, 100]
pub fn compute_composite(axes: &AxesScores) -> f64 {
    let (weighted, total) = axes
        .iter()
        .fold((0.0, 0.0), |(s, w), a| (s + a.score * a.weight, w + a.weight));
    if total <= 0.0 {
        return 0.0;
    }
    (weighted / total).clamp(0.0, 100.0)
}

pub fn verdict_for(axes: &AxesScores, composite: f64) -> Verdict {
    if axes.iter().any(|a| a.below_floor()) {
        Verdict::Reject
    } else if composite >= SOVEREIGN_THRESHOLD - COMPOSITE_EPSILON {
        Verdict::Seal
    } else {
        Verdict::Reject
    }
}

#[derive(Serialize)]
struct HashedFields<'a> {
    axes: &'a AxesScores,
    composite: f64,
    emotion_weight_pct: f64,
    verdict: Verdict,
}

/// Content hash of a result; `scored_at` is excluded
pub fn sscore_hash(result: &SScoreResult) -> String {
    hash_record(&HashedFields {
        axes: &result.axes,
        composite: result.composite,
        emotion_weight_pct: result.emotion_weight_pct,
        verdict: result.verdict,
    })
}

/// Aggregate with an explicit timestamp
pub fn compute_sscore_at(axes: AxesScores, scored_at: DateTime<Utc>) -> SScoreResult {
    let composite = compute_composite(&axes);
    let verdict = verdict_for(&axes, composite);
    let mut result = SScoreResult {
        axes,
        composite,
        emotion_weight_pct: emotion_weight_pct(),
        verdict,
        content_hash: String::new(),
        scored_at,
    };
    result.content_hash = sscore_hash(&result);
    result
}

pub fn compute_sscore(axes: AxesScores) -> SScoreResult {
    compute_sscore_at(axes, Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AxisScore;

    #[test]
    fn test_all_hundred_seals() {
        let r = compute_sscore(AxesScores::uniform(100.0));
        assert_eq!(r.composite, 100.0);
        assert_eq!(r.verdict, Verdict::Seal);
    }

    #[test]
    fn test_all_zero_rejects() {
        let r = compute_sscore(AxesScores::uniform(0.0));
        assert_eq!(r.composite, 0.0);
        assert_eq!(r.verdict, Verdict::Reject);
    }

    #[test]
    fn test_floor_overrides_composite() {
        for axis in AxisName::ALL {
            let axes = AxesScores::uniform(100.0).with(AxisScore::pure(axis, 49.0, "floor"));
            let r = compute_sscore(axes);
            assert!(r.composite > SOVEREIGN_THRESHOLD);
            assert_eq!(r.verdict, Verdict::Reject, "{axis} at floor must reject");
        }
    }

    #[test]
    fn test_floor_band() {
        let inside = AxesScores::uniform(100.0)
            .with(AxisScore::pure(AxisName::Rhythm, 49.5, "inside floor band"));
        assert_eq!(compute_sscore(inside).verdict, Verdict::Reject);

        let clear = AxesScores::uniform(100.0)
            .with(AxisScore::pure(AxisName::Rhythm, 50.0, "clear of floor"));
        assert_eq!(compute_sscore(clear).verdict, Verdict::Seal);
    }

    #[test]
    fn test_threshold_inclusive() {
        let at = compute_sscore(AxesScores::uniform(92.0));
        assert_eq!(at.composite, 92.0);
        assert_eq!(at.verdict, Verdict::Seal);

        let below = compute_sscore(AxesScores::uniform(91.999));
        assert!(below.composite < 92.0);
        assert_eq!(below.verdict, Verdict::Reject);
    }

    #[test]
    fn test_exact_threshold_from_decimal_scores_seals() {
        // weighted mean is exactly 92; the float sum lands just under it
        let scores = [93.5, 94.6, 88.0, 93.4, 92.4, 92.3, 93.4, 88.1, 91.8];
        let axes = AxisName::ALL
            .iter()
            .zip(scores)
            .fold(AxesScores::uniform(0.0), |acc, (&axis, s)| {
                acc.with(AxisScore::pure(axis, s, ""))
            });
        let r = compute_sscore(axes);
        assert!((r.composite - 92.0).abs() < 1e-9);
        assert_eq!(r.verdict, Verdict::Seal);
    }

    #[test]
    fn test_emotion_weight_share() {
        assert!((emotion_weight_pct() / 100.0 - 0.633).abs() < 0.001);
    }

    #[test]
    fn test_hash_ignores_timestamp() {
        let a = compute_sscore_at(AxesScores::uniform(80.0), DateTime::<Utc>::MIN_UTC);
        let b = compute_sscore(AxesScores::uniform(80.0));
        assert_eq!(a.content_hash, b.content_hash);
        let c = compute_sscore(AxesScores::uniform(81.0));
        assert_ne!(a.content_hash, c.content_hash);
    }
}
