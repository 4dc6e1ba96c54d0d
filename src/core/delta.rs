//! Delta report builder

use crate::core::hash::hash_record;
use crate::types::{AxisGap, DeltaReport, SScoreResult};
use crate::SOVEREIGN_THRESHOLD;

/// Gaps between a scored result and SEAL
pub fn build_delta_report(result: &SScoreResult) -> DeltaReport {
    let axes = result
        .axes
        .iter()
        .map(|a| AxisGap {
            axis: a.name,
            score: a.score,
            gap: (SOVEREIGN_THRESHOLD - a.score).max(0.0),
            below_floor: a.below_floor(),
            emotion: a.name.is_emotion(),
        })
        .collect();

    let physics = result.axes.physics_report();
    let mut report = DeltaReport {
        source_hash: result.content_hash.clone(),
        composite: result.composite,
        composite_gap: (SOVEREIGN_THRESHOLD - result.composite).max(0.0),
        axes,
        forced_transitions: physics.map_or(0, |p| p.forced_transitions),
        feasibility_failures: physics.map_or(0, |p| p.feasibility_failures),
        law4_violations: physics.map_or(0, |p| p.law4_violations),
        flux_compliant: physics.map_or(true, |p| p.flux.compliant),
        content_hash: String::new(),
    };
    report.content_hash = hash_record(&report);
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::aggregator::compute_sscore;
    use crate::types::{AxesScores, AxisName, AxisScore};

    #[test]
    fn test_gaps() {
        let axes = AxesScores::uniform(95.0)
            .with(AxisScore::pure(AxisName::Rhythm, 40.0, "weak"))
            .with(AxisScore::pure(AxisName::Tension, 80.0, "meh"));
        let report = build_delta_report(&compute_sscore(axes));
        assert_eq!(report.gap(AxisName::Rhythm), 52.0);
        assert_eq!(report.gap(AxisName::Tension), 12.0);
        assert_eq!(report.gap(AxisName::Impact), 0.0);
        assert_eq!(report.weakest_axes(), vec![AxisName::Rhythm, AxisName::Tension]);
        assert!(report.axes.iter().any(|g| g.axis == AxisName::Rhythm && g.below_floor));
        assert_eq!(report.physics_violations(), 0);
    }

    #[test]
    fn test_hash_tracks_source() {
        let a = build_delta_report(&compute_sscore(AxesScores::uniform(70.0)));
        let b = build_delta_report(&compute_sscore(AxesScores::uniform(70.0)));
        let c = build_delta_report(&compute_sscore(AxesScores::uniform(71.0)));
        assert_eq!(a.content_hash, b.content_hash);
        assert_ne!(a.content_hash, c.content_hash);
    }
}
