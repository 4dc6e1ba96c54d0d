//! Trajectory analyzer: applies the compliance laws to a paragraph sequence
//!
//! Transitions (Inertia + Feasibility) drive `overall_compliance`. Decay
//! segments (Law 4) and flux (Law 5) are reported alongside it.

use tracing::{debug, warn};

use crate::core::feasibility::FeasibilityPolicy;
use crate::core::hash::hash_record;
use crate::core::physics::{analyze_decay_segment, check_inertia, compute_flux_conservation};
use crate::types::{
    EmotionPhysicsTable, EmotionTransition, FeasibilityCheck, LawComplianceReport,
    NarrativeBeat, NarrativePlan, OmegaState, OrganicDecayAnalysis, SovereignConfig,
};

/// Narrative force behind a transition.
///
/// ambient + base_force(kind) × intensity × scale, halved when the beat's
/// polarity runs against the observed change.
pub fn narrative_force(
    config: &SovereignConfig,
    beat: Option<&NarrativeBeat>,
    intensity_delta: f64,
) -> f64 {
    let beat_force = beat.map_or(0.0, |b| {
        let raw = b.kind.base_force() * b.intensity.clamp(0.0, 1.0) * config.beat_force_scale;
        if b.polarity.opposes(intensity_delta) {
            raw / 2.0
        } else {
            raw
        }
    });
    config.ambient_force + beat_force
}

/// Resistance of a change: |ΔY| / 100 + |Δvalence| / 2
pub fn resistance(intensity_delta: f64, valence_delta: f64) -> f64 {
    intensity_delta.abs() / crate::INTENSITY_MAX + valence_delta.abs() / 2.0
}

/// Segment boundaries `[start, end]` (inclusive); a rise above the spike
/// threshold opens a new segment.
pub fn decay_segments(states: &[OmegaState], spike_threshold: f64) -> Vec<(usize, usize)> {
    if states.is_empty() {
        return Vec::new();
    }
    let mut segments = Vec::new();
    let mut start = 0;
    for i in 1..states.len() {
        if states[i].intensity - states[i - 1].intensity > spike_threshold {
            segments.push((start, i - 1));
            start = i;
        }
    }
    segments.push((start, states.len() - 1));
    segments
}

#[derive(Debug, Clone, Copy)]
pub struct TrajectoryAnalyzer<'a> {
    config: &'a SovereignConfig,
    physics: &'a EmotionPhysicsTable,
    policy: &'a dyn FeasibilityPolicy,
}

impl<'a> TrajectoryAnalyzer<'a> {
    pub fn new(
        config: &'a SovereignConfig,
        physics: &'a EmotionPhysicsTable,
        policy: &'a dyn FeasibilityPolicy,
    ) -> Self {
        Self {
            config,
            physics,
            policy,
        }
    }

    /// Run every law over `states`
    pub fn analyze(&self, states: &[OmegaState], plan: &NarrativePlan<'_>) -> LawComplianceReport {
        let transitions: Vec<EmotionTransition> = states
            .windows(2)
            .enumerate()
            .map(|(i, pair)| self.transition(i, &pair[0], &pair[1], plan.beat_for_transition(i + 1)))
            .collect();

        let decay_segments: Vec<OrganicDecayAnalysis> =
            decay_segments(states, self.config.spike_threshold)
                .into_iter()
                .filter(|(start, end)| end > start)
                .map(|(start, end)| self.decay(states, start, end))
                .collect();

        let flux = compute_flux_conservation(
            states,
            self.physics,
            self.config.saturation_capacity,
            self.config.flux_tolerance,
        );

        let forced_transitions = transitions.iter().filter(|t| t.forced_transition).count();
        let feasibility_failures = transitions.iter().filter(|t| t.feasibility_fail).count();
        let law4_violations = decay_segments.iter().filter(|d| !d.compliant).count();
        let overall_compliance = if transitions.is_empty() {
            1.0
        } else {
            let ok = transitions.iter().filter(|t| t.is_compliant()).count();
            ok as f64 / transitions.len() as f64
        };

        debug!(
            paragraphs = states.len(),
            forced_transitions,
            feasibility_failures,
            law4_violations,
            overall_compliance,
            "trajectory analyzed"
        );

        let mut report = LawComplianceReport {
            paragraph_count: states.len(),
            transitions,
            decay_segments,
            flux,
            forced_transitions,
            feasibility_failures,
            law4_violations,
            overall_compliance,
            content_hash: String::new(),
        };
        report.content_hash = hash_record(&report);
        report
    }

    fn transition(
        &self,
        from_index: usize,
        from: &OmegaState,
        to: &OmegaState,
        beat: Option<&NarrativeBeat>,
    ) -> EmotionTransition {
        let intensity_delta = to.intensity - from.intensity;
        let valence_delta = to.valence - from.valence;
        let force = narrative_force(self.config, beat, intensity_delta);
        let resistance = resistance(intensity_delta, valence_delta);

        let (inertia, feasibility) = match self.physics.get(&from.dominant) {
            Some(p) if p.is_valid() => (
                check_inertia(force, p.mass, resistance),
                self.policy.check(beat, from, to),
            ),
            other => {
                warn!(
                    emotion = %from.dominant,
                    missing = other.is_none(),
                    "unusable physics constants, transition fails closed"
                );
                (
                    check_inertia(force, 0.0, resistance),
                    FeasibilityCheck::infeasible(format!(
                        "no usable physics for '{}'",
                        from.dominant
                    )),
                )
            }
        };

        EmotionTransition {
            from_index,
            from: from.clone(),
            to: to.clone(),
            beat_id: beat.map(|b| b.beat_id.clone()),
            intensity_delta,
            valence_delta,
            forced_transition: inertia.forced,
            feasibility_fail: !feasibility.feasible,
            inertia,
            feasibility,
        }
    }

    fn decay(&self, states: &[OmegaState], start: usize, end: usize) -> OrganicDecayAnalysis {
        let segment = &states[start..=end];
        let emotion = segment[0].dominant.clone();
        let actual: Vec<f64> = segment.iter().map(|s| s.intensity).collect();
        let saturation: Vec<f64> = segment.iter().map(|s| s.saturation).collect();

        let analysis = match self.physics.get(&emotion) {
            Some(p) => analyze_decay_segment(
                &actual,
                p,
                &saturation,
                self.config.saturation_capacity,
                self.config.decay_tolerance,
            ),
            None => {
                warn!(emotion = %emotion, "missing physics constants, decay segment fails closed");
                OrganicDecayAnalysis {
                    start: 0,
                    end: 0,
                    emotion: String::new(),
                    regime: None,
                    actual,
                    theoretical: Vec::new(),
                    deviation: None,
                    tolerance: self.config.decay_tolerance,
                    compliant: false,
                }
            }
        };

        OrganicDecayAnalysis {
            start,
            end,
            emotion,
            ..analysis
        }
    }
}
