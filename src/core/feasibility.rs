//! Feasibility law policies
//!
//! How much change a narrative beat can justify is a policy, not a constant
//! of the model. Analyzers take any `FeasibilityPolicy`; `BeatBudgetPolicy`
//! is the default.

use crate::types::{BeatKind, BeatPolarity, FeasibilityCheck, NarrativeBeat, OmegaState};

/// Decides whether a beat can plausibly cause a transition.
pub trait FeasibilityPolicy: Send + Sync + std::fmt::Debug {
    fn check(
        &self,
        beat: Option<&NarrativeBeat>,
        from: &OmegaState,
        to: &OmegaState,
    ) -> FeasibilityCheck;
}

/// Per-beat-kind intensity budget.
///
/// - |ΔY| ≤ budget, with budget = kind budget × (0.5 + 0.5 × beat intensity)
/// - |Δvalence| ≤ 2 × budget / 100
/// - a rising beat cannot justify a drop larger than budget / 2, and a
///   falling beat cannot justify a rise larger than budget / 2
#[derive(Debug, Clone, PartialEq)]
pub struct BeatBudgetPolicy {
    /// Budget when no beat covers the transition
    pub unbeaten_budget: f64,
}

impl Default for BeatBudgetPolicy {
    fn default() -> Self {
        Self {
            unbeaten_budget: 30.0,
        }
    }
}

impl BeatBudgetPolicy {
    /// Full-intensity intensity budget of a beat kind (Y units)
    pub fn kind_budget(kind: BeatKind) -> f64 {
        match kind {
            BeatKind::Description => 25.0,
            BeatKind::Reflection => 30.0,
            BeatKind::Dialogue => 40.0,
            BeatKind::Action => 55.0,
            BeatKind::Confrontation => 70.0,
            BeatKind::Revelation => 85.0,
            BeatKind::Rupture => 100.0,
        }
    }

    fn budget(&self, beat: Option<&NarrativeBeat>) -> f64 {
        match beat {
            Some(b) => Self::kind_budget(b.kind) * (0.5 + 0.5 * b.intensity.clamp(0.0, 1.0)),
            None => self.unbeaten_budget,
        }
    }
}

impl FeasibilityPolicy for BeatBudgetPolicy {
    fn check(
        &self,
        beat: Option<&NarrativeBeat>,
        from: &OmegaState,
        to: &OmegaState,
    ) -> FeasibilityCheck {
        let delta_y = to.intensity - from.intensity;
        let delta_v = to.valence - from.valence;
        if !delta_y.is_finite() || !delta_v.is_finite() {
            return FeasibilityCheck::infeasible("non-finite state delta");
        }

        let budget = self.budget(beat);
        let swing = 2.0 * budget / crate::INTENSITY_MAX;
        let polarity = beat.map(|b| b.polarity).unwrap_or_default();

        let detail = if delta_y.abs() > budget {
            Some(format!("|ΔY| {:.1} exceeds budget {:.1}", delta_y.abs(), budget))
        } else if delta_v.abs() > swing {
            Some(format!("|Δvalence| {:.2} exceeds swing {:.2}", delta_v.abs(), swing))
        } else if polarity == BeatPolarity::Rising && delta_y < -budget / 2.0 {
            Some(format!("rising beat cannot justify drop of {:.1}", -delta_y))
        } else if polarity == BeatPolarity::Falling && delta_y > budget / 2.0 {
            Some(format!("falling beat cannot justify rise of {:.1}", delta_y))
        } else {
            None
        };

        FeasibilityCheck {
            feasible: detail.is_none(),
            max_intensity_delta: budget,
            max_valence_swing: swing,
            detail: detail.unwrap_or_else(|| "within beat budget".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn beat(kind: BeatKind, intensity: f64, polarity: BeatPolarity) -> NarrativeBeat {
        NarrativeBeat {
            beat_id: "b1".into(),
            kind,
            intensity,
            polarity,
            paragraph: None,
        }
    }

    #[test]
    fn test_small_change_without_beat() {
        let policy = BeatBudgetPolicy::default();
        let check = policy.check(
            None,
            &OmegaState::new(20.0, 0.0, "joy"),
            &OmegaState::new(35.0, 0.0, "joy"),
        );
        assert!(check.feasible);
        assert_eq!(check.max_intensity_delta, 30.0);
    }

    #[test]
    fn test_large_jump_needs_strong_beat() {
        let policy = BeatBudgetPolicy::default();
        let from = OmegaState::new(10.0, 0.0, "trust");
        let to = OmegaState::new(80.0, 0.0, "fear");
        assert!(!policy.check(None, &from, &to).feasible);
        let rupture = beat(BeatKind::Rupture, 1.0, BeatPolarity::Rising);
        assert!(policy.check(Some(&rupture), &from, &to).feasible);
    }

    #[test]
    fn test_direction_rule() {
        let policy = BeatBudgetPolicy::default();
        let rising = beat(BeatKind::Confrontation, 1.0, BeatPolarity::Rising);
        let from = OmegaState::new(80.0, 0.0, "anger");
        let to = OmegaState::new(40.0, 0.0, "anger");
        let check = policy.check(Some(&rising), &from, &to);
        assert!(!check.feasible);
        assert!(check.detail.contains("rising"));

        let falling = beat(BeatKind::Confrontation, 1.0, BeatPolarity::Falling);
        assert!(policy.check(Some(&falling), &from, &to).feasible);
    }

    #[test]
    fn test_valence_swing() {
        let policy = BeatBudgetPolicy::default();
        let from = OmegaState::new(30.0, 0.0, "joy");
        let to = OmegaState::new(30.0, 0.0, "sadness");
        let check = policy.check(None, &from, &to);
        assert!(!check.feasible);
        assert!(check.detail.contains("valence"));
    }
}
