//! Emotion physics model: pure law functions
//!
//! Every function is total. Unusable inputs (invalid constants, empty
//! sequences, non-finite values) produce a non-compliant result instead of
//! an error, so a compliance report can always be built.

use crate::types::{
    DampingRegime, DecayCurve, EmotionPhysics, EmotionPhysicsTable, FluxConservationResult,
    InertiaCheck, OmegaState, OrganicDecayAnalysis,
};

/// Tolerance within which ζ counts as exactly critical
const CRITICAL_EPSILON: f64 = 1e-9;

/// Damping regime of ζ
pub fn regime_of(damping_ratio: f64) -> DampingRegime {
    if (damping_ratio - 1.0).abs() < CRITICAL_EPSILON {
        DampingRegime::Critical
    } else if damping_ratio < 1.0 {
        DampingRegime::Underdamped
    } else {
        DampingRegime::Overdamped
    }
}

/// Oscillation frequency of the decay envelope: ω = λ·√(1 − ζ²) for
/// 0 ≤ ζ < 1, zero otherwise.
pub fn damped_frequency(decay_rate: f64, damping_ratio: f64) -> f64 {
    if !decay_rate.is_finite() || !damping_ratio.is_finite() || damping_ratio < 0.0 {
        return 0.0;
    }
    match regime_of(damping_ratio) {
        DampingRegime::Underdamped => decay_rate.max(0.0) * (1.0 - damping_ratio * damping_ratio).sqrt(),
        DampingRegime::Critical | DampingRegime::Overdamped => 0.0,
    }
}

/// λ_eff = λ·(1 − μ·Z/C), with Z/C clamped to [0, 1].
///
/// Equals λ at Z = 0 and is non-increasing in Z for μ ≥ 0.
pub fn effective_decay_rate(
    decay_rate: f64,
    saturation_coupling: f64,
    saturation: f64,
    capacity: f64,
) -> f64 {
    let ratio = if capacity > 0.0 && capacity.is_finite() && !saturation.is_nan() {
        (saturation / capacity).clamp(0.0, 1.0)
    } else {
        0.0
    };
    decay_rate * (1.0 - saturation_coupling * ratio)
}

/// Decay curve for an emotion starting at `initial` under load `saturation`.
///
/// Phase is fixed at 0 so the curve starts at `initial` in every regime.
pub fn decay_curve(
    physics: &EmotionPhysics,
    initial: f64,
    saturation: f64,
    capacity: f64,
) -> DecayCurve {
    DecayCurve {
        initial,
        baseline: physics.baseline,
        decay_rate: physics.decay_rate,
        saturation_coupling: physics.saturation_coupling,
        saturation,
        capacity,
        damping_ratio: physics.damping_ratio,
        frequency: damped_frequency(physics.decay_rate, physics.damping_ratio),
        phase: 0.0,
    }
}

/// I(t) = E0 + (I0 − E0)·e^(−λ_eff·t)·cos(ω·t + φ)
///
/// For ζ ≥ 1 the cosine factor is 1: a pure exponential between I0 and E0.
pub fn theoretical_intensity(curve: &DecayCurve, t: f64) -> f64 {
    let lambda_eff = effective_decay_rate(
        curve.decay_rate,
        curve.saturation_coupling,
        curve.saturation,
        curve.capacity,
    );
    let envelope = (curve.initial - curve.baseline) * (-lambda_eff * t).exp();
    let oscillation = match regime_of(curve.damping_ratio) {
        DampingRegime::Underdamped => (curve.frequency * t + curve.phase).cos(),
        DampingRegime::Critical | DampingRegime::Overdamped => 1.0,
    };
    curve.baseline + envelope * oscillation
}

/// Inertia law: forced iff force ≤ mass × resistance.
///
/// Non-finite inputs or a non-positive mass count as forced.
pub fn check_inertia(force: f64, mass: f64, resistance: f64) -> InertiaCheck {
    let usable = force.is_finite() && mass.is_finite() && resistance.is_finite() && mass > 0.0;
    InertiaCheck {
        force,
        mass,
        resistance,
        forced: !usable || force <= mass * resistance,
    }
}

/// Organic decay law over one segment.
///
/// `actual[i]` is observed at t = i paragraphs; `saturation[i]` is the load at
/// that paragraph (the last value repeats if the slice is shorter). Deviation
/// is the RMS gap to the theoretical curve started at `actual[0]`.
pub fn analyze_decay_segment(
    actual: &[f64],
    physics: &EmotionPhysics,
    saturation: &[f64],
    capacity: f64,
    tolerance: f64,
) -> OrganicDecayAnalysis {
    let end = actual.len().saturating_sub(1);
    let mut analysis = OrganicDecayAnalysis {
        start: 0,
        end,
        emotion: String::new(),
        regime: None,
        actual: actual.to_vec(),
        theoretical: Vec::new(),
        deviation: None,
        tolerance,
        compliant: false,
    };

    if actual.is_empty() || !physics.is_valid() || actual.iter().any(|y| !y.is_finite()) {
        return analysis;
    }

    let initial = actual[0];
    let theoretical: Vec<f64> = (0..actual.len())
        .map(|i| {
            let z = saturation
                .get(i)
                .or_else(|| saturation.last())
                .copied()
                .unwrap_or(0.0);
            theoretical_intensity(&decay_curve(physics, initial, z, capacity), i as f64)
        })
        .collect();

    let sum_sq: f64 = actual
        .iter()
        .zip(&theoretical)
        .map(|(a, t)| (a - t) * (a - t))
        .sum();
    let deviation = (sum_sq / actual.len() as f64).sqrt();

    analysis.regime = Some(regime_of(physics.damping_ratio));
    analysis.theoretical = theoretical;
    analysis.compliant = deviation.is_finite() && deviation <= tolerance;
    analysis.deviation = deviation.is_finite().then_some(deviation);
    analysis
}

/// Flux conservation over the whole sequence.
///
/// - total: Σ max(ΔY, 0) / 100 (energy injected)
/// - dissipated: natural decay loss the physics predicts, capped by the
///   actual drop of each transition
/// - transferred: remaining drop not explained by decay
/// - stored: (Z_last − Z_first) / C
///
/// An empty sequence is non-compliant.
pub fn compute_flux_conservation(
    states: &[OmegaState],
    table: &EmotionPhysicsTable,
    capacity: f64,
    tolerance: f64,
) -> FluxConservationResult {
    let (first, last) = match (states.first(), states.last()) {
        (Some(f), Some(l)) => (f, l),
        _ => {
            return FluxConservationResult {
                transferred: 0.0,
                stored: 0.0,
                dissipated: 0.0,
                total: 0.0,
                balance_error: 0.0,
                tolerance,
                compliant: false,
            }
        }
    };

    let mut total = 0.0;
    let mut dissipated = 0.0;
    let mut transferred = 0.0;

    for pair in states.windows(2) {
        let (from, to) = (&pair[0], &pair[1]);
        let delta = (to.intensity - from.intensity) / crate::INTENSITY_MAX;
        if delta >= 0.0 {
            total += delta;
            continue;
        }
        let outflow = -delta;
        let natural = match table.get(&from.dominant) {
            Some(p) if p.is_valid() => {
                let rate = effective_decay_rate(
                    p.decay_rate,
                    p.saturation_coupling,
                    from.saturation,
                    capacity,
                );
                rate * (from.intensity - p.baseline).max(0.0) / crate::INTENSITY_MAX
            }
            _ => 0.0,
        };
        let lost = natural.clamp(0.0, outflow);
        dissipated += lost;
        transferred += outflow - lost;
    }

    let stored = if capacity > 0.0 && capacity.is_finite() {
        (last.saturation - first.saturation) / capacity
    } else {
        0.0
    };

    let balance_error = (transferred + stored + dissipated - total).abs();
    FluxConservationResult {
        transferred,
        stored,
        dissipated,
        total,
        balance_error,
        tolerance,
        compliant: balance_error.is_finite() && balance_error <= tolerance,
    }
}
