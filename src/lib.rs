//! Sovereign core: judge-and-correction engine for narrative prose
//!
//! physics model → trajectory analysis → axis scores → composite verdict
//! → loop decision → forensic trace

pub mod core;
pub mod types;

// =============================================================================
// VERDICT THRESHOLDS [C]
// =============================================================================

/// Minimum acceptable score for any single axis.
/// The floor band is [49, 50): an axis scoring below 50 forces REJECT.
pub const AXIS_FLOOR: f64 = 49.0;

/// Exclusive upper bound of the floor band
pub const AXIS_FLOOR_EXCLUSIVE: f64 = AXIS_FLOOR + 1.0;

/// Minimum composite required for SEAL (inclusive)
pub const SOVEREIGN_THRESHOLD: f64 = 92.0;

/// Absolute tolerance of the SEAL comparison. The composite is a float
/// division by W_TOTAL, so an exact 92 can land one ulp below.
pub const COMPOSITE_EPSILON: f64 = 1e-9;

// =============================================================================
// AXIS WEIGHTS [C] - sum = 15.0, emotion share = 9.5 / 15.0
// =============================================================================

pub const W_TENSION: f64 = 3.0;
pub const W_EMOTION_COHERENCE: f64 = 2.5;
pub const W_INTERIORITY: f64 = 2.0;
pub const W_IMPACT: f64 = 2.0;
pub const W_SENSORY_DENSITY: f64 = 1.5;
pub const W_NECESSITY: f64 = 1.0;
pub const W_ANTI_CLICHE: f64 = 1.0;
pub const W_RHYTHM: f64 = 1.0;
pub const W_SIGNATURE: f64 = 1.0;

/// Sum of all axis weights
pub const W_TOTAL: f64 = 15.0;

// =============================================================================
// PITCH ORACLE WEIGHTS [C]
// =============================================================================

/// Score contribution of each emotion-category correction op
pub const ORACLE_W_EMOTION: f64 = 0.63;

/// Score contribution of each craft-category correction op
pub const ORACLE_W_CRAFT: f64 = 0.37;

// =============================================================================
// EMOTION SPACE [C]
// =============================================================================

/// Upper bound of the paragraph intensity scale (Y)
pub const INTENSITY_MAX: f64 = 100.0;

/// Fallback dominant emotion when a paragraph carries no emotion signal
pub const FALLBACK_EMOTION: &str = "anticipation";

// =============================================================================
// VERSION
// =============================================================================

pub const VERSION: &str = "1.0.0";
