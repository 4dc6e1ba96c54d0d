//! Delta report: where a scored result falls short of SEAL

use serde::{Deserialize, Serialize};

use crate::types::axis::AxisName;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisGap {
    pub axis: AxisName,
    pub score: f64,
    /// max(0, SOVEREIGN_THRESHOLD - score)
    pub gap: f64,
    pub below_floor: bool,
    pub emotion: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeltaReport {
    /// Content hash of the SScoreResult this report was derived from
    pub source_hash: String,
    pub composite: f64,
    /// max(0, SOVEREIGN_THRESHOLD - composite)
    pub composite_gap: f64,
    /// Canonical axis order
    pub axes: Vec<AxisGap>,
    pub forced_transitions: usize,
    pub feasibility_failures: usize,
    pub law4_violations: usize,
    pub flux_compliant: bool,
    pub content_hash: String,
}

impl DeltaReport {
    pub fn gap(&self, axis: AxisName) -> f64 {
        self.axes
            .iter()
            .find(|g| g.axis == axis)
            .map(|g| g.gap)
            .unwrap_or(0.0)
    }

    pub fn physics_violations(&self) -> usize {
        self.forced_transitions + self.feasibility_failures + self.law4_violations
    }

    /// Axes with a positive gap, largest first
    pub fn weakest_axes(&self) -> Vec<AxisName> {
        let mut gaps: Vec<&AxisGap> = self.axes.iter().filter(|g| g.gap > 0.0).collect();
        gaps.sort_by(|a, b| b.gap.total_cmp(&a.gap));
        gaps.into_iter().map(|g| g.axis).collect()
    }
}
