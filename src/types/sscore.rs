//! Composite score and verdict

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::axis::{AxesScores, AxisName};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Seal,
    Reject,
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Seal => write!(f, "SEAL"),
            Self::Reject => write!(f, "REJECT"),
        }
    }
}

/// Result of aggregating one `AxesScores`.
///
/// `verdict` and `composite` are always derived from `axes` by the
/// aggregator; `content_hash` covers everything except `scored_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SScoreResult {
    pub axes: AxesScores,
    /// [0, 100]
    pub composite: f64,
    /// Share of total weight on emotion axes, in percent
    pub emotion_weight_pct: f64,
    pub verdict: Verdict,
    pub content_hash: String,
    pub scored_at: DateTime<Utc>,
}

impl SScoreResult {
    pub fn is_sealed(&self) -> bool {
        self.verdict == Verdict::Seal
    }

    /// Axes scoring inside or under the floor band
    pub fn floor_violations(&self) -> Vec<AxisName> {
        self.axes
            .iter()
            .filter(|a| a.below_floor())
            .map(|a| a.name)
            .collect()
    }
}
