//! Provider seams: patch providers, model backends, judge variants
//!
//! The judge variant is chosen once at construction. Nothing downstream
//! inspects a mode string.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;

use crate::core::aggregator::compute_sscore;
use crate::core::axes::CalcJudge;
use crate::core::feasibility::FeasibilityPolicy;
use crate::types::{
    AxesScores, AxisDetails, AxisName, AxisScore, EmotionPhysicsTable, PitchStrategy,
    ProviderError, SScoreResult, ScenePacket, ScoringMethod, SovereignConfig,
};

/// Only the head of an output is searched for refusal boilerplate
const REFUSAL_SCAN_CHARS: usize = 300;

lazy_static! {
    static ref RE_REFUSAL: Regex = Regex::new(
        r"(?i)(i\s+can(?:'|’|no)?t\s+(?:help|assist|comply|continue|write)|i(?:'|’)m\s+sorry,?\s+but|as\s+an\s+ai\b|as\s+a\s+language\s+model|i(?:\s+am|'m|’m)\s+unable\s+to|je\s+ne\s+peux\s+pas|en\s+tant\s+qu(?:'|’)(?:ia|intelligence\s+artificielle)|je\s+suis\s+d[ée]sol[ée]e?,?\s+mais|je\s+ne\s+suis\s+pas\s+en\s+mesure)"
    ).unwrap();
}

/// Refusal phrase found at the head of `text`, if any
pub fn detect_refusal(text: &str) -> Option<String> {
    let head: String = text.chars().take(REFUSAL_SCAN_CHARS).collect();
    RE_REFUSAL.find(&head).map(|m| m.as_str().to_string())
}

/// Reject empty and refused provider output
pub fn screen_output(text: String) -> Result<String, ProviderError> {
    if text.trim().is_empty() {
        return Err(ProviderError::EmptyOutput);
    }
    if let Some(excerpt) = detect_refusal(&text) {
        return Err(ProviderError::Refusal { excerpt });
    }
    Ok(text)
}

/// Await `fut`, failing with `Timeout` after `timeout_ms` when set
pub async fn with_timeout<T, F>(timeout_ms: Option<u64>, fut: F) -> Result<T, ProviderError>
where
    F: Future<Output = Result<T, ProviderError>>,
{
    match timeout_ms {
        Some(ms) => tokio::time::timeout(Duration::from_millis(ms), fut)
            .await
            .map_err(|_| ProviderError::Timeout { timeout_ms: ms })?,
        None => fut.await,
    }
}

// =============================================================================
// PATCH PROVIDERS
// =============================================================================

/// Produces revised prose for a strategy.
#[async_trait]
pub trait PatchProvider: Send + Sync {
    async fn apply_patch(
        &self,
        prose: &str,
        strategy: &PitchStrategy,
        packet: &ScenePacket,
    ) -> Result<String, ProviderError>;
}

/// Replays a fixed list of revisions, one per call, in order.
#[derive(Debug, Default)]
pub struct ReplayPatchProvider {
    revisions: Vec<String>,
    cursor: AtomicUsize,
}

impl ReplayPatchProvider {
    pub fn new(revisions: Vec<String>) -> Self {
        Self {
            revisions,
            cursor: AtomicUsize::new(0),
        }
    }

    /// Revisions not yet handed out
    pub fn remaining(&self) -> usize {
        self.revisions
            .len()
            .saturating_sub(self.cursor.load(Ordering::SeqCst))
    }
}

#[async_trait]
impl PatchProvider for ReplayPatchProvider {
    async fn apply_patch(
        &self,
        _prose: &str,
        _strategy: &PitchStrategy,
        _packet: &ScenePacket,
    ) -> Result<String, ProviderError> {
        let i = self.cursor.fetch_add(1, Ordering::SeqCst);
        self.revisions
            .get(i)
            .cloned()
            .ok_or_else(|| {
                ProviderError::Failed(format!(
                    "replay exhausted after {} revisions",
                    self.revisions.len()
                ))
            })
    }
}

// =============================================================================
// JUDGE PROVIDERS
// =============================================================================

/// Model-backed scoring of a single axis. The packet carries the seed.
#[async_trait]
pub trait ModelBackend: Send + Sync {
    async fn score_axis(
        &self,
        axis: AxisName,
        packet: &ScenePacket,
        prose: &str,
    ) -> Result<f64, ProviderError>;
}

/// Closed set of judge variants
pub enum JudgeProvider {
    /// All nine axes computed
    Calc(CalcJudge),
    /// Model-eligible axes from the backend, the rest computed
    Model {
        calc: CalcJudge,
        backend: Arc<dyn ModelBackend>,
    },
    /// Model-eligible axes are the mean of backend and computed scores
    Hybrid {
        calc: CalcJudge,
        backend: Arc<dyn ModelBackend>,
    },
}

impl std::fmt::Debug for JudgeProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Calc(_) => "JudgeProvider::Calc",
            Self::Model { .. } => "JudgeProvider::Model",
            Self::Hybrid { .. } => "JudgeProvider::Hybrid",
        })
    }
}

impl JudgeProvider {
    pub fn calc(
        config: Arc<SovereignConfig>,
        physics: Arc<EmotionPhysicsTable>,
        policy: Arc<dyn FeasibilityPolicy>,
    ) -> Self {
        Self::Calc(CalcJudge::new(config, physics, policy))
    }

    /// Same inputs always give the same scores
    pub fn is_deterministic(&self) -> bool {
        matches!(self, Self::Calc(_))
    }

    pub fn calc_judge(&self) -> &CalcJudge {
        match self {
            Self::Calc(calc) | Self::Model { calc, .. } | Self::Hybrid { calc, .. } => calc,
        }
    }

    pub async fn judge(&self, packet: &ScenePacket, prose: &str) -> Result<AxesScores, ProviderError> {
        match self {
            Self::Calc(calc) => Ok(calc.judge(packet, prose)),
            Self::Model { calc, backend } => {
                let mut axes = calc.judge(packet, prose);
                for axis in AxisName::ALL.into_iter().filter(AxisName::is_model_eligible) {
                    let model = finite(axis, backend.score_axis(axis, packet, prose).await?)?;
                    axes = axes.with(AxisScore::new(
                        axis,
                        model,
                        ScoringMethod::Model,
                        AxisDetails::Note(format!("model {model:.2}")),
                    ));
                }
                Ok(axes)
            }
            Self::Hybrid { calc, backend } => {
                let mut axes = calc.judge(packet, prose);
                for axis in AxisName::ALL.into_iter().filter(AxisName::is_model_eligible) {
                    let model = finite(axis, backend.score_axis(axis, packet, prose).await?)?;
                    let computed = axes.get(axis).score;
                    axes = axes.with(AxisScore::new(
                        axis,
                        (model.clamp(0.0, 100.0) + computed) / 2.0,
                        ScoringMethod::Hybrid,
                        AxisDetails::Note(format!("model {model:.2}, calc {computed:.2}")),
                    ));
                }
                Ok(axes)
            }
        }
    }

    /// Judge and aggregate in one step
    pub async fn score(&self, packet: &ScenePacket, prose: &str) -> Result<SScoreResult, ProviderError> {
        Ok(compute_sscore(self.judge(packet, prose).await?))
    }
}

fn finite(axis: AxisName, score: f64) -> Result<f64, ProviderError> {
    if score.is_finite() {
        Ok(score)
    } else {
        Err(ProviderError::NonFinite {
            axis: axis.to_string(),
        })
    }
}
