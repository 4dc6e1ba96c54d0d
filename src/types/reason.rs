//! Reason codes for loop decisions and terminal states

use serde::{Deserialize, Serialize};

use crate::types::error::ProviderError;

/// Reason codes for every pass decision and run termination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(non_camel_case_types)]
pub enum ReasonCode {
    // =========================================================================
    // L001: Seal
    // =========================================================================
    /// Initial prose already sealed, no pass needed
    L001_SEALED_INITIAL,
    /// Accepted candidate reached SEAL
    L001_SEALED,

    // =========================================================================
    // L002: Accept
    // =========================================================================
    /// Candidate composite strictly higher
    L002_ACCEPTED_IMPROVED,
    /// Candidate composite unchanged (delta = 0)
    L002_ACCEPTED_NEUTRAL,

    // =========================================================================
    // L003: Rollback
    // =========================================================================
    /// Candidate composite lower, candidate discarded
    L003_ROLLBACK_REGRESSION,

    // =========================================================================
    // L004: Budget
    // =========================================================================
    /// max_passes reached without SEAL
    L004_EXHAUSTED,

    // =========================================================================
    // L005: Patch provider failures
    // =========================================================================
    L005_PATCH_FAILED,
    L005_PATCH_TIMEOUT,
    L005_PATCH_REFUSAL,
    L005_PATCH_EMPTY,

    // =========================================================================
    // L006: Judge provider failures
    // =========================================================================
    L006_JUDGE_FAILED,
    L006_JUDGE_TIMEOUT,
}

impl ReasonCode {
    /// Get the code string (for logging)
    pub fn code(&self) -> &'static str {
        match self {
            Self::L001_SEALED_INITIAL => "L001_SEALED_INITIAL",
            Self::L001_SEALED => "L001_SEALED",
            Self::L002_ACCEPTED_IMPROVED => "L002_ACCEPTED_IMPROVED",
            Self::L002_ACCEPTED_NEUTRAL => "L002_ACCEPTED_NEUTRAL",
            Self::L003_ROLLBACK_REGRESSION => "L003_ROLLBACK_REGRESSION",
            Self::L004_EXHAUSTED => "L004_EXHAUSTED",
            Self::L005_PATCH_FAILED => "L005_PATCH_FAILED",
            Self::L005_PATCH_TIMEOUT => "L005_PATCH_TIMEOUT",
            Self::L005_PATCH_REFUSAL => "L005_PATCH_REFUSAL",
            Self::L005_PATCH_EMPTY => "L005_PATCH_EMPTY",
            Self::L006_JUDGE_FAILED => "L006_JUDGE_FAILED",
            Self::L006_JUDGE_TIMEOUT => "L006_JUDGE_TIMEOUT",
        }
    }

    /// Get human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::L001_SEALED_INITIAL => "Initial prose already sealed",
            Self::L001_SEALED => "Sealed",
            Self::L002_ACCEPTED_IMPROVED => "Candidate accepted, composite improved",
            Self::L002_ACCEPTED_NEUTRAL => "Candidate accepted, composite unchanged",
            Self::L003_ROLLBACK_REGRESSION => "Candidate rolled back, composite decreased",
            Self::L004_EXHAUSTED => "Pass budget exhausted without seal",
            Self::L005_PATCH_FAILED => "Patch provider failed",
            Self::L005_PATCH_TIMEOUT => "Patch provider timed out",
            Self::L005_PATCH_REFUSAL => "Patch provider refused",
            Self::L005_PATCH_EMPTY => "Patch provider returned empty prose",
            Self::L006_JUDGE_FAILED => "Judge provider failed",
            Self::L006_JUDGE_TIMEOUT => "Judge provider timed out",
        }
    }

    /// Classify a patch-stage provider error
    pub fn for_patch_error(err: &ProviderError) -> Self {
        match err {
            ProviderError::Timeout { .. } => Self::L005_PATCH_TIMEOUT,
            ProviderError::Refusal { .. } => Self::L005_PATCH_REFUSAL,
            ProviderError::EmptyOutput => Self::L005_PATCH_EMPTY,
            ProviderError::Failed(_) | ProviderError::NonFinite { .. } => Self::L005_PATCH_FAILED,
        }
    }

    /// Classify a judge-stage provider error
    pub fn for_judge_error(err: &ProviderError) -> Self {
        match err {
            ProviderError::Timeout { .. } => Self::L006_JUDGE_TIMEOUT,
            _ => Self::L006_JUDGE_FAILED,
        }
    }
}

impl std::fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code(), self.description())
    }
}
