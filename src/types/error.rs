//! Error hierarchy
//!
//! Only input validation and provider-boundary failures are errors.
//! Physics-law and floor violations are recorded as scores, never raised.

use thiserror::Error;

/// Failure at the PatchProvider / JudgeProvider boundary.
///
/// Any of these terminates a loop run as EXECUTION_FAILED.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// Provider call failed (transport, backend, exhausted replay)
    #[error("provider failed: {0}")]
    Failed(String),

    /// Provider call exceeded its deadline
    #[error("provider timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// Output recognized as a model refusal
    #[error("provider refused: {excerpt}")]
    Refusal { excerpt: String },

    /// Output was empty after trimming
    #[error("provider returned empty output")]
    EmptyOutput,

    /// Model backend returned NaN or Inf for an axis
    #[error("non-finite score for axis {axis}")]
    NonFinite { axis: String },
}

/// Root error type for the sovereign core.
#[derive(Error, Debug)]
pub enum SovereignError {
    /// Malformed packet or input
    #[error("validation error: {0}")]
    Validation(String),

    /// A referenced emotion label has no physics constants
    #[error("missing physics constants for emotion '{label}'")]
    MissingPhysics { label: String },

    /// Invalid configuration
    #[error("config error: {0}")]
    Config(String),

    /// Provider failure outside of a loop pass (e.g. initial scoring)
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type SovereignResult<T> = Result<T, SovereignError>;
