//! Runtime configuration
//!
//! Built once, validated, then shared by reference with every component.
//! Verdict thresholds and axis weights are system constants (see lib.rs),
//! not configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::types::error::{SovereignError, SovereignResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SovereignConfig {
    /// Saturation capacity C: upper bound of accumulated load Z.
    /// Default: 100
    pub saturation_capacity: f64,

    /// Intensity rise (Y units) that opens a new decay segment.
    /// Default: 15
    pub spike_threshold: f64,

    /// Max RMS deviation (Y units) between actual and theoretical decay.
    /// Default: 12
    pub decay_tolerance: f64,

    /// Max flux balance error (normalized energy units).
    /// Default: 0.25
    pub flux_tolerance: f64,

    /// Narrative force present in every transition, beat or not.
    /// Default: 0.6
    pub ambient_force: f64,

    /// Multiplier turning beat kind × beat intensity into force.
    /// Default: 10
    pub beat_force_scale: f64,

    /// Keyword density → intensity gain used by text emotion extraction.
    /// Default: 8
    pub intensity_gain: f64,

    /// Fraction of above-baseline intensity accumulated into Z per paragraph.
    /// Default: 0.5
    pub saturation_gain: f64,

    /// Hard ceiling on correction passes per loop run.
    /// Default: 5
    pub max_passes: u32,

    /// Optional deadline for each provider call (ms). None = no deadline.
    pub provider_timeout_ms: Option<u64>,
}

impl Default for SovereignConfig {
    fn default() -> Self {
        Self {
            saturation_capacity: 100.0,
            spike_threshold: 15.0,
            decay_tolerance: 12.0,
            flux_tolerance: 0.25,
            ambient_force: 0.6,
            beat_force_scale: 10.0,
            intensity_gain: 8.0,
            saturation_gain: 0.5,
            max_passes: 5,
            provider_timeout_ms: None,
        }
    }
}

impl SovereignConfig {
    /// Validate configuration parameters.
    pub fn validate(&self) -> SovereignResult<()> {
        let positive = [
            ("saturation_capacity", self.saturation_capacity),
            ("spike_threshold", self.spike_threshold),
            ("decay_tolerance", self.decay_tolerance),
            ("flux_tolerance", self.flux_tolerance),
            ("beat_force_scale", self.beat_force_scale),
            ("intensity_gain", self.intensity_gain),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(SovereignError::Config(format!(
                    "{name} must be finite and > 0, got {value}"
                )));
            }
        }
        if !self.ambient_force.is_finite() || self.ambient_force < 0.0 {
            return Err(SovereignError::Config(format!(
                "ambient_force must be finite and >= 0, got {}",
                self.ambient_force
            )));
        }
        if !(0.0..=1.0).contains(&self.saturation_gain) {
            return Err(SovereignError::Config(format!(
                "saturation_gain must be in [0, 1], got {}",
                self.saturation_gain
            )));
        }
        if self.max_passes == 0 {
            return Err(SovereignError::Config("max_passes must be >= 1".to_string()));
        }
        if self.provider_timeout_ms == Some(0) {
            return Err(SovereignError::Config(
                "provider_timeout_ms must be > 0 when set".to_string(),
            ));
        }
        Ok(())
    }

    /// Load from JSON string and validate.
    pub fn from_json(json: &str) -> SovereignResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| SovereignError::Config(format!("JSON parse error: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file and validate.
    pub fn from_file(path: impl AsRef<Path>) -> SovereignResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}
