//! Calculator tuning constants
//!
//! Every threshold the pipeline compares against lives here so a shop can
//! tighten them from a TOML file without touching the tables.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config value: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalcConfig {
    /// Tool holder compliance, mm/N
    pub holder_compliance: f64,
    /// Required/available ratio above which the cut is power-limited
    pub power_limit_threshold: f64,
    /// Fraction of available power targeted once limited
    pub power_safety_factor: f64,
    pub spindle_loss_fraction: f64,

    pub aggressiveness_min: f64,
    pub aggressiveness_max: f64,

    /// Rubbing below chipload_low_factor * table min
    pub chipload_low_factor: f64,
    /// Overload above chipload_high_factor * table max
    pub chipload_high_factor: f64,

    /// Force per mm of diameter, N/mm
    pub force_warning: f64,
    pub force_danger: f64,

    /// Total deflection, mm
    pub deflection_warning: f64,
    pub deflection_danger: f64,

    /// Stickout / diameter
    pub stickout_warning_ratio: f64,
    pub stickout_danger_ratio: f64,

    /// Damping ratio used inside the resonance band
    pub damping_ratio: f64,

    pub optimizer_steps: usize,
    pub optimizer_top_n: usize,
}

impl Default for CalcConfig {
    fn default() -> Self {
        Self {
            holder_compliance: 0.002,
            power_limit_threshold: 0.9,
            power_safety_factor: 0.85,
            spindle_loss_fraction: 0.15,
            aggressiveness_min: 0.1,
            aggressiveness_max: 3.0,
            chipload_low_factor: 0.5,
            chipload_high_factor: 1.5,
            force_warning: 300.0,
            force_danger: 500.0,
            deflection_warning: 0.02,
            deflection_danger: 0.05,
            stickout_warning_ratio: 6.0,
            stickout_danger_ratio: 10.0,
            damping_ratio: 0.05,
            optimizer_steps: 12,
            optimizer_top_n: 5,
        }
    }
}

impl CalcConfig {
    /// Load from a TOML file; missing keys keep their defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let cfg: CalcConfig = toml::from_str(content)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.holder_compliance < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "holder_compliance must be >= 0, got {}",
                self.holder_compliance
            )));
        }
        if !(0.0..=1.0).contains(&self.power_limit_threshold) || self.power_limit_threshold == 0.0 {
            return Err(ConfigError::Invalid(format!(
                "power_limit_threshold must be in (0, 1], got {}",
                self.power_limit_threshold
            )));
        }
        if self.power_safety_factor <= 0.0 || self.power_safety_factor > self.power_limit_threshold {
            return Err(ConfigError::Invalid(format!(
                "power_safety_factor must be in (0, power_limit_threshold], got {}",
                self.power_safety_factor
            )));
        }
        if self.spindle_loss_fraction < 0.0 {
            return Err(ConfigError::Invalid(
                "spindle_loss_fraction must be >= 0".to_string(),
            ));
        }
        if self.aggressiveness_min > self.aggressiveness_max {
            return Err(ConfigError::Invalid(
                "aggressiveness_min exceeds aggressiveness_max".to_string(),
            ));
        }
        if self.force_warning > self.force_danger
            || self.deflection_warning > self.deflection_danger
            || self.stickout_warning_ratio > self.stickout_danger_ratio
        {
            return Err(ConfigError::Invalid(
                "warning thresholds must not exceed danger thresholds".to_string(),
            ));
        }
        if self.optimizer_steps < 2 {
            return Err(ConfigError::Invalid(
                "optimizer_steps must be at least 2".to_string(),
            ));
        }
        Ok(())
    }
}
