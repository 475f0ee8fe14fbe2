use serde::{Deserialize, Serialize};

use super::formula::{FormulaConfig, DEFAULT_PASS_THRESHOLD};

/// Grading section of the config file.
///
/// Every field is optional; missing fields fall back to the standard scale
/// (20 points, `(p / 20) * 9 + 1`, half points, pass at 5,5).
///
/// Example YAML:
/// ```yaml
/// grading:
///   max_score: 40
///   multiplier: 9
///   base: 1
///   step: 1
///   pass_threshold: 5.5
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct GradingConfig {
    /// Maximum attainable points (default: 20)
    #[serde(default)]
    pub max_score: Option<f64>,

    /// Formula multiplier (default: 9)
    #[serde(default)]
    pub multiplier: Option<f64>,

    /// Formula base, the grade for zero points (default: 1)
    #[serde(default)]
    pub base: Option<f64>,

    /// Points between table rows (default: 0.5)
    #[serde(default)]
    pub step: Option<f64>,

    /// Lowest passing grade (default: 5.5)
    #[serde(default)]
    pub pass_threshold: Option<f64>,
}

impl GradingConfig {
    /// Overlay `other` on top of `self`; fields set in `other` win.
    pub fn merge(&self, other: &GradingConfig) -> GradingConfig {
        GradingConfig {
            max_score: other.max_score.or(self.max_score),
            multiplier: other.multiplier.or(self.multiplier),
            base: other.base.or(self.base),
            step: other.step.or(self.step),
            pass_threshold: other.pass_threshold.or(self.pass_threshold),
        }
    }

    /// Fill unset fields with defaults.
    pub fn resolve(&self) -> GradingSettings {
        let defaults = FormulaConfig::default();
        GradingSettings {
            formula: FormulaConfig {
                max_score: self.max_score.unwrap_or(defaults.max_score),
                multiplier: self.multiplier.unwrap_or(defaults.multiplier),
                base: self.base.unwrap_or(defaults.base),
            },
            step: self.step.unwrap_or(Resolution::Half.step()),
            pass_threshold: self.pass_threshold.unwrap_or(DEFAULT_PASS_THRESHOLD),
        }
    }
}

/// Fully resolved grading parameters for one computation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradingSettings {
    pub formula: FormulaConfig,
    pub step: f64,
    pub pass_threshold: f64,
}

impl Default for GradingSettings {
    fn default() -> Self {
        GradingConfig::default().resolve()
    }
}

impl GradingSettings {
    pub fn resolution(&self) -> Resolution {
        Resolution::from_step(self.step)
    }
}

/// Whole or half points between rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Whole,
    Half,
}

impl Resolution {
    pub fn step(self) -> f64 {
        match self {
            Resolution::Whole => 1.0,
            Resolution::Half => 0.5,
        }
    }

    /// Any step other than exactly 0.5 counts as whole points.
    pub fn from_step(step: f64) -> Self {
        if step == 0.5 {
            Resolution::Half
        } else {
            Resolution::Whole
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            Resolution::Whole => Resolution::Half,
            Resolution::Half => Resolution::Whole,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Resolution::Whole => "whole points",
            Resolution::Half => "half points",
        }
    }
}
