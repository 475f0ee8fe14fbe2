use serde::{Deserialize, Serialize};

use crate::grading::GradingConfig;
use crate::roster::RosterConfig;

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub grading: Option<GradingConfig>,

    #[serde(default)]
    pub roster: Option<RosterConfig>,

    /// Color theme: auto (detect), dark, or light
    #[serde(default)]
    pub theme: ThemeChoice,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ThemeChoice {
    #[default]
    Auto,
    Dark,
    Light,
}
