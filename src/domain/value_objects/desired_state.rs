//! Desired end-state of a project

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// What the caller wants the project to look like after reconciliation
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum DesiredState {
    /// Every selected service converged and running (`up`)
    #[default]
    Present,
    /// Every project container removed (`down`)
    Absent,
}

impl DesiredState {
    pub fn as_str(&self) -> &'static str {
        match self {
            DesiredState::Present => "present",
            DesiredState::Absent => "absent",
        }
    }
}

impl fmt::Display for DesiredState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DesiredState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "present" | "up" => Ok(DesiredState::Present),
            "absent" | "down" => Ok(DesiredState::Absent),
            other => Err(format!(
                "unknown desired state '{}' (expected present or absent)",
                other
            )),
        }
    }
}
