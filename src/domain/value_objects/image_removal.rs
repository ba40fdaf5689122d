//! Image removal mode for teardown

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which images a teardown removes alongside the containers
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ImageRemoval {
    /// Keep every image
    #[default]
    None,
    /// Remove only images without a custom tag
    Local,
    /// Remove every image used by any service
    All,
}

impl ImageRemoval {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageRemoval::None => "none",
            ImageRemoval::Local => "local",
            ImageRemoval::All => "all",
        }
    }

    pub fn removes_images(&self) -> bool {
        !matches!(self, ImageRemoval::None)
    }
}

impl fmt::Display for ImageRemoval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImageRemoval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "none" => Ok(ImageRemoval::None),
            "local" => Ok(ImageRemoval::Local),
            "all" => Ok(ImageRemoval::All),
            other => Err(format!(
                "unknown image removal mode '{}' (expected none, local or all)",
                other
            )),
        }
    }
}
