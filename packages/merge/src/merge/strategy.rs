//! Conflict-resolution policies for merging one section.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DescriptorError;

/// How an overlay section is merged into the original.
///
/// Unmatched overlay elements are inserted by every strategy except
/// [`MergeStrategy::Ignore`]; the strategies differ in what happens when an
/// overlay element has the same identity as an original one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeStrategy {
    /// The overlay element replaces the original one in place.
    #[default]
    Overwrite,
    /// The original element is kept unchanged.
    Preserve,
    /// The original element is kept and gains the overlay's missing children
    /// and attributes.
    Augment,
    /// The overlay section is skipped entirely.
    #[serde(alias = "none")]
    Ignore,
}

impl MergeStrategy {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Overwrite => "overwrite",
            Self::Preserve => "preserve",
            Self::Augment => "augment",
            Self::Ignore => "ignore",
        }
    }
}

impl fmt::Display for MergeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MergeStrategy {
    type Err = DescriptorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "overwrite" => Ok(Self::Overwrite),
            "preserve" => Ok(Self::Preserve),
            "augment" => Ok(Self::Augment),
            "ignore" | "none" => Ok(Self::Ignore),
            _ => Err(DescriptorError::UnknownStrategy(s.to_string())),
        }
    }
}
