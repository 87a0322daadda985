//! Configuration constants and merge configuration loading.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{DescriptorError, Result};
use crate::merge::MergeStrategy;

/// Declaration written at the top of every serialized descriptor.
pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// Indentation unit of serialized descriptors.
pub const INDENT: &str = "  ";

/// Maximum descriptor size accepted by the service functions (16 MB).
///
/// Real deployment descriptors are a few hundred kilobytes at most; anything
/// larger is almost certainly the wrong file.
pub const MAX_DESCRIPTOR_SIZE: usize = 16 * 1024 * 1024;

/// Strategy assignment pattern: `section=strategy`.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static ASSIGNMENT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([A-Za-z][A-Za-z0-9_.-]*)\s*=\s*([A-Za-z]+)\s*$").expect("valid regex")
});

/// Per-section merge strategies, usually loaded from YAML.
///
/// ```yaml
/// dialect: web-app      # optional, detected from the original otherwise
/// default: overwrite
/// sections:
///   filter: preserve
///   listener: ignore
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MergeConfig {
    /// Dialect key to parse both descriptors with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dialect: Option<String>,

    /// Strategy for sections without an explicit assignment.
    #[serde(default)]
    pub default: MergeStrategy,

    /// Strategy per top-level section tag.
    #[serde(default)]
    pub sections: BTreeMap<String, MergeStrategy>,
}

impl MergeConfig {
    /// Parse a configuration from YAML text.
    ///
    /// # Errors
    /// Returns `Config` for malformed YAML, unknown keys or unknown strategies.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml_ng::from_str(yaml)?)
    }

    /// Read a configuration file.
    ///
    /// # Errors
    /// Returns `Io` when the file cannot be read, otherwise as [`MergeConfig::from_yaml_str`].
    pub fn from_file(path: &Path) -> Result<Self> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }

    /// Apply a `section=strategy` assignment on top of the configuration.
    ///
    /// Section names are checked against the dialect later, when the merger
    /// is built.
    ///
    /// # Errors
    /// Returns `InvalidAssignment` or `UnknownStrategy`.
    pub fn apply_assignment(&mut self, assignment: &str) -> Result<()> {
        let (section, strategy) = parse_assignment(assignment)?;
        self.sections.insert(section, strategy);
        Ok(())
    }
}

/// Parse a `section=strategy` assignment.
///
/// # Examples
/// ```
/// use descriptor_merge::config::parse_assignment;
/// use descriptor_merge::MergeStrategy;
///
/// let (section, strategy) = parse_assignment("filter=preserve").unwrap();
/// assert_eq!(section, "filter");
/// assert_eq!(strategy, MergeStrategy::Preserve);
/// assert!(parse_assignment("filter").is_err());
/// ```
///
/// # Errors
/// Returns `InvalidAssignment` for malformed input and `UnknownStrategy` for
/// an unsupported strategy name.
pub fn parse_assignment(assignment: &str) -> Result<(String, MergeStrategy)> {
    let captures = ASSIGNMENT_PATTERN
        .captures(assignment)
        .ok_or_else(|| DescriptorError::InvalidAssignment(assignment.to_string()))?;
    let section = captures[1].to_string();
    let strategy = captures[2].parse()?;
    Ok((section, strategy))
}
