//! Section-by-section orchestration of a descriptor merge.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use super::merge_set::ElementMergeSet;
use super::strategy::MergeStrategy;
use crate::config::MergeConfig;
use crate::descriptor::Descriptor;
use crate::error::{DescriptorError, Result};
use crate::registry::Dialect;

/// Outcome of merging one section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionReport {
    pub section: String,
    pub strategy: MergeStrategy,
    /// Elements inserted, replaced or augmented.
    pub changed: usize,
}

/// Outcome of a whole merge, sections in the dialect's top-level order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergeReport {
    pub dialect: String,
    pub sections: Vec<SectionReport>,
}

impl MergeReport {
    /// Total number of changed elements.
    #[must_use]
    pub fn total(&self) -> usize {
        self.sections.iter().map(|section| section.changed).sum()
    }

    /// Report of one section.
    #[must_use]
    pub fn section(&self, name: &str) -> Option<&SectionReport> {
        self.sections.iter().find(|section| section.section == name)
    }
}

/// Merges an overlay descriptor into an original one, one section at a time.
///
/// Every top-level section of the dialect has a strategy: an explicit
/// assignment, or the default strategy ([`MergeStrategy::Overwrite`] unless
/// changed).
///
/// # Examples
/// ```
/// use std::sync::Arc;
/// use descriptor_merge::{create_web_app_dialect, Descriptor, DescriptorMerger, MergeStrategy};
///
/// let dialect = Arc::new(create_web_app_dialect());
/// let mut original = Descriptor::parse("<web-app/>", dialect.clone()).unwrap();
/// let overlay = Descriptor::parse(
///     "<web-app><listener><listener-class>com.example.Init</listener-class></listener></web-app>",
///     dialect.clone(),
/// )
/// .unwrap();
///
/// let mut merger = DescriptorMerger::new(dialect);
/// merger.set_strategy("listener", MergeStrategy::Preserve).unwrap();
/// let report = merger.merge(&mut original, &overlay).unwrap();
///
/// assert_eq!(report.total(), 1);
/// assert_eq!(original.elements("listener").unwrap().len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct DescriptorMerger {
    dialect: Arc<Dialect>,
    default: MergeStrategy,
    strategies: BTreeMap<String, MergeStrategy>,
}

impl DescriptorMerger {
    /// Create a merger for `dialect` with every section on the default strategy.
    #[must_use]
    pub fn new(dialect: Arc<Dialect>) -> Self {
        Self {
            dialect,
            default: MergeStrategy::default(),
            strategies: BTreeMap::new(),
        }
    }

    /// Build a merger from a configuration.
    ///
    /// # Errors
    /// Returns `UnknownSection` when the configuration names a section the
    /// dialect does not define.
    pub fn from_config(dialect: Arc<Dialect>, config: &MergeConfig) -> Result<Self> {
        let mut merger = Self::new(dialect).with_default_strategy(config.default);
        for (section, strategy) in &config.sections {
            merger.set_strategy(section, *strategy)?;
        }
        Ok(merger)
    }

    /// Set the strategy for sections without an explicit assignment.
    #[must_use]
    pub fn with_default_strategy(mut self, strategy: MergeStrategy) -> Self {
        self.default = strategy;
        self
    }

    /// Assign a strategy to a section.
    ///
    /// # Errors
    /// Returns `UnknownSection` when `section` is not a top-level tag of the dialect.
    pub fn set_strategy(&mut self, section: &str, strategy: MergeStrategy) -> Result<()> {
        if !self.dialect.is_section(section) {
            return Err(DescriptorError::UnknownSection {
                section: section.to_string(),
                dialect: self.dialect.key().to_string(),
            });
        }
        self.strategies.insert(section.to_string(), strategy);
        Ok(())
    }

    /// Strategy applied to `section`.
    #[must_use]
    pub fn strategy_for(&self, section: &str) -> MergeStrategy {
        self.strategies.get(section).copied().unwrap_or(self.default)
    }

    #[must_use]
    pub fn dialect(&self) -> &Arc<Dialect> {
        &self.dialect
    }

    /// Merge `overlay` into `original`.
    ///
    /// Sections are processed in the dialect's top-level order. Sections the
    /// overlay does not contain are left untouched and reported with a count
    /// of zero.
    ///
    /// # Errors
    /// Returns `DialectMismatch` when either descriptor belongs to another
    /// dialect than the merger.
    pub fn merge(&self, original: &mut Descriptor, overlay: &Descriptor) -> Result<MergeReport> {
        for descriptor in [&*original, overlay] {
            if descriptor.dialect().key() != self.dialect.key() {
                return Err(DescriptorError::DialectMismatch {
                    original: self.dialect.key().to_string(),
                    overlay: descriptor.dialect().key().to_string(),
                });
            }
        }

        let root = original.root();
        let mut sections = Vec::new();
        for tag in self.dialect.legal_top_level_order() {
            let strategy = self.strategy_for(&tag.name);
            let original_elements = original.elements(&tag.name)?;
            let overlay_elements = overlay.elements(&tag.name)?;

            let changed = ElementMergeSet::new(original, overlay, root).merge(
                &original_elements,
                &overlay_elements,
                strategy,
            )?;

            tracing::debug!(section = %tag.name, %strategy, changed, "merged section");
            sections.push(SectionReport {
                section: tag.name.clone(),
                strategy,
                changed,
            });
        }

        Ok(MergeReport {
            dialect: self.dialect.key().to_string(),
            sections,
        })
    }
}
