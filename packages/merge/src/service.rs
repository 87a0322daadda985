//! Service functions tying parsing, merging and serialization together.

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;

use crate::config::{MergeConfig, MAX_DESCRIPTOR_SIZE};
use crate::descriptor::{Descriptor, SectionCount, WebAppVersion};
use crate::error::{DescriptorError, Result};
use crate::merge::{DescriptorMerger, MergeReport};
use crate::registry::{create_dialect_registry, Dialect};
use crate::xml::{parse_document, Document};

/// Result of a merge: the serialized descriptor and what changed.
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub xml: String,
    pub report: MergeReport,
}

/// Summary of a single descriptor.
#[derive(Debug, Clone, Serialize)]
pub struct Inspection {
    pub dialect: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub sections: Vec<SectionCount>,
    /// Root children outside the dialect's sections.
    pub unknown: Vec<String>,
}

/// Merge the overlay XML into the original XML.
///
/// The dialect comes from `config.dialect` when set; otherwise it is detected
/// from the original and the overlay must be of the same dialect.
///
/// # Arguments
/// * `original` - XML text of the descriptor to merge into
/// * `overlay` - XML text of the descriptor providing changes
/// * `config` - Strategies per section
///
/// # Returns
/// The merged descriptor serialized to XML, with a per-section report
///
/// # Errors
/// Returns `TooLarge`, `XmlParse`, `UnknownDialect`, `RootMismatch`,
/// `DialectMismatch` or `UnknownSection`.
pub fn merge_str(original: &str, overlay: &str, config: &MergeConfig) -> Result<MergeOutcome> {
    check_size(original.len())?;
    check_size(overlay.len())?;

    let original_doc = parse_document(original)?;
    let overlay_doc = parse_document(overlay)?;
    let dialect = resolve_dialect(config, &original_doc, &overlay_doc)?;

    let mut original = Descriptor::from_document(original_doc, dialect.clone())?;
    let overlay = Descriptor::from_document(overlay_doc, dialect.clone())?;
    let merger = DescriptorMerger::from_config(dialect, config)?;
    let report = merger.merge(&mut original, &overlay)?;

    tracing::debug!(
        dialect = %report.dialect,
        changed = report.total(),
        "merge complete"
    );

    Ok(MergeOutcome {
        xml: original.to_xml(),
        report,
    })
}

/// Merge two descriptor files. See [`merge_str`].
///
/// # Errors
/// Returns `Io` when a file cannot be read, otherwise as [`merge_str`].
pub fn merge_files(original: &Path, overlay: &Path, config: &MergeConfig) -> Result<MergeOutcome> {
    let original_xml = read_descriptor(original)?;
    let overlay_xml = read_descriptor(overlay)?;
    merge_str(&original_xml, &overlay_xml, config)
}

/// Detect the dialect of a descriptor and summarize its sections.
///
/// # Errors
/// Returns `TooLarge`, `XmlParse` or `UnknownDialect`.
pub fn inspect_str(xml: &str) -> Result<Inspection> {
    check_size(xml.len())?;
    let document = parse_document(xml)?;
    let dialect = create_dialect_registry().detect(&document)?;
    let version = if dialect.key() == "web-app" {
        WebAppVersion::detect(&document).map(|version| version.to_string())
    } else {
        None
    };

    let descriptor = Descriptor::from_document(document, dialect)?;
    let unknown = descriptor.unknown_elements();
    for element in &unknown {
        tracing::warn!(element = %element, dialect = descriptor.dialect().key(), "element outside the dialect");
    }

    Ok(Inspection {
        dialect: descriptor.dialect().key().to_string(),
        version,
        sections: descriptor.section_counts(),
        unknown,
    })
}

/// Inspect a descriptor file. See [`inspect_str`].
///
/// # Errors
/// Returns `Io` when the file cannot be read, otherwise as [`inspect_str`].
pub fn inspect_file(path: &Path) -> Result<Inspection> {
    inspect_str(&read_descriptor(path)?)
}

fn resolve_dialect(
    config: &MergeConfig,
    original: &Document,
    overlay: &Document,
) -> Result<Arc<Dialect>> {
    let registry = create_dialect_registry();
    if let Some(key) = &config.dialect {
        return registry.create(key);
    }

    let dialect = registry.detect(original)?;
    let overlay_dialect = registry.detect(overlay)?;
    if overlay_dialect.key() != dialect.key() {
        return Err(DescriptorError::DialectMismatch {
            original: dialect.key().to_string(),
            overlay: overlay_dialect.key().to_string(),
        });
    }
    Ok(dialect)
}

fn read_descriptor(path: &Path) -> Result<String> {
    let size = std::fs::metadata(path)?.len();
    check_size(usize::try_from(size).unwrap_or(usize::MAX))?;
    Ok(std::fs::read_to_string(path)?)
}

fn check_size(size: usize) -> Result<()> {
    if size > MAX_DESCRIPTOR_SIZE {
        return Err(DescriptorError::TooLarge {
            size,
            limit: MAX_DESCRIPTOR_SIZE,
        });
    }
    Ok(())
}
