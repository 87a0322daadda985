//! Error types for the descriptor merge engine.
//!
//! `DescriptorError` is the single error type surfaced to library consumers.
//! Inside the merge algorithm only `UnknownTag` can reach a caller; every
//! data-shape problem degrades to "insert as new" instead of failing.

use thiserror::Error;

/// Main error type for the descriptor merge library.
#[derive(Debug, Error)]
pub enum DescriptorError {
    /// Tag name not defined by the dialect's registry.
    #[error("Unknown tag <{tag}> for dialect '{dialect}'")]
    UnknownTag { tag: String, dialect: String },

    /// Strategy assigned to a section the dialect does not define.
    #[error("Unknown section '{section}' for dialect '{dialect}'")]
    UnknownSection { section: String, dialect: String },

    /// No dialect registered under this key, or none matches a document.
    #[error("Unknown descriptor dialect: {0}")]
    UnknownDialect(String),

    /// Strategy name that is not one of the supported policies.
    #[error("Unknown merge strategy: '{0}'. Expected overwrite, preserve, augment or ignore")]
    UnknownStrategy(String),

    /// Malformed `section=strategy` assignment.
    #[error("Invalid strategy assignment: '{0}'. Expected SECTION=STRATEGY (e.g., filter=preserve)")]
    InvalidAssignment(String),

    /// Attempt to merge descriptors written in two different dialects.
    #[error("Cannot merge a '{overlay}' descriptor into a '{original}' descriptor")]
    DialectMismatch { original: String, overlay: String },

    /// Root element does not belong to the expected dialect.
    #[error("Expected root element <{expected}>, found <{found}>")]
    RootMismatch { expected: String, found: String },

    /// Builder asked to add an element whose identity already exists.
    #[error("Duplicate <{tag}> '{name}'")]
    Duplicate { tag: String, name: String },

    /// Element handle used with a document that does not own it.
    #[error("Element belongs to another document; import it before inserting")]
    CrossDocument,

    /// Input exceeds the configured size limit.
    #[error("Descriptor too large: {size} bytes (limit {limit})")]
    TooLarge { size: usize, limit: usize },

    /// XML parsing failed.
    #[error("XML parsing failed: {0}")]
    XmlParse(#[from] roxmltree::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Merge configuration could not be read.
    #[error("Invalid merge configuration: {0}")]
    Config(#[from] serde_yaml_ng::Error),

    /// JSON serialization error.
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for descriptor operations.
pub type Result<T> = std::result::Result<T, DescriptorError>;
