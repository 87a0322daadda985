//! Descriptor Merge - Merge XML deployment descriptors.
//!
//! This crate reads standard and vendor-specific deployment descriptors
//! (`web.xml`, `resin-web.xml`, Tomcat `context.xml`) into owned,
//! order-sensitive trees and merges an overlay descriptor into an original
//! one, section by section, with a configurable strategy per section.
//!
//! # Example
//!
//! ```
//! use descriptor_merge::{merge_str, MergeConfig};
//!
//! let original = "<web-app><servlet><servlet-name>app</servlet-name>\
//!                 <servlet-class>Old</servlet-class></servlet></web-app>";
//! let overlay = "<web-app><servlet><servlet-name>app</servlet-name>\
//!                <servlet-class>New</servlet-class></servlet></web-app>";
//!
//! let outcome = merge_str(original, overlay, &MergeConfig::default()).unwrap();
//! assert!(outcome.xml.contains("<servlet-class>New</servlet-class>"));
//! assert_eq!(outcome.report.total(), 1);
//! ```
//!
//! # Architecture
//!
//! - [`config`]: Constants and merge configuration
//! - [`error`]: Error types and Result alias
//! - [`xml`]: Owned XML tree, parsing and serialization
//! - [`registry`]: Dialects and their tag registries
//! - [`descriptor`]: Descriptors bound to a dialect, typed `web.xml` access
//! - [`merge`]: Strategies, the element merge set and the section merger
//! - [`service`]: Parse, merge and serialize in one call
//! - [`cli`]: Command-line interface

pub mod cli;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod merge;
pub mod registry;
pub mod service;
pub mod xml;

// Re-export main functions
pub use service::{inspect_file, inspect_str, merge_files, merge_str, Inspection, MergeOutcome};

// Re-export commonly used items
pub use config::MergeConfig;
pub use descriptor::{Descriptor, IdentityKey, WebAppVersion, WebXml};
pub use error::{DescriptorError, Result};
pub use merge::{DescriptorMerger, ElementMergeSet, MergeReport, MergeStrategy, SectionReport};
pub use registry::{
    create_dialect_registry, create_resin_web_dialect, create_tomcat_context_dialect,
    create_web_app_dialect, Dialect, DialectRegistry,
};
