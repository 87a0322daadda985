//! Registry mapping dialect keys to their factories.

use std::sync::Arc;

use super::dialect::Dialect;
use crate::error::{DescriptorError, Result};
use crate::xml::Document;

/// Function building a fresh dialect.
pub type DialectFactory = fn() -> Dialect;

/// Registry of known descriptor dialects.
///
/// Dialects are resolved explicitly by key or by inspecting a document's
/// root element; registration order decides which dialect wins detection.
pub struct DialectRegistry {
    factories: Vec<(String, DialectFactory)>,
}

impl DialectRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            factories: Vec::new(),
        }
    }

    /// Register a factory under a key, replacing any previous one.
    pub fn register(&mut self, key: impl Into<String>, factory: DialectFactory) {
        let key = key.into();
        match self.factories.iter_mut().find(|(existing, _)| *existing == key) {
            Some(entry) => entry.1 = factory,
            None => self.factories.push((key, factory)),
        }
    }

    /// Build the dialect registered under `key`.
    ///
    /// # Errors
    /// Returns `UnknownDialect` if nothing is registered under `key`.
    pub fn create(&self, key: &str) -> Result<Arc<Dialect>> {
        self.factories
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, factory)| Arc::new(factory()))
            .ok_or_else(|| DescriptorError::UnknownDialect(key.to_string()))
    }

    /// Pick the dialect whose root element and namespace match the document.
    ///
    /// # Errors
    /// Returns `UnknownDialect` naming the root element when nothing matches.
    pub fn detect(&self, document: &Document) -> Result<Arc<Dialect>> {
        let root = document.name(document.root_element());
        self.factories
            .iter()
            .map(|(_, factory)| factory())
            .find(|dialect| {
                dialect.root_name() == root.local
                    && dialect.accepts_namespace(root.namespace.as_deref())
            })
            .map(Arc::new)
            .ok_or_else(|| {
                DescriptorError::UnknownDialect(match &root.namespace {
                    Some(ns) => format!("<{}> in namespace {ns}", root.local),
                    None => format!("<{}>", root.local),
                })
            })
    }

    /// Registered keys in registration order.
    #[must_use]
    pub fn keys(&self) -> Vec<&str> {
        self.factories.iter().map(|(key, _)| key.as_str()).collect()
    }

    /// Check if a key is registered.
    #[must_use]
    pub fn has_dialect(&self, key: &str) -> bool {
        self.factories.iter().any(|(existing, _)| existing == key)
    }
}

impl Default for DialectRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Tag;
    use crate::xml::parse_document;

    fn sample() -> Dialect {
        let mut dialect = Dialect::new("sample", "root");
        dialect.register_section(Tag::new("item"));
        dialect
    }

    #[test]
    fn test_registry_register_and_create() {
        let mut registry = DialectRegistry::new();
        registry.register("sample", sample);

        assert!(registry.has_dialect("sample"));
        assert_eq!(registry.create("sample").unwrap().key(), "sample");
        assert!(matches!(
            registry.create("missing"),
            Err(DescriptorError::UnknownDialect(_))
        ));
    }

    #[test]
    fn test_registry_detect() {
        let mut registry = DialectRegistry::new();
        registry.register("sample", sample);

        let doc = parse_document("<root><item/></root>").unwrap();
        assert_eq!(registry.detect(&doc).unwrap().key(), "sample");

        let other = parse_document("<other/>").unwrap();
        let err = registry.detect(&other).unwrap_err();
        assert_eq!(err.to_string(), "Unknown descriptor dialect: <other>");
    }
}
