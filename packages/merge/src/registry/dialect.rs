//! Tag registry for one descriptor dialect.

use std::collections::HashMap;

use super::types::Tag;
use crate::error::{DescriptorError, Result};

/// The set of legal tags of one descriptor format, their multiplicity,
/// identity rules and the required order of top-level sections.
///
/// A dialect is built once by its `create_*_dialect` function and treated as
/// immutable afterwards; descriptors share it through an `Arc`.
#[derive(Debug, Clone)]
pub struct Dialect {
    key: String,
    root: String,
    namespaces: Vec<String>,
    allow_no_namespace: bool,
    tags: Vec<Tag>,
    index: HashMap<String, usize>,
    sections: Vec<usize>,
}

impl Dialect {
    /// Create an empty dialect for documents rooted at `<root>`.
    #[must_use]
    pub fn new(key: impl Into<String>, root: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            root: root.into(),
            namespaces: Vec::new(),
            allow_no_namespace: true,
            tags: Vec::new(),
            index: HashMap::new(),
            sections: Vec::new(),
        }
    }

    /// Accept documents in these namespaces.
    #[must_use]
    pub fn with_namespaces(mut self, namespaces: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.namespaces = namespaces.into_iter().map(Into::into).collect();
        self
    }

    /// Reject documents whose root is outside every accepted namespace.
    #[must_use]
    pub fn requiring_namespace(mut self) -> Self {
        self.allow_no_namespace = false;
        self
    }

    /// Register a nested tag. Re-registering a name replaces its definition
    /// but keeps any top-level position it already had.
    pub fn register(&mut self, mut tag: Tag) {
        match self.index.get(&tag.name) {
            Some(&existing) => {
                tag.position = self.tags[existing].position;
                self.tags[existing] = tag;
            }
            None => {
                tag.position = None;
                self.index.insert(tag.name.clone(), self.tags.len());
                self.tags.push(tag);
            }
        }
    }

    /// Register a top-level section tag. Sections are ordered by registration.
    pub fn register_section(&mut self, mut tag: Tag) {
        match self.index.get(&tag.name) {
            Some(&existing) => {
                tag.position = match self.tags[existing].position {
                    Some(position) => Some(position),
                    None => {
                        self.sections.push(existing);
                        Some(self.sections.len() - 1)
                    }
                };
                self.tags[existing] = tag;
            }
            None => {
                let slot = self.tags.len();
                self.sections.push(slot);
                tag.position = Some(self.sections.len() - 1);
                self.index.insert(tag.name.clone(), slot);
                self.tags.push(tag);
            }
        }
    }

    /// Key under which the dialect is registered (e.g. `"web-app"`).
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Local name of the root element.
    #[must_use]
    pub fn root_name(&self) -> &str {
        &self.root
    }

    /// Accepted namespaces.
    #[must_use]
    pub fn namespaces(&self) -> &[String] {
        &self.namespaces
    }

    /// Whether a document whose root is in `namespace` belongs to this dialect.
    #[must_use]
    pub fn accepts_namespace(&self, namespace: Option<&str>) -> bool {
        match namespace {
            None => self.allow_no_namespace,
            Some(uri) => self.namespaces.iter().any(|ns| ns == uri),
        }
    }

    /// Look up a tag by name.
    ///
    /// # Errors
    /// Returns `UnknownTag` when the dialect does not define `name`.
    pub fn tag_for(&self, name: &str) -> Result<&Tag> {
        self.get_tag(name).ok_or_else(|| DescriptorError::UnknownTag {
            tag: name.to_string(),
            dialect: self.key.clone(),
        })
    }

    /// Look up a tag by name without failing.
    #[must_use]
    pub fn get_tag(&self, name: &str) -> Option<&Tag> {
        self.index.get(name).map(|&slot| &self.tags[slot])
    }

    /// Check if a tag is defined.
    #[must_use]
    pub fn is_registered(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Check if a tag is a top-level section.
    #[must_use]
    pub fn is_section(&self, name: &str) -> bool {
        self.get_tag(name).is_some_and(Tag::is_top_level)
    }

    /// Top-level section tags in required document order.
    pub fn legal_top_level_order(&self) -> impl Iterator<Item = &Tag> + '_ {
        self.sections.iter().map(|&slot| &self.tags[slot])
    }

    /// Names of the top-level section tags in required document order.
    #[must_use]
    pub fn top_level_names(&self) -> Vec<&str> {
        self.legal_top_level_order()
            .map(|tag| tag.name.as_str())
            .collect()
    }

    /// All registered tags in registration order.
    #[must_use]
    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::IdentityRule;

    fn sample() -> Dialect {
        let mut dialect = Dialect::new("sample", "root");
        dialect.register_section(Tag::new("header"));
        dialect.register_section(Tag::repeatable("item", IdentityRule::child("name")));
        dialect.register(Tag::new("name"));
        dialect.register_section(Tag::new("footer"));
        dialect
    }

    #[test]
    fn test_tag_for_known_and_unknown() {
        let dialect = sample();
        assert!(dialect.tag_for("item").unwrap().multiple);

        let err = dialect.tag_for("itme").unwrap_err();
        assert!(matches!(err, DescriptorError::UnknownTag { ref tag, .. } if tag == "itme"));
    }

    #[test]
    fn test_top_level_order_follows_registration() {
        let dialect = sample();
        assert_eq!(dialect.top_level_names(), vec!["header", "item", "footer"]);

        let positions: Vec<_> = dialect
            .legal_top_level_order()
            .map(|tag| tag.position)
            .collect();
        assert_eq!(positions, vec![Some(0), Some(1), Some(2)]);
    }

    #[test]
    fn test_nested_tag_has_no_position() {
        let dialect = sample();
        assert!(dialect.is_registered("name"));
        assert!(!dialect.is_section("name"));
        assert_eq!(dialect.tag_for("name").unwrap().position, None);
    }

    #[test]
    fn test_reregister_keeps_position() {
        let mut dialect = sample();
        dialect.register(Tag::repeatable("header", IdentityRule::Text));

        let header = dialect.tag_for("header").unwrap();
        assert_eq!(header.position, Some(0));
        assert!(header.multiple);
        assert_eq!(dialect.top_level_names(), vec!["header", "item", "footer"]);
    }

    #[test]
    fn test_accepts_namespace() {
        let dialect = Dialect::new("ns", "root").with_namespaces(["urn:a"]);
        assert!(dialect.accepts_namespace(None));
        assert!(dialect.accepts_namespace(Some("urn:a")));
        assert!(!dialect.accepts_namespace(Some("urn:b")));

        let strict = dialect.requiring_namespace();
        assert!(!strict.accepts_namespace(None));
    }
}
