//! Identity keys used to match elements across descriptors.

use std::fmt;

use crate::registry::IdentityRule;
use crate::xml::{Document, Element};

/// Semantically meaningful subset of an element's content.
///
/// Each part reads `label=value` (or a bare tag name for singletons and
/// presence checks), so an attribute and a child element carrying the same
/// name produce the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdentityKey(Vec<String>);

impl IdentityKey {
    /// Build a key from its parts.
    #[must_use]
    pub fn new(parts: Vec<String>) -> Self {
        Self(parts)
    }

    /// The parts of the key.
    #[must_use]
    pub fn parts(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(", "))
    }
}

/// Compute the identity of `element` according to `rule`.
///
/// Returns `None` when a part the rule requires is missing or blank; such
/// elements never match anything during a merge.
#[must_use]
pub fn identity_of(
    doc: &Document,
    element: Element,
    rule: &IdentityRule,
) -> Option<IdentityKey> {
    let mut parts = Vec::new();
    collect_parts(doc, element, rule, &mut parts)?;
    Some(IdentityKey(parts))
}

fn collect_parts(
    doc: &Document,
    element: Element,
    rule: &IdentityRule,
    parts: &mut Vec<String>,
) -> Option<()> {
    match rule {
        IdentityRule::Unidentified => None,
        IdentityRule::Singleton => {
            parts.push(doc.tag_name(element).to_string());
            Some(())
        }
        IdentityRule::ChildText(path) => {
            let child = doc.find_by_path(element, path)?;
            let text = doc.trimmed_text(child)?;
            parts.push(format!("{path}={text}"));
            Some(())
        }
        IdentityRule::Attribute(name) => {
            let value = doc.attribute(element, name)?.trim();
            if value.is_empty() {
                return None;
            }
            parts.push(format!("{name}={value}"));
            Some(())
        }
        IdentityRule::Text => {
            parts.push(doc.trimmed_text(element)?);
            Some(())
        }
        IdentityRule::ChildPresence(tags) => {
            let present = tags
                .iter()
                .find(|tag| doc.first_child(element, tag).is_some())?;
            parts.push(present.clone());
            Some(())
        }
        IdentityRule::AttributePresence(names) => {
            let present = names
                .iter()
                .find(|name| doc.attribute(element, name).is_some_and(|v| !v.trim().is_empty()))?;
            parts.push(present.clone());
            Some(())
        }
        IdentityRule::AnyOf(alternatives) => alternatives.iter().find_map(|alternative| {
            let mut attempt = Vec::new();
            collect_parts(doc, element, alternative, &mut attempt)?;
            parts.extend(attempt);
            Some(())
        }),
        IdentityRule::AllOf(required) => {
            for part in required {
                collect_parts(doc, element, part, parts)?;
            }
            Some(())
        }
    }
}
