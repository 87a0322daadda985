//! Identity-keyed merge of two element sequences.

use std::collections::HashMap;

use super::strategy::MergeStrategy;
use crate::descriptor::{Descriptor, IdentityKey};
use crate::error::{DescriptorError, Result};
use crate::registry::IdentityRule;
use crate::xml::Element;

/// Merges overlay elements into the children of one parent element of the
/// original descriptor.
///
/// The merge never fails on the shape of the data: elements without an
/// identity are treated as new and inserted. The only error is
/// `CrossDocument`, raised up front when an element list belongs to the
/// wrong descriptor. Overlay elements are imported before insertion.
pub struct ElementMergeSet<'a> {
    original: &'a mut Descriptor,
    overlay: &'a Descriptor,
    parent: Element,
}

impl<'a> ElementMergeSet<'a> {
    /// Create a merge set inserting new elements under `parent`, an element
    /// of `original`.
    pub fn new(original: &'a mut Descriptor, overlay: &'a Descriptor, parent: Element) -> Self {
        Self {
            original,
            overlay,
            parent,
        }
    }

    /// Merge `overlay_elements` (owned by the overlay) into
    /// `original_elements` (owned by the original).
    ///
    /// # Returns
    /// Number of elements inserted, replaced or augmented.
    ///
    /// # Errors
    /// Returns `CrossDocument` if `parent` or an element of
    /// `original_elements` is not owned by the original, or an element of
    /// `overlay_elements` is not owned by the overlay.
    pub fn merge(
        &mut self,
        original_elements: &[Element],
        overlay_elements: &[Element],
        strategy: MergeStrategy,
    ) -> Result<usize> {
        let original = self.original.document();
        let overlay = self.overlay.document();
        if !original.owns(self.parent)
            || !original_elements.iter().all(|&element| original.owns(element))
            || !overlay_elements.iter().all(|&element| overlay.owns(element))
        {
            return Err(DescriptorError::CrossDocument);
        }

        if strategy == MergeStrategy::Ignore {
            return Ok(0);
        }

        let mut lookup: HashMap<IdentityKey, Element> = HashMap::new();
        for &element in original_elements {
            if let Some(key) = self.original.identity(element) {
                lookup.entry(key).or_insert(element);
            }
        }

        let mut changed = 0;
        for &incoming in overlay_elements {
            let key = self.overlay.identity(incoming);
            if key.is_none() {
                tracing::debug!(
                    tag = self.overlay.document().tag_name(incoming),
                    "element has no identity, inserting as new"
                );
            }

            match key.as_ref().and_then(|key| lookup.get(key).copied()) {
                Some(existing) => match strategy {
                    MergeStrategy::Overwrite => {
                        if self.same_content(existing, incoming) {
                            continue;
                        }
                        let copy = self
                            .original
                            .document_mut()
                            .import(self.overlay.document(), incoming);
                        self.original.document_mut().replace(existing, copy)?;
                        if let Some(key) = key {
                            lookup.insert(key, copy);
                        }
                        changed += 1;
                    }
                    MergeStrategy::Augment => {
                        if self.augment(existing, incoming)? {
                            changed += 1;
                        }
                    }
                    MergeStrategy::Preserve | MergeStrategy::Ignore => {}
                },
                None => {
                    let copy = self.insert(self.parent, incoming)?;
                    if let Some(key) = key {
                        lookup.insert(key, copy);
                    }
                    changed += 1;
                }
            }
        }

        Ok(changed)
    }

    fn same_content(&self, existing: Element, incoming: Element) -> bool {
        self.original
            .document()
            .deep_eq(existing, self.overlay.document(), incoming)
    }

    fn insert(&mut self, parent: Element, incoming: Element) -> Result<Element> {
        let copy = self
            .original
            .document_mut()
            .import(self.overlay.document(), incoming);
        self.original.insert_child(parent, copy)?;
        Ok(copy)
    }

    /// Add to `existing` what `incoming` has and `existing` lacks.
    ///
    /// Attributes and text already present in the original win. Identified
    /// children are merged recursively; unidentified children are added
    /// unless a deep-equal child exists.
    fn augment(&mut self, existing: Element, incoming: Element) -> Result<bool> {
        let mut changed = false;

        let missing: Vec<_> = self
            .overlay
            .document()
            .attributes(incoming)
            .iter()
            .filter(|attr| self.original.document().attribute(existing, &attr.name).is_none())
            .cloned()
            .collect();
        for attr in missing {
            self.original
                .document_mut()
                .set_attribute(existing, &attr.name, attr.value);
            changed = true;
        }

        let is_empty = self.original.document().child_nodes(existing).next().is_none();
        if is_empty {
            if let Some(text) = self.overlay.document().trimmed_text(incoming) {
                self.original.document_mut().set_text(existing, text);
                changed = true;
            }
        }

        let overlay: &'a Descriptor = self.overlay;
        let overlay_doc = overlay.document();
        let namespace = overlay_doc.name(incoming).namespace.clone();
        let mut tags: Vec<String> = Vec::new();
        let mut foreign: Vec<Element> = Vec::new();
        for child in overlay_doc.element_children(incoming) {
            let name = overlay_doc.name(child);
            if name.namespace != namespace {
                foreign.push(child);
            } else if !tags.contains(&name.local) {
                tags.push(name.local.clone());
            }
        }

        for tag in &tags {
            let original_children: Vec<_> =
                self.original.document().children(existing, tag).collect();
            let overlay_children: Vec<_> = overlay_doc.children(incoming, tag).collect();

            let identified = self
                .original
                .dialect()
                .get_tag(tag)
                .is_some_and(|spec| spec.identity != IdentityRule::Unidentified);

            if identified {
                let mut nested = ElementMergeSet::new(&mut *self.original, overlay, existing);
                if nested.merge(&original_children, &overlay_children, MergeStrategy::Augment)? > 0 {
                    changed = true;
                }
            } else {
                changed |= self.add_absent(existing, &original_children, &overlay_children)?;
            }
        }

        if !foreign.is_empty() {
            let original_children: Vec<_> =
                self.original.document().element_children(existing).collect();
            changed |= self.add_absent(existing, &original_children, &foreign)?;
        }

        Ok(changed)
    }

    fn add_absent(
        &mut self,
        parent: Element,
        original_children: &[Element],
        overlay_children: &[Element],
    ) -> Result<bool> {
        let mut changed = false;
        for &incoming in overlay_children {
            let present = original_children
                .iter()
                .any(|&child| self.same_content(child, incoming));
            if !present {
                self.insert(parent, incoming)?;
                changed = true;
            }
        }
        Ok(changed)
    }
}
