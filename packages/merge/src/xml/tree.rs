//! Owned, namespace-aware XML tree.
//!
//! A [`Document`] owns every element it contains in an arena. Elements are
//! addressed through copyable [`Element`] handles that remember which document
//! they belong to, so an element can never be attached to a foreign tree
//! without first going through [`Document::import`].

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{DescriptorError, Result};

static NEXT_DOCUMENT_ID: AtomicU64 = AtomicU64::new(1);

/// Namespace reserved for the `xml:` prefix.
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// Identity of a document, shared by all element handles it hands out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentId(u64);

impl DocumentId {
    fn next() -> Self {
        Self(NEXT_DOCUMENT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Namespace-qualified element name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    /// Namespace URI, `None` for elements outside any namespace.
    pub namespace: Option<String>,
    /// Prefix as written in the source, `None` for the default namespace.
    pub prefix: Option<String>,
    /// Local name.
    pub local: String,
}

impl QName {
    /// Create a name without namespace.
    #[must_use]
    pub fn new(local: impl Into<String>) -> Self {
        Self {
            namespace: None,
            prefix: None,
            local: local.into(),
        }
    }

    /// Set the namespace URI.
    #[must_use]
    pub fn with_namespace(mut self, namespace: Option<String>) -> Self {
        self.namespace = namespace;
        self
    }

    /// Set the prefix.
    #[must_use]
    pub fn with_prefix(mut self, prefix: Option<String>) -> Self {
        self.prefix = prefix;
        self
    }

    /// Name as written in XML (`prefix:local` or `local`).
    #[must_use]
    pub fn qualified(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}:{}", self.local),
            None => self.local.clone(),
        }
    }
}

/// Attribute with its name as written (possibly prefixed).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

/// Namespace declaration (`xmlns` or `xmlns:prefix`) carried by an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceDecl {
    pub prefix: Option<String>,
    pub uri: String,
}

/// Handle to an element owned by a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Element {
    document: DocumentId,
    index: usize,
}

impl Element {
    /// Id of the document owning this element.
    #[must_use]
    pub fn document_id(&self) -> DocumentId {
        self.document
    }
}

/// Borrowed view of a child node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRef<'a> {
    Element(Element),
    Text(&'a str),
    Comment(&'a str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Child {
    Element(usize),
    Text(String),
    Comment(String),
}

#[derive(Debug, Clone)]
struct ElementNode {
    name: QName,
    attributes: Vec<Attribute>,
    namespaces: Vec<NamespaceDecl>,
    parent: Option<usize>,
    children: Vec<Child>,
}

impl ElementNode {
    fn new(name: QName) -> Self {
        Self {
            name,
            attributes: Vec::new(),
            namespaces: Vec::new(),
            parent: None,
            children: Vec::new(),
        }
    }
}

/// An owned XML document.
///
/// Detached elements stay in the arena until the document is dropped; they
/// are simply unreachable from the root.
#[derive(Debug)]
pub struct Document {
    id: DocumentId,
    elements: Vec<ElementNode>,
    root: usize,
    doctype: Option<String>,
}

impl Clone for Document {
    /// Cloning yields a new document: handles from the source do not apply.
    fn clone(&self) -> Self {
        Self {
            id: DocumentId::next(),
            elements: self.elements.clone(),
            root: self.root,
            doctype: self.doctype.clone(),
        }
    }
}

impl Document {
    /// Create a document holding only a root element.
    #[must_use]
    pub fn new(root: QName) -> Self {
        Self {
            id: DocumentId::next(),
            elements: vec![ElementNode::new(root)],
            root: 0,
            doctype: None,
        }
    }

    /// Id shared by all element handles of this document.
    #[must_use]
    pub fn id(&self) -> DocumentId {
        self.id
    }

    /// The root element.
    #[must_use]
    pub fn root_element(&self) -> Element {
        self.handle(self.root)
    }

    /// Namespace of the root element.
    #[must_use]
    pub fn default_namespace(&self) -> Option<&str> {
        self.elements[self.root].name.namespace.as_deref()
    }

    /// The DOCTYPE declaration as written in the source.
    #[must_use]
    pub fn doctype(&self) -> Option<&str> {
        self.doctype.as_deref()
    }

    pub fn set_doctype(&mut self, doctype: Option<String>) {
        self.doctype = doctype;
    }

    /// Whether the element belongs to this document.
    #[must_use]
    pub fn owns(&self, element: Element) -> bool {
        element.document == self.id
    }

    fn handle(&self, index: usize) -> Element {
        Element {
            document: self.id,
            index,
        }
    }

    fn index_of(&self, element: Element) -> Result<usize> {
        if self.owns(element) {
            Ok(element.index)
        } else {
            Err(DescriptorError::CrossDocument)
        }
    }

    // Accessors taking a foreign handle would otherwise read or write an
    // unrelated node of this arena.
    fn node(&self, element: Element) -> &ElementNode {
        assert!(self.owns(element), "element used with a foreign document");
        &self.elements[element.index]
    }

    fn node_mut(&mut self, element: Element) -> &mut ElementNode {
        assert!(self.owns(element), "element used with a foreign document");
        &mut self.elements[element.index]
    }

    /// Create a detached element.
    pub fn create_element(&mut self, name: QName) -> Element {
        self.elements.push(ElementNode::new(name));
        self.handle(self.elements.len() - 1)
    }

    /// Create a detached element in the same namespace (and prefix) as `scope`.
    pub fn create_element_like(&mut self, scope: Element, local: &str) -> Element {
        let scope_name = &self.node(scope).name;
        let name = QName::new(local)
            .with_namespace(scope_name.namespace.clone())
            .with_prefix(scope_name.prefix.clone());
        self.create_element(name)
    }

    /// Qualified name of an element.
    #[must_use]
    pub fn name(&self, element: Element) -> &QName {
        &self.node(element).name
    }

    /// Local name of an element.
    #[must_use]
    pub fn tag_name(&self, element: Element) -> &str {
        &self.node(element).name.local
    }

    /// Parent element, `None` for the root and for detached elements.
    #[must_use]
    pub fn parent(&self, element: Element) -> Option<Element> {
        self.node(element).parent.map(|index| self.handle(index))
    }

    /// All child nodes in document order.
    pub fn child_nodes(&self, element: Element) -> impl Iterator<Item = NodeRef<'_>> + '_ {
        self.node(element).children.iter().map(move |child| match child {
            Child::Element(index) => NodeRef::Element(self.handle(*index)),
            Child::Text(text) => NodeRef::Text(text),
            Child::Comment(text) => NodeRef::Comment(text),
        })
    }

    /// All element children in document order.
    pub fn element_children(&self, element: Element) -> impl Iterator<Item = Element> + '_ {
        self.node(element)
            .children
            .iter()
            .filter_map(move |child| match child {
                Child::Element(index) => Some(self.handle(*index)),
                _ => None,
            })
    }

    /// Element children named `tag` in the parent's namespace, in document order.
    ///
    /// The iterator walks the live tree, so calling it again after a mutation
    /// reflects the new state.
    pub fn children<'a>(
        &'a self,
        parent: Element,
        tag: &'a str,
    ) -> impl Iterator<Item = Element> + 'a {
        let namespace = self.node(parent).name.namespace.as_deref();
        self.element_children(parent).filter(move |child| {
            let name = &self.node(*child).name;
            name.local == tag && name.namespace.as_deref() == namespace
        })
    }

    /// First child named `tag`, if any.
    #[must_use]
    pub fn first_child(&self, parent: Element, tag: &str) -> Option<Element> {
        self.children(parent, tag).next()
    }

    /// First child named `tag`, created and appended when missing.
    pub fn child(&mut self, parent: Element, tag: &str) -> Element {
        if let Some(existing) = self.first_child(parent, tag) {
            return existing;
        }
        let created = self.create_element_like(parent, tag);
        self.attach(parent.index, created.index, None);
        created
    }

    /// Follow a slash-separated path of child tags (e.g. `"web-resource-collection/web-resource-name"`).
    #[must_use]
    pub fn find_by_path(&self, element: Element, path: &str) -> Option<Element> {
        let mut current = element;
        for part in path.split('/').filter(|part| !part.is_empty()) {
            current = self.first_child(current, part)?;
        }
        Some(current)
    }

    /// Concatenated text of the element's direct text children.
    #[must_use]
    pub fn text(&self, element: Element) -> Option<String> {
        let mut texts = self
            .node(element)
            .children
            .iter()
            .filter_map(|child| match child {
                Child::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .peekable();
        texts.peek()?;
        Some(texts.collect())
    }

    /// Text content trimmed, `None` when absent or blank.
    #[must_use]
    pub fn trimmed_text(&self, element: Element) -> Option<String> {
        self.text(element)
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
    }

    /// Replace all direct text children with a single text node.
    pub fn set_text(&mut self, element: Element, value: impl Into<String>) {
        let node = self.node_mut(element);
        node.children.retain(|child| !matches!(child, Child::Text(_)));
        node.children.push(Child::Text(value.into()));
    }

    /// Append a text node.
    pub fn append_text(&mut self, element: Element, value: impl Into<String>) {
        self.node_mut(element).children.push(Child::Text(value.into()));
    }

    /// Append a comment node.
    pub fn append_comment(&mut self, element: Element, value: impl Into<String>) {
        self.node_mut(element)
            .children
            .push(Child::Comment(value.into()));
    }

    /// Attribute value by name as written (e.g. `"version"`, `"xsi:schemaLocation"`).
    #[must_use]
    pub fn attribute(&self, element: Element, name: &str) -> Option<&str> {
        self.node(element)
            .attributes
            .iter()
            .find(|attr| attr.name == name)
            .map(|attr| attr.value.as_str())
    }

    /// All attributes in source order.
    #[must_use]
    pub fn attributes(&self, element: Element) -> &[Attribute] {
        &self.node(element).attributes
    }

    /// Set an attribute, replacing an existing value.
    pub fn set_attribute(&mut self, element: Element, name: &str, value: impl Into<String>) {
        let value = value.into();
        let node = self.node_mut(element);
        match node.attributes.iter_mut().find(|attr| attr.name == name) {
            Some(attr) => attr.value = value,
            None => node.attributes.push(Attribute {
                name: name.to_string(),
                value,
            }),
        }
    }

    /// Namespace declarations written on this element.
    #[must_use]
    pub fn namespace_decls(&self, element: Element) -> &[NamespaceDecl] {
        &self.node(element).namespaces
    }

    pub fn add_namespace_decl(&mut self, element: Element, decl: NamespaceDecl) {
        let node = self.node_mut(element);
        if !node.namespaces.contains(&decl) {
            node.namespaces.push(decl);
        }
    }

    fn is_ancestor_or_self(&self, candidate: usize, of: usize) -> bool {
        let mut current = Some(of);
        while let Some(index) = current {
            if index == candidate {
                return true;
            }
            current = self.elements[index].parent;
        }
        false
    }

    fn attach(&mut self, parent: usize, child: usize, before: Option<usize>) {
        debug_assert!(
            !self.is_ancestor_or_self(child, parent),
            "cannot attach an element below itself"
        );
        self.detach_index(child);
        let siblings = &mut self.elements[parent].children;
        let position = before
            .and_then(|reference| {
                siblings
                    .iter()
                    .position(|sibling| *sibling == Child::Element(reference))
            })
            .unwrap_or(siblings.len());
        siblings.insert(position, Child::Element(child));
        self.elements[child].parent = Some(parent);
    }

    fn detach_index(&mut self, index: usize) {
        if let Some(parent) = self.elements[index].parent.take() {
            self.elements[parent]
                .children
                .retain(|child| *child != Child::Element(index));
        }
    }

    /// Append `child` as the last child of `parent`, moving it if attached elsewhere.
    pub fn append_child(&mut self, parent: Element, child: Element) -> Result<()> {
        let parent = self.index_of(parent)?;
        let child = self.index_of(child)?;
        self.attach(parent, child, None);
        Ok(())
    }

    /// Insert `child` before `reference`; appends when `reference` is not a child of `parent`.
    pub fn insert_before(&mut self, parent: Element, child: Element, reference: Element) -> Result<()> {
        let parent = self.index_of(parent)?;
        let child = self.index_of(child)?;
        let reference = self.index_of(reference)?;
        self.attach(parent, child, Some(reference));
        Ok(())
    }

    /// Remove an element from its parent. Detaching a detached element is a no-op.
    pub fn detach(&mut self, element: Element) {
        if self.owns(element) {
            self.detach_index(element.index);
        }
    }

    /// Put `new` at the position of `old` and detach `old`.
    pub fn replace(&mut self, old: Element, new: Element) -> Result<()> {
        let old_index = self.index_of(old)?;
        let new_index = self.index_of(new)?;
        let Some(parent) = self.elements[old_index].parent else {
            return Ok(());
        };
        self.attach(parent, new_index, Some(old_index));
        self.detach_index(old_index);
        Ok(())
    }

    /// Insert `element` under `parent` so that children stay sorted by `order`.
    ///
    /// The element goes right before the first sibling whose tag sorts later;
    /// when there is none it is appended. Tags absent from `order` never sort
    /// later than anything, so unknown siblings stay where they are.
    pub fn insert_preserving_order<S: AsRef<str>>(
        &mut self,
        parent: Element,
        element: Element,
        order: &[S],
    ) -> Result<()> {
        let position_of = |tag: &str| order.iter().position(|name| name.as_ref() == tag);

        let Some(position) = position_of(self.tag_name(element)) else {
            return self.append_child(parent, element);
        };

        let later = self.element_children(parent).find(|sibling| {
            *sibling != element
                && position_of(self.tag_name(*sibling)).is_some_and(|other| other > position)
        });

        match later {
            Some(reference) => self.insert_before(parent, element, reference),
            None => self.append_child(parent, element),
        }
    }

    /// Deep-copy an element of `source` into this document, returning the detached copy.
    ///
    /// Elements in the source's default namespace are moved into this
    /// document's default namespace. Prefixes used inside the subtree but
    /// declared on ancestors in the source are declared on the copy.
    pub fn import(&mut self, source: &Document, element: Element) -> Element {
        let rehome = Rehome {
            from: source.default_namespace().map(str::to_owned),
            to: self.elements[self.root].name.namespace.clone(),
            to_prefix: self.elements[self.root].name.prefix.clone(),
        };
        let copy = self.copy_subtree(source, element.index, &rehome);

        let mut used = HashSet::new();
        let mut declared = HashSet::new();
        source.collect_prefixes(element.index, &rehome, &mut used, &mut declared);

        let root_decls = self.elements[self.root].namespaces.clone();
        for prefix in used.difference(&declared) {
            let Some(uri) = source.lookup_namespace(element.index, prefix) else {
                continue;
            };
            let decl = NamespaceDecl {
                prefix: Some(prefix.clone()),
                uri,
            };
            if !root_decls.contains(&decl) {
                self.elements[copy].namespaces.push(decl);
            }
        }

        self.handle(copy)
    }

    fn copy_subtree(&mut self, source: &Document, index: usize, rehome: &Rehome) -> usize {
        let node = &source.elements[index];
        let mut name = node.name.clone();
        if name.namespace == rehome.from {
            name.namespace = rehome.to.clone();
            name.prefix = rehome.to_prefix.clone();
        }

        let mut copy = ElementNode::new(name);
        copy.attributes = node.attributes.clone();
        copy.namespaces = node
            .namespaces
            .iter()
            .filter(|decl| Some(&decl.uri) != rehome.from.as_ref())
            .cloned()
            .collect();
        self.elements.push(copy);
        let copy_index = self.elements.len() - 1;

        for child in &node.children {
            let copied = match child {
                Child::Element(child_index) => {
                    let child_copy = self.copy_subtree(source, *child_index, rehome);
                    self.elements[child_copy].parent = Some(copy_index);
                    Child::Element(child_copy)
                }
                Child::Text(text) => Child::Text(text.clone()),
                Child::Comment(text) => Child::Comment(text.clone()),
            };
            self.elements[copy_index].children.push(copied);
        }

        copy_index
    }

    fn collect_prefixes(
        &self,
        index: usize,
        rehome: &Rehome,
        used: &mut HashSet<String>,
        declared: &mut HashSet<String>,
    ) {
        let node = &self.elements[index];
        if node.name.namespace != rehome.from {
            if let Some(prefix) = &node.name.prefix {
                used.insert(prefix.clone());
            }
        }
        for attr in &node.attributes {
            if let Some((prefix, _)) = attr.name.split_once(':') {
                if prefix != "xml" && prefix != "xmlns" {
                    used.insert(prefix.to_string());
                }
            }
        }
        for decl in &node.namespaces {
            if let Some(prefix) = &decl.prefix {
                declared.insert(prefix.clone());
            }
        }
        for child in &node.children {
            if let Child::Element(child_index) = child {
                self.collect_prefixes(*child_index, rehome, used, declared);
            }
        }
    }

    fn lookup_namespace(&self, index: usize, prefix: &str) -> Option<String> {
        let mut current = Some(index);
        while let Some(at) = current {
            let node = &self.elements[at];
            if let Some(decl) = node
                .namespaces
                .iter()
                .find(|decl| decl.prefix.as_deref() == Some(prefix))
            {
                return Some(decl.uri.clone());
            }
            current = node.parent;
        }
        None
    }

    /// Structural equality of two subtrees, possibly in different documents.
    ///
    /// Compares namespace and local name, attributes regardless of order,
    /// trimmed text and element children in order. Comments and prefixes are
    /// ignored, and each document's default namespace counts as the same.
    #[must_use]
    pub fn deep_eq(&self, element: Element, other: &Document, other_element: Element) -> bool {
        let left = self.node(element);
        let right = other.node(other_element);

        let left_ns = left.name.namespace.as_deref();
        let right_ns = right.name.namespace.as_deref();
        // Default namespaces correspond to each other, as they do on import.
        let same_namespace = left_ns == right_ns
            || (left_ns == self.default_namespace() && right_ns == other.default_namespace());
        if left.name.local != right.name.local || !same_namespace {
            return false;
        }

        let mut left_attrs = left.attributes.clone();
        let mut right_attrs = right.attributes.clone();
        left_attrs.sort();
        right_attrs.sort();
        if left_attrs != right_attrs {
            return false;
        }

        if self.trimmed_text(element) != other.trimmed_text(other_element) {
            return false;
        }

        let left_children: Vec<_> = self.element_children(element).collect();
        let right_children: Vec<_> = other.element_children(other_element).collect();
        left_children.len() == right_children.len()
            && left_children
                .iter()
                .zip(&right_children)
                .all(|(l, r)| self.deep_eq(*l, other, *r))
    }
}

struct Rehome {
    from: Option<String>,
    to: Option<String>,
    to_prefix: Option<String>,
}
