//! A parsed descriptor bound to its dialect.

use std::sync::Arc;

use super::identity::{identity_of, IdentityKey};
use crate::error::{DescriptorError, Result};
use crate::registry::{Dialect, Tag};
use crate::xml::{parse_document, write_document, Document, Element, NamespaceDecl, QName};

/// A deployment descriptor: an owned XML tree plus the dialect describing it.
///
/// The root element is guaranteed to match the dialect's root name and one of
/// its accepted namespaces.
#[derive(Debug, Clone)]
pub struct Descriptor {
    document: Document,
    dialect: Arc<Dialect>,
}

/// Number of top-level elements of one section.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SectionCount {
    pub section: String,
    pub count: usize,
}

impl Descriptor {
    /// Create an empty descriptor holding only the root element.
    ///
    /// Dialects that require a namespace get their first accepted namespace
    /// as the default namespace of the new document.
    #[must_use]
    pub fn new(dialect: Arc<Dialect>) -> Self {
        let namespace = if dialect.accepts_namespace(None) {
            None
        } else {
            dialect.namespaces().first().cloned()
        };
        let mut document =
            Document::new(QName::new(dialect.root_name()).with_namespace(namespace.clone()));
        if let Some(uri) = namespace {
            let root = document.root_element();
            document.add_namespace_decl(root, NamespaceDecl { prefix: None, uri });
        }
        Self { document, dialect }
    }

    /// Parse XML text as a descriptor of `dialect`.
    ///
    /// # Errors
    /// Returns `XmlParse` for malformed XML and `RootMismatch` when the root
    /// element does not belong to the dialect.
    pub fn parse(xml: &str, dialect: Arc<Dialect>) -> Result<Self> {
        Self::from_document(parse_document(xml)?, dialect)
    }

    /// Bind an already parsed document to `dialect`.
    ///
    /// # Errors
    /// Returns `RootMismatch` when the root element does not belong to the dialect.
    pub fn from_document(document: Document, dialect: Arc<Dialect>) -> Result<Self> {
        let root = document.name(document.root_element());
        if root.local != dialect.root_name() || !dialect.accepts_namespace(root.namespace.as_deref())
        {
            return Err(DescriptorError::RootMismatch {
                expected: dialect.root_name().to_string(),
                found: match &root.namespace {
                    Some(ns) => format!("{} ({ns})", root.local),
                    None => root.local.clone(),
                },
            });
        }
        Ok(Self { document, dialect })
    }

    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    #[must_use]
    pub fn dialect(&self) -> &Arc<Dialect> {
        &self.dialect
    }

    #[must_use]
    pub fn root(&self) -> Element {
        self.document.root_element()
    }

    /// Look up a tag in this descriptor's dialect.
    ///
    /// # Errors
    /// Returns `UnknownTag` when the dialect does not define `tag`.
    pub fn tag_for(&self, tag: &str) -> Result<&Tag> {
        self.dialect.tag_for(tag)
    }

    /// Top-level elements named `tag`, in document order.
    ///
    /// A section absent from the document is an empty list.
    ///
    /// # Errors
    /// Returns `UnknownTag` when the dialect does not define `tag`.
    pub fn elements(&self, tag: &str) -> Result<Vec<Element>> {
        self.children_of(self.root(), tag)
    }

    /// Top-level elements of a section. Same as [`Descriptor::elements`].
    ///
    /// # Errors
    /// Returns `UnknownTag` when the dialect does not define `tag`.
    pub fn section(&self, tag: &str) -> Result<Vec<Element>> {
        self.elements(tag)
    }

    /// Children of `parent` named `tag`, in document order.
    ///
    /// # Errors
    /// Returns `UnknownTag` when the dialect does not define `tag`.
    pub fn children_of(&self, parent: Element, tag: &str) -> Result<Vec<Element>> {
        self.dialect.tag_for(tag)?;
        Ok(self.document.children(parent, tag).collect())
    }

    /// Identity key of an element, derived from its tag's identity rule.
    ///
    /// Returns `None` for tags outside the dialect and for elements missing
    /// the content their rule requires.
    #[must_use]
    pub fn identity(&self, element: Element) -> Option<IdentityKey> {
        let name = self.document.tag_name(element);
        let Some(tag) = self.dialect.get_tag(name) else {
            tracing::debug!(tag = name, dialect = self.dialect.key(), "no identity for unregistered tag");
            return None;
        };
        identity_of(&self.document, element, &tag.identity)
    }

    /// Insert a detached element under the root, keeping the dialect's
    /// top-level section order.
    ///
    /// # Errors
    /// Returns `CrossDocument` when the element belongs to another document.
    pub fn insert_top_level(&mut self, element: Element) -> Result<()> {
        let order = self.dialect.top_level_names();
        let root = self.document.root_element();
        self.document.insert_preserving_order(root, element, &order)
    }

    /// Insert a detached element under `parent`.
    ///
    /// Under the root the top-level order applies; elsewhere the parent tag's
    /// child order, if the dialect defines one. Without an order the element
    /// is appended.
    ///
    /// # Errors
    /// Returns `CrossDocument` when either element belongs to another document.
    pub fn insert_child(&mut self, parent: Element, element: Element) -> Result<()> {
        if parent == self.root() {
            return self.insert_top_level(element);
        }
        let order = self
            .dialect
            .get_tag(self.document.tag_name(parent))
            .map(|tag| tag.child_order.as_slice())
            .unwrap_or_default();
        if order.is_empty() {
            self.document.append_child(parent, element)
        } else {
            self.document.insert_preserving_order(parent, element, order)
        }
    }

    /// Serialize the descriptor to XML text.
    #[must_use]
    pub fn to_xml(&self) -> String {
        write_document(&self.document)
    }

    /// Element counts of the sections present in the document, in the
    /// dialect's top-level order.
    #[must_use]
    pub fn section_counts(&self) -> Vec<SectionCount> {
        let root = self.root();
        self.dialect
            .legal_top_level_order()
            .filter_map(|tag| {
                let count = self.document.children(root, &tag.name).count();
                (count > 0).then(|| SectionCount {
                    section: tag.name.clone(),
                    count,
                })
            })
            .collect()
    }

    /// Qualified names of root children that are not sections of the dialect.
    ///
    /// Such elements are kept on serialization but never merged.
    #[must_use]
    pub fn unknown_elements(&self) -> Vec<String> {
        let root = self.root();
        let namespace = self.document.name(root).namespace.clone();
        self.document
            .element_children(root)
            .filter(|child| {
                let name = self.document.name(*child);
                name.namespace != namespace || !self.dialect.is_section(&name.local)
            })
            .map(|child| self.document.name(child).qualified())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{create_resin_web_dialect, create_tomcat_context_dialect, create_web_app_dialect};
    use pretty_assertions::assert_eq;

    fn web_app(xml: &str) -> Descriptor {
        Descriptor::parse(xml, Arc::new(create_web_app_dialect())).unwrap()
    }

    #[test]
    fn test_parse_validates_root() {
        let err = Descriptor::parse("<Context/>", Arc::new(create_web_app_dialect())).unwrap_err();
        assert!(matches!(err, DescriptorError::RootMismatch { ref found, .. } if found == "Context"));

        let err = Descriptor::parse("<web-app/>", Arc::new(create_resin_web_dialect())).unwrap_err();
        assert!(matches!(err, DescriptorError::RootMismatch { .. }));
    }

    #[test]
    fn test_elements_of_missing_section_is_empty() {
        let descriptor = web_app("<web-app><display-name>x</display-name></web-app>");
        assert!(descriptor.elements("servlet").unwrap().is_empty());
        assert_eq!(descriptor.elements("display-name").unwrap().len(), 1);
    }

    #[test]
    fn test_elements_rejects_unknown_tag() {
        let descriptor = web_app("<web-app/>");
        assert!(matches!(
            descriptor.elements("servlett"),
            Err(DescriptorError::UnknownTag { .. })
        ));
    }

    #[test]
    fn test_elements_respect_namespace() {
        let descriptor = web_app(
            r#"<web-app xmlns="http://java.sun.com/xml/ns/javaee" xmlns:o="urn:other">
                 <servlet><servlet-name>a</servlet-name></servlet>
                 <o:servlet/>
               </web-app>"#,
        );
        assert_eq!(descriptor.elements("servlet").unwrap().len(), 1);
        assert_eq!(descriptor.unknown_elements(), vec!["o:servlet".to_string()]);
    }

    #[test]
    fn test_identity_of_servlet() {
        let descriptor = web_app(
            "<web-app><servlet><servlet-name>app</servlet-name></servlet><servlet/></web-app>",
        );
        let servlets = descriptor.elements("servlet").unwrap();
        assert_eq!(
            descriptor.identity(servlets[0]).unwrap().to_string(),
            "servlet-name=app"
        );
        assert_eq!(descriptor.identity(servlets[1]), None);
    }

    #[test]
    fn test_insert_top_level_keeps_order() {
        let mut descriptor = web_app(
            "<web-app><context-param><param-name>a</param-name></context-param><servlet/></web-app>",
        );
        let root = descriptor.root();
        let filter = descriptor.document_mut().create_element_like(root, "filter");
        descriptor.insert_top_level(filter).unwrap();

        let names: Vec<_> = descriptor
            .document()
            .element_children(root)
            .map(|child| descriptor.document().tag_name(child).to_string())
            .collect();
        assert_eq!(names, vec!["context-param", "filter", "servlet"]);
    }

    #[test]
    fn test_insert_child_uses_child_order() {
        let mut descriptor = web_app(
            "<web-app><servlet><servlet-name>a</servlet-name><load-on-startup>1</load-on-startup></servlet></web-app>",
        );
        let servlet = descriptor.elements("servlet").unwrap()[0];
        let class = descriptor.document_mut().create_element_like(servlet, "servlet-class");
        descriptor.insert_child(servlet, class).unwrap();

        let names: Vec<_> = descriptor
            .document()
            .element_children(servlet)
            .map(|child| descriptor.document().tag_name(child).to_string())
            .collect();
        assert_eq!(names, vec!["servlet-name", "servlet-class", "load-on-startup"]);
    }

    #[test]
    fn test_new_descriptor_uses_required_namespace() {
        let resin = Descriptor::new(Arc::new(create_resin_web_dialect()));
        assert_eq!(
            resin.to_xml(),
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<web-app xmlns=\"http://caucho.com/ns/resin\"/>\n"
        );

        let tomcat = Descriptor::new(Arc::new(create_tomcat_context_dialect()));
        assert_eq!(tomcat.document().default_namespace(), None);
    }

    #[test]
    fn test_section_counts() {
        let descriptor = web_app(
            r"<web-app>
                <servlet><servlet-name>a</servlet-name></servlet>
                <context-param><param-name>p</param-name></context-param>
                <servlet><servlet-name>b</servlet-name></servlet>
              </web-app>",
        );
        assert_eq!(
            descriptor.section_counts(),
            vec![
                SectionCount { section: "context-param".to_string(), count: 1 },
                SectionCount { section: "servlet".to_string(), count: 2 },
            ]
        );
    }
}
