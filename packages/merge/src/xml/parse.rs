//! Conversion of XML text into an owned [`Document`] using roxmltree.

use roxmltree::{Node, ParsingOptions};

use super::tree::{Attribute, Document, Element, NamespaceDecl, QName, XML_NAMESPACE};
use crate::error::Result;

/// Parse XML text into an owned document.
///
/// DTDs are allowed so that DOCTYPE-based descriptors (Servlet 2.2/2.3)
/// parse; the declaration itself is kept verbatim. Whitespace-only text is
/// dropped, comments inside the root element are kept.
///
/// # Examples
/// ```
/// use descriptor_merge::xml::parse_document;
///
/// let doc = parse_document("<web-app><display-name>app</display-name></web-app>").unwrap();
/// let root = doc.root_element();
/// let name = doc.first_child(root, "display-name").unwrap();
/// assert_eq!(doc.text(name).as_deref(), Some("app"));
/// ```
pub fn parse_document(text: &str) -> Result<Document> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    let xml = roxmltree::Document::parse_with_options(text, options)?;
    let root = xml.root_element();

    let mut document = Document::new(qualified_name(root));
    let target = document.root_element();
    copy_element_data(&mut document, target, root);
    copy_children(&mut document, target, root)?;
    document.set_doctype(extract_doctype(&text[..root.range().start]));

    Ok(document)
}

fn qualified_name(node: Node<'_, '_>) -> QName {
    let tag = node.tag_name();
    let namespace = tag.namespace().map(str::to_owned);
    let prefix = tag
        .namespace()
        .and_then(|uri| node.lookup_prefix(uri))
        .filter(|prefix| !prefix.is_empty())
        .map(str::to_owned);
    QName::new(tag.name())
        .with_namespace(namespace)
        .with_prefix(prefix)
}

fn copy_element_data(document: &mut Document, target: Element, node: Node<'_, '_>) {
    for decl in declared_namespaces(node) {
        document.add_namespace_decl(target, decl);
    }

    for attr in node.attributes() {
        let name = match attr.namespace() {
            Some(XML_NAMESPACE) => format!("xml:{}", attr.name()),
            Some(uri) => match node.lookup_prefix(uri).filter(|prefix| !prefix.is_empty()) {
                Some(prefix) => format!("{prefix}:{}", attr.name()),
                None => attr.name().to_string(),
            },
            None => attr.name().to_string(),
        };
        document.set_attribute(target, &name, attr.value());
    }
}

fn copy_children(document: &mut Document, target: Element, node: Node<'_, '_>) -> Result<()> {
    for child in node.children() {
        if child.is_element() {
            let element = document.create_element(qualified_name(child));
            copy_element_data(document, element, child);
            document.append_child(target, element)?;
            copy_children(document, element, child)?;
        } else if child.is_text() {
            if let Some(text) = child.text() {
                if !text.trim().is_empty() {
                    document.append_text(target, text);
                }
            }
        } else if child.is_comment() {
            if let Some(text) = child.text() {
                document.append_comment(target, text);
            }
        }
    }
    Ok(())
}

/// Namespace declarations written on `node` itself.
///
/// roxmltree reports every namespace in scope, so declarations inherited
/// from the parent are filtered out.
fn declared_namespaces(node: Node<'_, '_>) -> Vec<NamespaceDecl> {
    let inherited: Vec<(Option<&str>, &str)> = node
        .parent_element()
        .map(|parent| {
            parent
                .namespaces()
                .map(|ns| (ns.name(), ns.uri()))
                .collect()
        })
        .unwrap_or_default();

    node.namespaces()
        .filter(|ns| ns.name() != Some("xml") && ns.uri() != XML_NAMESPACE)
        .filter(|ns| !inherited.contains(&(ns.name(), ns.uri())))
        .map(|ns| NamespaceDecl {
            prefix: ns.name().map(str::to_owned),
            uri: ns.uri().to_string(),
        })
        .collect()
}

/// Locate a `<!DOCTYPE ...>` declaration in the prolog.
///
/// Quoted literals and an internal subset (`[...]`) may contain `>`, so the
/// scan tracks both before accepting the closing bracket.
fn extract_doctype(prolog: &str) -> Option<String> {
    let start = prolog.find("<!DOCTYPE")?;
    let mut quote: Option<char> = None;
    let mut subset_depth = 0usize;

    for (offset, ch) in prolog[start..].char_indices() {
        if let Some(open) = quote {
            if ch == open {
                quote = None;
            }
            continue;
        }
        match ch {
            '"' | '\'' => quote = Some(ch),
            '[' => subset_depth += 1,
            ']' => subset_depth = subset_depth.saturating_sub(1),
            '>' if subset_depth == 0 => {
                return Some(prolog[start..start + offset + 1].to_string());
            }
            _ => {}
        }
    }
    None
}
