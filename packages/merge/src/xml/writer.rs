//! Serialization of an owned [`Document`] back to XML text.

use super::tree::{Document, Element, NodeRef};
use crate::config::{INDENT, XML_DECLARATION};

/// Serialize a document with an XML declaration, the original DOCTYPE and
/// two-space indentation.
///
/// # Examples
/// ```
/// use descriptor_merge::xml::{parse_document, write_document};
///
/// let doc = parse_document("<web-app><display-name>app</display-name></web-app>").unwrap();
/// let xml = write_document(&doc);
/// assert!(xml.contains("  <display-name>app</display-name>\n"));
/// ```
#[must_use]
pub fn write_document(doc: &Document) -> String {
    let mut out = String::new();
    out.push_str(XML_DECLARATION);
    out.push('\n');
    if let Some(doctype) = doc.doctype() {
        out.push_str(doctype);
        out.push('\n');
    }
    write_element(doc, doc.root_element(), 0, &mut out);
    out
}

fn write_element(doc: &Document, element: Element, depth: usize, out: &mut String) {
    let indent = INDENT.repeat(depth);
    let name = doc.name(element).qualified();

    out.push_str(&indent);
    out.push('<');
    out.push_str(&name);
    for decl in doc.namespace_decls(element) {
        match &decl.prefix {
            Some(prefix) => out.push_str(&format!(" xmlns:{prefix}=\"{}\"", escape_attribute(&decl.uri))),
            None => out.push_str(&format!(" xmlns=\"{}\"", escape_attribute(&decl.uri))),
        }
    }
    for attr in doc.attributes(element) {
        out.push_str(&format!(" {}=\"{}\"", attr.name, escape_attribute(&attr.value)));
    }

    let nodes: Vec<NodeRef<'_>> = doc.child_nodes(element).collect();
    match nodes.as_slice() {
        [] => out.push_str("/>\n"),
        [NodeRef::Text(text)] => {
            out.push('>');
            out.push_str(&escape_text(text));
            out.push_str(&format!("</{name}>\n"));
        }
        _ => {
            out.push_str(">\n");
            let child_indent = INDENT.repeat(depth + 1);
            for node in nodes.iter().copied() {
                match node {
                    NodeRef::Element(child) => write_element(doc, child, depth + 1, out),
                    NodeRef::Text(text) => {
                        out.push_str(&child_indent);
                        out.push_str(&escape_text(text.trim()));
                        out.push('\n');
                    }
                    NodeRef::Comment(text) => {
                        out.push_str(&child_indent);
                        out.push_str(&format!("<!--{text}-->\n"));
                    }
                }
            }
            out.push_str(&indent);
            out.push_str(&format!("</{name}>\n"));
        }
    }
}

/// Escape character data.
#[must_use]
pub fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Escape an attribute value for use inside double quotes.
#[must_use]
pub fn escape_attribute(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '"' => escaped.push_str("&quot;"),
            '\n' => escaped.push_str("&#10;"),
            '\t' => escaped.push_str("&#9;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
