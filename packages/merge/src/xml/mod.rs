//! Owned XML tree model plus parsing and serialization.
//!
//! Parsing goes through roxmltree and produces a [`Document`] that can be
//! mutated freely; [`write_document`] turns it back into text.

mod parse;
mod tree;
mod writer;

pub use parse::parse_document;
pub use tree::{
    Attribute, Document, DocumentId, Element, NamespaceDecl, NodeRef, QName, XML_NAMESPACE,
};
pub use writer::{escape_attribute, escape_text, write_document};
