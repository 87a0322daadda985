//! Descriptors: parsed XML trees bound to a dialect.

mod document;
mod identity;
mod version;
mod web_xml;

pub use document::{Descriptor, SectionCount};
pub use identity::{identity_of, IdentityKey};
pub use version::WebAppVersion;
pub use web_xml::{InitParam, WebXml};
