//! Tag registry: the legal tags of each descriptor dialect.
//!
//! A [`Dialect`] lists the tags a descriptor format allows, whether each may
//! repeat, how elements are identified during merges and the order in which
//! top-level sections must appear. Dialects are plain values built by the
//! `create_*_dialect` functions and resolved through a [`DialectRegistry`].

mod config;
mod core;
mod dialect;
pub mod dialects;
mod types;

pub use config::create_dialect_registry;
pub use core::{DialectFactory, DialectRegistry};
pub use dialect::Dialect;
pub use dialects::{create_resin_web_dialect, create_tomcat_context_dialect, create_web_app_dialect};
pub use types::{IdentityRule, Tag};
