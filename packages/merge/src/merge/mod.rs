//! Merging overlay descriptors into original descriptors.

mod merge_set;
mod merger;
mod strategy;

pub use merge_set::ElementMergeSet;
pub use merger::{DescriptorMerger, MergeReport, SectionReport};
pub use strategy::MergeStrategy;
