//! npm range translation for nodelift
//!
//! This crate converts npm version ranges into the caret / tilde / exact
//! syntax of the target loader and normalizes whole dependency maps,
//! including GitHub-hosted references.

pub mod dependency;
pub mod range;
pub mod translate;

// Re-export main types
pub use dependency::{classify_dependency, normalize_dependencies};
pub use range::{parse_range, Comparator, ComparatorSet, Op, PartialVersion, RangeParseError};
pub use translate::{translate, RangeExpression, VersionBound, WILDCARD};
