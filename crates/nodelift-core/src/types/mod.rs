//! Core data types for nodelift.
//!
//! This module provides the fundamental types used throughout the workspace:
//! - Version type for semantic versioning and range arithmetic
//! - Package manifest structures
//! - Normalized dependency targets

pub mod dependency;
pub mod manifest;
pub mod version;

// Re-export all public types
pub use dependency::{DependencySource, DependencyTarget};
pub use manifest::{BrowserField, ManifestDist, PackageManifest};
pub use version::{Version, VersionError};
