//! # nodelift-core
//!
//! Core types and utilities shared across all nodelift crates.
//!
//! This crate provides:
//! - Version type with predecessor arithmetic for range translation
//! - PackageManifest and DependencyTarget types for package metadata
//! - LiftError enum for unified error handling
//! - Path and hashing helpers
//!
//! ## Architecture
//!
//! The crate is organized into modules:
//! - `types`: Core data types (Version, PackageManifest, etc.)
//! - `error`: Error types and result aliases
//! - `utils`: Utility functions and helpers

pub mod error;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use error::{LiftError, LiftResult};
pub use types::{
    BrowserField, DependencySource, DependencyTarget, ManifestDist, PackageManifest, Version,
};
