//! npm registry client for nodelift
//!
//! Looks up the published versions of a package (with an on-disk ETag
//! cache), validates version manifests against the lookup hash, and
//! downloads and extracts tarballs with size and checksum limits.

pub mod api;
pub mod cache;
pub mod client;

// Re-export main types
pub use api::{CredentialCheck, LookupOutcome, VersionEntry, VersionMap};
pub use cache::{CachedLookup, LookupCache};
pub use client::{RegistryClient, RetryConfig};

use nodelift_core::error::LiftError;

/// Result type for registry operations
pub type RegistryResult<T> = Result<T, LiftError>;
