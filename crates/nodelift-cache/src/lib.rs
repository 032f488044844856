//! Tarball handling for nodelift
//!
//! Registry tarballs are gzipped tar archives whose entries sit under a
//! single top-level directory (`package/`). This crate extracts them with
//! that directory stripped and path traversal rejected, and packs a
//! directory back into the same layout.

pub mod tarball;

// Re-export main types
pub use tarball::{extract_tarball, pack_directory, pack_directory_bytes, ExtractOptions, ExtractSummary, SizeLimitedReader};

use nodelift_core::error::LiftError;

/// Result type for cache operations
pub type CacheResult<T> = Result<T, LiftError>;
