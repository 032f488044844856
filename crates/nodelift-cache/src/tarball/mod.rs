//! Tarball extraction and packing utilities

pub mod create;
pub mod extract;
pub mod limit;

// Re-export main functions
pub use create::{pack_directory, pack_directory_bytes};
pub use extract::{extract_tarball, ExtractOptions, ExtractSummary};
pub use limit::SizeLimitedReader;
