//! Utility functions and helpers.
//!
//! Common functionality used across multiple nodelift crates.

pub mod hash;
pub mod path;

// Re-export commonly used utilities
pub use hash::{sha1_hex, verify_shasum};
pub use path::{is_safe_path, normalize_path, relative_module_path, strip_js_extension};
