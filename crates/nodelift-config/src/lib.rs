//! Configuration parsing for nodelift
//!
//! This crate handles the endpoint configuration file (`nodelift.toml`),
//! registry credentials, `.npmrc` fallbacks, and reading and writing
//! package.json manifests.

pub mod credentials;
pub mod json;
pub mod merge;
pub mod toml;

// Re-export main types
pub use credentials::{decode_credentials, encode_credentials, Credentials};
pub use merge::{ConfigLoader, ConfigSource, NpmrcSettings};
pub use toml::{BuildSection, EndpointSection, NodeliftToml, ShimSection};

use nodelift_core::error::LiftError;

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, LiftError>;
