//! Error types and result aliases for nodelift operations.
//!
//! Provides a unified error type that covers range translation, manifest
//! normalization, source rewriting and the registry collaborators, with
//! actionable error messages.

use thiserror::Error;

/// Unified error type for all nodelift operations
#[derive(Error, Debug)]
pub enum LiftError {
    // Translation errors
    #[error("Dependency {specifier} not supported: only github.com git URLs and owner/repo shorthands can be converted")]
    UnsupportedSource { specifier: String },

    #[error("Unable to translate npm version {range} into a target range: {reason}")]
    UntranslatableRange { range: String, reason: String },

    #[error("Invalid version range {range}: {reason}")]
    InvalidRange { range: String, reason: String },

    // Manifest errors
    #[error("Manifest for {package} failed integrity checks: {reason}")]
    ManifestIntegrity { package: String, reason: String },

    #[error("Integrity check failed for {package}: expected {expected}, got {actual}")]
    IntegrityFailure {
        package: String,
        expected: String,
        actual: String,
    },

    // Rewrite errors
    #[error("Failed to rewrite {file}: {message}")]
    Rewrite { file: String, message: String },

    // Config errors
    #[error("Failed to parse {file}: {message}")]
    TomlParse { file: String, message: String },

    #[error("Failed to parse package.json: {message}")]
    JsonParse { message: String },

    #[error("Configuration field '{field}' is invalid: {reason}")]
    ConfigValidation { field: String, reason: String },

    // Registry errors
    #[error("Package '{name}' not found in registry")]
    PackageNotFound { name: String },

    #[error("Invalid authentication details for {registry}")]
    AuthenticationFailed { registry: String },

    #[error("Response too large: {size} bytes exceeds the {limit} byte limit")]
    PayloadTooLarge { size: u64, limit: u64 },

    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    // IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for nodelift operations
pub type LiftResult<T> = Result<T, LiftError>;

impl LiftError {
    /// Create a network error from any error type
    pub fn network<E>(message: String, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Network {
            message,
            source: Some(Box::new(source)),
        }
    }

    /// Create an IO error from std::io::Error
    pub fn io(message: String, source: std::io::Error) -> Self {
        Self::Io { message, source }
    }

    /// Create an untranslatable range error
    pub fn untranslatable(range: &str, reason: impl Into<String>) -> Self {
        Self::UntranslatableRange {
            range: range.to_string(),
            reason: reason.into(),
        }
    }

    /// Create a per-file rewrite error
    pub fn rewrite(file: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Rewrite {
            file: file.into(),
            message: message.into(),
        }
    }

    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        matches!(self, LiftError::Network { .. } | LiftError::Io { .. })
    }

    /// Check if this error only affects a single file of a tree build
    pub fn is_per_file(&self) -> bool {
        matches!(self, LiftError::Rewrite { .. })
    }

    /// Get a user-friendly suggestion for fixing this error
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            LiftError::PackageNotFound { .. } => {
                Some("Check the package name spelling or the configured registry")
            },
            LiftError::AuthenticationFailed { .. } => {
                Some("Run 'nodelift config' to reconfigure your registry credentials")
            },
            LiftError::Network { .. } => Some("Check your internet connection and try again"),
            LiftError::UnsupportedSource { .. } => {
                Some("Publish the dependency to the registry or reference it as owner/repo")
            },
            LiftError::UntranslatableRange { .. } => {
                Some("Override the dependency with an explicit caret or exact version")
            },
            LiftError::IntegrityFailure { .. } | LiftError::ManifestIntegrity { .. } => {
                Some("Clear the lookup cache and fetch the package again")
            },
            _ => None,
        }
    }
}
