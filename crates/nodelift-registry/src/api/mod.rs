//! npm registry API response types

use indexmap::IndexMap;
use nodelift_core::types::PackageManifest;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Published versions keyed by version string, in registry order
pub type VersionMap = IndexMap<String, VersionEntry>;

/// A published version that carries a checksum
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionEntry {
    /// `dist.shasum` of the version's tarball
    pub hash: String,
    /// The version's package.json as published
    pub meta: PackageManifest,
}

/// Result of a registry lookup
#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
    Found { versions: VersionMap },
    NotFound,
}

impl LookupOutcome {
    pub fn versions(&self) -> Option<&VersionMap> {
        match self {
            LookupOutcome::Found { versions } => Some(versions),
            LookupOutcome::NotFound => None,
        }
    }
}

/// Result of checking credentials against a registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialCheck {
    Authorized,
    Unauthorized,
    UnexpectedStatus(u16),
}

/// Full package document, only the part nodelift reads
#[derive(Debug, Deserialize)]
pub(crate) struct PackageDocument {
    #[serde(default)]
    pub versions: IndexMap<String, Value>,
}

impl PackageDocument {
    /// Keep versions with a `dist.shasum`, dropping manifests that do not parse
    pub fn into_versions(self) -> VersionMap {
        let mut versions = VersionMap::with_capacity(self.versions.len());

        for (version, raw) in self.versions {
            let Some(hash) = raw
                .pointer("/dist/shasum")
                .and_then(Value::as_str)
                .filter(|hash| !hash.is_empty())
                .map(str::to_string)
            else {
                continue;
            };

            match serde_json::from_value::<PackageManifest>(raw) {
                Ok(meta) => {
                    versions.insert(version, VersionEntry { hash, meta });
                },
                Err(e) => debug!("skipping version {}: {}", version, e),
            }
        }

        versions
    }
}
