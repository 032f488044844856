//! Package manifest types.
//!
//! Defines the package.json shape consumed from the registry and produced
//! after normalization. Fields the normalizer does not touch are carried
//! through verbatim in `extra`.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Package manifest (package.json) as read from the registry or disk
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PackageManifest {
    /// Package name
    #[serde(default)]
    pub name: String,

    /// Package version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Main entry point
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main: Option<String>,

    /// Runtime dependencies
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub dependencies: IndexMap<String, String>,

    /// Peer dependencies
    #[serde(
        default,
        rename = "peerDependencies",
        skip_serializing_if = "IndexMap::is_empty"
    )]
    pub peer_dependencies: IndexMap<String, String>,

    /// Browser override: a replacement main or a module alias object
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub browser: Option<BrowserField>,

    /// Files that must not be rewritten
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shim: Option<IndexMap<String, Value>>,

    /// Module format tag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// Loader map configuration
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub map: IndexMap<String, Value>,

    /// Registry the package was imported from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registry: Option<String>,

    /// Directory layout hints
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directories: Option<Value>,

    /// Published file list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<Value>,

    /// Ignore list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore: Option<Value>,

    /// Distribution information
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dist: Option<ManifestDist>,

    /// Every other field, preserved as-is
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The `browser` field: either a string or an object of overrides
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BrowserField {
    /// Replacement for `main`
    Main(String),
    /// Module path overrides; values are strings or `false`
    Overrides(IndexMap<String, Value>),
}

/// Distribution information for a published version
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ManifestDist {
    /// SHA-1 checksum of the tarball
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shasum: Option<String>,

    /// Tarball download URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tarball: Option<String>,

    /// Subresource integrity hash
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integrity: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PackageManifest {
    /// Create a manifest with a name and version
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: Some(version.into()),
            ..Default::default()
        }
    }

    /// Main entry point with `./` and `.js` removed, defaulting to `index`
    pub fn main_module(&self) -> String {
        let main = self.main.as_deref().unwrap_or("index");
        let main = crate::utils::path::strip_js_extension(main);
        main.strip_prefix("./").unwrap_or(main).to_string()
    }

    /// Object form of the `browser` field, if any
    pub fn browser_overrides(&self) -> Option<&IndexMap<String, Value>> {
        match &self.browser {
            Some(BrowserField::Overrides(map)) => Some(map),
            _ => None,
        }
    }

    /// The published checksum, if present
    pub fn shasum(&self) -> Option<&str> {
        self.dist.as_ref().and_then(|dist| dist.shasum.as_deref())
    }

    /// Check whether a package-relative module is excluded from rewriting
    pub fn is_shimmed(&self, module: &str) -> bool {
        self.shim
            .as_ref()
            .map_or(false, |shim| shim.contains_key(module))
    }
}
