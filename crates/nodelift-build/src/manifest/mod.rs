//! package.json normalization
//!
//! Rewrites a registry manifest into target form: dependencies translated,
//! the shim package added, defaults filled in, npm-only fields dropped, and
//! the `browser` object split into `map` entries (bare keys and `false`
//! values) and an [`AliasTable`] (package-relative string mappings) used
//! later by the rewriter.

use std::sync::Arc;

use indexmap::IndexMap;
use nodelift_core::error::{LiftError, LiftResult};
use nodelift_core::types::{BrowserField, PackageManifest};
use nodelift_core::utils::strip_js_extension;
use nodelift_semver::normalize_dependencies;
use serde_json::Value;
use tracing::debug;

use crate::shim::{ShimConfig, NODELIBS_DEPENDENCY};

/// Target for modules the browser field maps to `false`
pub const EMPTY_MODULE: &str = "@empty";

/// Legacy CommonJS format tag
pub const CJS_FORMAT: &str = "cjs";

/// Endpoint name used when the manifest does not record one
pub const DEFAULT_REGISTRY_NAME: &str = "npm";

/// Package-relative module aliases taken from the `browser` object
///
/// Keys have `./` and `.js` removed (`lib/node`); values keep a leading
/// `./` when relative and have `.js` removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasTable {
    entries: IndexMap<String, String>,
}

impl AliasTable {
    /// Collect the relative, string-valued entries of a browser object
    pub fn from_browser(browser: &IndexMap<String, Value>) -> Self {
        let mut entries = IndexMap::new();

        for (key, value) in browser {
            let (Some(module), Some(target)) = (key.strip_prefix("./"), value.as_str()) else {
                continue;
            };
            entries.insert(
                strip_js_extension(module).to_string(),
                strip_js_extension(target).to_string(),
            );
        }

        Self { entries }
    }

    pub fn get(&self, module: &str) -> Option<&str> {
        self.entries.get(module).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A normalized manifest and the alias table derived from it
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedManifest {
    pub manifest: PackageManifest,
    pub aliases: Arc<AliasTable>,
}

/// Manifest normalizer with its shim settings and endpoint name
#[derive(Debug, Clone)]
pub struct ManifestNormalizer {
    shim: Arc<ShimConfig>,
    registry_name: String,
}

impl Default for ManifestNormalizer {
    fn default() -> Self {
        Self::new(Arc::new(ShimConfig::default()), DEFAULT_REGISTRY_NAME)
    }
}

impl ManifestNormalizer {
    pub fn new(shim: Arc<ShimConfig>, registry_name: impl Into<String>) -> Self {
        Self {
            shim,
            registry_name: registry_name.into(),
        }
    }

    /// Normalize a manifest in place and build its alias table
    pub fn normalize(&self, mut manifest: PackageManifest) -> LiftResult<NormalizedManifest> {
        if manifest.name.trim().is_empty() {
            return Err(LiftError::ManifestIntegrity {
                package: "<unnamed>".to_string(),
                reason: "package.json has no name".to_string(),
            });
        }

        // Peer dependencies are plain dependencies for the loader
        let mut merged = std::mem::take(&mut manifest.dependencies);
        for (name, range) in &manifest.peer_dependencies {
            merged.entry(name.clone()).or_insert_with(|| range.clone());
        }

        let mut dependencies = normalize_dependencies(&merged)?;
        dependencies.insert(NODELIBS_DEPENDENCY.to_string(), self.shim.namespace().to_string());
        manifest.dependencies = dependencies;

        manifest
            .registry
            .get_or_insert_with(|| self.registry_name.clone());
        manifest.format.get_or_insert_with(|| CJS_FORMAT.to_string());

        manifest.directories = None;
        manifest.files = None;
        manifest.ignore = None;

        let aliases = match &manifest.browser {
            Some(BrowserField::Main(main)) => {
                manifest.main = Some(main.clone());
                AliasTable::default()
            },
            Some(BrowserField::Overrides(browser)) => {
                merge_browser_map(&mut manifest.map, browser);
                AliasTable::from_browser(browser)
            },
            None => AliasTable::default(),
        };

        debug!(
            "normalized {}: {} dependencies, {} map entries, {} aliases",
            manifest.name,
            manifest.dependencies.len(),
            manifest.map.len(),
            aliases.len()
        );

        Ok(NormalizedManifest {
            manifest,
            aliases: Arc::new(aliases),
        })
    }
}

/// Normalize a manifest with the default shim settings
pub fn normalize_manifest(manifest: PackageManifest) -> LiftResult<NormalizedManifest> {
    ManifestNormalizer::default().normalize(manifest)
}

/// Add browser overrides to `map`; existing entries win
///
/// Relative string mappings are left to the [`AliasTable`]. A `false` value
/// maps its key, relative or bare, to the empty module.
fn merge_browser_map(map: &mut IndexMap<String, Value>, browser: &IndexMap<String, Value>) {
    for (key, value) in browser {
        let (key, target) = match value {
            Value::Bool(false) => (key.as_str(), EMPTY_MODULE),
            Value::String(_) if key.starts_with("./") => continue,
            Value::String(target) => (strip_js_extension(key), strip_js_extension(target)),
            _ => continue,
        };

        map.entry(key.to_string())
            .or_insert_with(|| Value::String(target.to_string()));
    }
}
