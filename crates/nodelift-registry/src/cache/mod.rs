//! On-disk lookup cache keyed by package name
//!
//! Each package gets `<dir>/<encoded-name>.json` holding the last `ETag`
//! and the versions returned with it. Entries are also kept in memory so
//! repeated lookups within one process do not touch the disk.

use std::path::{Path, PathBuf};

use dashmap::DashMap;
use nodelift_core::error::LiftError;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::api::VersionMap;
use crate::RegistryResult;

/// A stored lookup response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedLookup {
    #[serde(rename = "eTag")]
    pub e_tag: String,
    pub versions: VersionMap,
}

/// Lookup cache backed by a directory
#[derive(Debug)]
pub struct LookupCache {
    dir: PathBuf,
    entries: DashMap<String, CachedLookup>,
}

impl LookupCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            entries: DashMap::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File holding the cached lookup for a package
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.json", urlencoding::encode(name)))
    }

    /// Cached lookup, from memory or disk
    ///
    /// An unreadable or corrupt cache file counts as a miss.
    pub async fn get(&self, name: &str) -> Option<CachedLookup> {
        if let Some(entry) = self.entries.get(name) {
            return Some(entry.clone());
        }

        let path = self.path_for(name);
        let content = match tokio::fs::read(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!("ignoring unreadable lookup cache {}: {}", path.display(), e);
                return None;
            },
        };

        match serde_json::from_slice::<CachedLookup>(&content) {
            Ok(entry) => {
                debug!("lookup cache hit for {} ({})", name, entry.e_tag);
                self.entries.insert(name.to_string(), entry.clone());
                Some(entry)
            },
            Err(e) => {
                warn!("ignoring corrupt lookup cache {}: {}", path.display(), e);
                None
            },
        }
    }

    /// Persist a lookup response
    pub async fn store(&self, name: &str, entry: CachedLookup) -> RegistryResult<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| LiftError::io(format!("Failed to create {}", self.dir.display()), e))?;

        let path = self.path_for(name);
        let content = serde_json::to_vec(&entry).map_err(|e| LiftError::JsonParse {
            message: format!("Failed to serialize lookup cache: {}", e),
        })?;

        tokio::fs::write(&path, content)
            .await
            .map_err(|e| LiftError::io(format!("Failed to write {}", path.display()), e))?;

        self.entries.insert(name.to_string(), entry);
        Ok(())
    }

    /// Drop the in-memory copies; files stay on disk
    pub fn clear_memory(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
