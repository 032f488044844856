//! Tarball extraction functionality
//!
//! Entries are validated before anything is written: absolute paths and
//! `..` components are rejected, and the leading `strip_components` path
//! components are dropped the way `tar --strip-components` does.

use std::fs;
use std::io::Read;
use std::path::{Component, Path, PathBuf};

use flate2::read::GzDecoder;
use nodelift_core::error::LiftError;
use tar::Archive;
use tracing::debug;

use super::limit::SizeLimitedReader;
use crate::CacheResult;

/// Extraction settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Leading path components to drop from every entry
    pub strip_components: usize,
    /// Upper bound on decompressed bytes, `None` for unlimited
    pub max_unpacked_bytes: Option<u64>,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            strip_components: 1,
            max_unpacked_bytes: None,
        }
    }
}

/// What an extraction wrote
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractSummary {
    pub files: usize,
    pub directories: usize,
    /// Links, devices and entries with nothing left after stripping
    pub skipped: usize,
}

/// Extract a gzipped tarball to a destination directory
pub fn extract_tarball<R: Read>(
    reader: R,
    dest_dir: &Path,
    options: ExtractOptions,
) -> CacheResult<ExtractSummary> {
    let limited = SizeLimitedReader::new(
        GzDecoder::new(reader),
        options.max_unpacked_bytes.unwrap_or(u64::MAX),
    );
    let counter = limited.counter();

    let result = extract_entries(Archive::new(limited), dest_dir, options.strip_components);
    if counter.exceeded() {
        return Err(LiftError::PayloadTooLarge {
            size: counter.consumed(),
            limit: counter.limit(),
        });
    }
    result
}

fn extract_entries<R: Read>(
    mut archive: Archive<R>,
    dest_dir: &Path,
    strip_components: usize,
) -> CacheResult<ExtractSummary> {
    let io_err = |e| LiftError::io("Failed to read tarball".to_string(), e);

    fs::create_dir_all(dest_dir)
        .map_err(|e| LiftError::io(format!("Failed to create {}", dest_dir.display()), e))?;

    let mut summary = ExtractSummary::default();

    for entry_result in archive.entries().map_err(io_err)? {
        let mut entry = entry_result.map_err(io_err)?;

        let entry_path = entry.path().map_err(io_err)?.into_owned();
        let Some(safe_path) = validate_extract_path(&entry_path, dest_dir, strip_components)? else {
            summary.skipped += 1;
            continue;
        };

        match entry.header().entry_type() {
            tar::EntryType::Regular | tar::EntryType::Continuous => {
                let mode = entry.header().mode().ok();
                extract_regular_file(&mut entry, &safe_path)?;
                set_mode(&safe_path, mode);
                summary.files += 1;
            },
            tar::EntryType::Directory => {
                fs::create_dir_all(&safe_path).map_err(|e| {
                    LiftError::io(format!("Failed to create {}", safe_path.display()), e)
                })?;
                summary.directories += 1;
            },
            other => {
                debug!("skipping {:?} entry {}", other, entry_path.display());
                summary.skipped += 1;
            },
        }
    }

    Ok(summary)
}

/// Validate an entry path, returning `None` when stripping leaves nothing
fn validate_extract_path(
    entry_path: &Path,
    dest_dir: &Path,
    strip_components: usize,
) -> CacheResult<Option<PathBuf>> {
    let unsafe_path = |reason: &str| LiftError::IntegrityFailure {
        package: "tarball".to_string(),
        expected: "relative path within destination".to_string(),
        actual: format!("{}: {}", reason, entry_path.display()),
    };

    let mut safe_path = dest_dir.to_path_buf();
    let mut stripped = 0;
    let mut pushed = false;

    for component in entry_path.components() {
        match component {
            Component::Normal(name) => {
                if stripped < strip_components {
                    stripped += 1;
                } else {
                    safe_path.push(name);
                    pushed = true;
                }
            },
            Component::ParentDir => return Err(unsafe_path("directory traversal")),
            Component::RootDir | Component::Prefix(_) => return Err(unsafe_path("absolute path")),
            Component::CurDir => {},
        }
    }

    Ok(pushed.then_some(safe_path))
}

fn extract_regular_file<R: Read>(entry: &mut tar::Entry<R>, dest_path: &Path) -> CacheResult<()> {
    if let Some(parent) = dest_path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| LiftError::io(format!("Failed to create {}", parent.display()), e))?;
    }

    let mut file = fs::File::create(dest_path)
        .map_err(|e| LiftError::io(format!("Failed to create {}", dest_path.display()), e))?;

    std::io::copy(entry, &mut file)
        .map_err(|e| LiftError::io(format!("Failed to write {}", dest_path.display()), e))?;

    Ok(())
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: Option<u32>) {
    use std::os::unix::fs::PermissionsExt;

    // Keep files readable and writable by the owner whatever the archive says
    if let Some(mode) = mode {
        let _ = fs::set_permissions(path, fs::Permissions::from_mode(mode | 0o600));
    }
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: Option<u32>) {}
