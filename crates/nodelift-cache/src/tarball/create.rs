//! Tarball packing
//!
//! Produces the registry layout: gzipped tar with every entry under
//! `package/`. Used to build fixtures and to repack converted trees.

use std::io::Write;
use std::path::Path;

use flate2::write::GzEncoder;
use flate2::Compression;
use nodelift_core::error::LiftError;
use tar::Builder;
use walkdir::WalkDir;

use crate::CacheResult;

/// Pack a directory as a registry-style tarball
pub fn pack_directory<W: Write>(writer: W, source_dir: &Path) -> CacheResult<()> {
    let io_err = |e| LiftError::io("Failed to write tarball".to_string(), e);
    let mut builder = Builder::new(GzEncoder::new(writer, Compression::default()));

    for entry in WalkDir::new(source_dir).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let message = format!("Failed to walk {}", source_dir.display());
            LiftError::io(message, e.into())
        })?;

        let relative = match entry.path().strip_prefix(source_dir) {
            Ok(relative) if !relative.as_os_str().is_empty() => relative,
            _ => continue,
        };
        let name = Path::new("package").join(relative);

        if entry.file_type().is_file() {
            builder
                .append_path_with_name(entry.path(), &name)
                .map_err(io_err)?;
        } else if entry.file_type().is_dir() {
            builder.append_dir(&name, entry.path()).map_err(io_err)?;
        }
    }

    builder.into_inner().map_err(io_err)?.finish().map_err(io_err)?;
    Ok(())
}

/// Pack a directory and return the tarball bytes
pub fn pack_directory_bytes(source_dir: &Path) -> CacheResult<Vec<u8>> {
    let mut buffer = Vec::new();
    pack_directory(&mut buffer, source_dir)?;
    Ok(buffer)
}
