//! package.json parsing and serialization

use camino::Utf8Path;
use nodelift_core::error::LiftError;
use nodelift_core::types::PackageManifest;

use crate::ConfigResult;

/// Parse JSON string to a package manifest
pub fn parse_manifest(content: &str) -> ConfigResult<PackageManifest> {
    let manifest: PackageManifest =
        serde_json::from_str(content).map_err(|e| LiftError::JsonParse {
            message: format!("JSON parsing error: {}", e),
        })?;

    if manifest.name.is_empty() {
        return Err(LiftError::ConfigValidation {
            field: "name".to_string(),
            reason: "package.json has no name".to_string(),
        });
    }

    Ok(manifest)
}

/// Serialize a manifest as pretty-printed JSON with a trailing newline
pub fn serialize_manifest(manifest: &PackageManifest) -> ConfigResult<String> {
    let mut out = serde_json::to_string_pretty(manifest).map_err(|e| LiftError::JsonParse {
        message: format!("JSON serialization error: {}", e),
    })?;
    out.push('\n');
    Ok(out)
}

/// Load and parse package.json from file path
pub async fn load_from_file(path: &Utf8Path) -> ConfigResult<PackageManifest> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| LiftError::io(format!("Failed to read {}", path), e))?;

    parse_manifest(&content).map_err(|e| match e {
        LiftError::JsonParse { message } => LiftError::JsonParse {
            message: format!("In file {}: {}", path, message),
        },
        other => other,
    })
}

/// Write a manifest back to disk
pub async fn save_to_file(path: &Utf8Path, manifest: &PackageManifest) -> ConfigResult<()> {
    let content = serialize_manifest(manifest)?;
    tokio::fs::write(path, content)
        .await
        .map_err(|e| LiftError::io(format!("Failed to write {}", path), e))
}
