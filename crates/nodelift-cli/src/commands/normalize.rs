//! `nodelift normalize` command implementation.
//!
//! Prints the normalized form of a package.json, or writes it back with
//! `--write`.

use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use nodelift_config::json;
use nodelift_core::error::LiftResult;

use super::{normalizer, shim_config, CommandContext};

pub async fn execute(manifest: Option<Utf8PathBuf>, write: bool, ctx: &CommandContext) -> LiftResult<()> {
    let path = ctx.resolve(manifest.as_deref().unwrap_or(Utf8Path::new("package.json")));
    let config = ctx.load_config().await?;

    let manifest = json::load_from_file(&path).await?;
    let shim = Arc::new(shim_config(&config));
    let normalized = normalizer(&config, shim).normalize(manifest)?;

    if write {
        json::save_to_file(&path, &normalized.manifest).await?;
        ctx.output.success(&format!(
            "Normalized {} ({} aliases)",
            path,
            normalized.aliases.len()
        ));
    } else {
        let rendered = json::serialize_manifest(&normalized.manifest)?;
        ctx.output.print(rendered.trim_end());
    }

    Ok(())
}
