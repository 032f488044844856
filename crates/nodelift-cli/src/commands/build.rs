//! `nodelift build` command implementation.
//!
//! Normalizes `<dir>/package.json` in memory and rewrites the package tree
//! in place. The manifest on disk is left alone.

use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use nodelift_build::{BuildOptions, BuildReport, NormalizedManifest, PackageTreeBuilder};
use nodelift_config::{json, NodeliftToml};
use nodelift_core::error::{LiftError, LiftResult};
use nodelift_core::types::PackageManifest;

use super::{normalizer, shim_config, CommandContext};
use crate::output::errors::ErrorFormatter;

pub async fn execute(dir: Option<Utf8PathBuf>, ctx: &CommandContext) -> LiftResult<()> {
    let root = match dir {
        Some(dir) => ctx.resolve(&dir),
        None => ctx.cwd.clone(),
    };
    let config = ctx.load_config().await?;
    let manifest = json::load_from_file(&root.join("package.json")).await?;

    ctx.output.step("build", &format!("{} ({})", manifest.name, root));
    let (_, report) = convert_package(&root, manifest, &config).await?;
    report_build(&root, &report, ctx)
}

/// Normalize a manifest and rewrite the tree at `root` off the async runtime
pub async fn convert_package(
    root: &Utf8Path,
    manifest: PackageManifest,
    config: &NodeliftToml,
) -> LiftResult<(NormalizedManifest, BuildReport)> {
    let shim = Arc::new(shim_config(config));
    let normalized = normalizer(config, Arc::clone(&shim)).normalize(manifest)?;

    let options = config
        .build
        .concurrency
        .map(BuildOptions::with_concurrency)
        .unwrap_or_default();
    let builder = PackageTreeBuilder::new(options, shim);
    let root = root.to_path_buf();

    tokio::task::spawn_blocking(move || {
        let report = builder.build(root.as_std_path(), &normalized)?;
        Ok::<_, LiftError>((normalized, report))
    })
    .await
    .map_err(|e| {
        LiftError::io(
            "Build task failed".to_string(),
            std::io::Error::new(std::io::ErrorKind::Other, e),
        )
    })?
}

/// Print a build report, failing when any file could not be converted
pub fn report_build(root: &Utf8Path, report: &BuildReport, ctx: &CommandContext) -> LiftResult<()> {
    let formatter = ErrorFormatter::new();
    for error in &report.errors {
        ctx.output.error(&formatter.format_file_error(&error.file, &error.error));
    }

    if !report.is_success() {
        return Err(LiftError::rewrite(
            root.as_str(),
            format!("{} files could not be converted", report.errors.len()),
        ));
    }

    ctx.output.success(&format!(
        "{} of {} files rewritten, {} forwarders added",
        report.changed_files().count(),
        report.results.len(),
        report.synthesized.len()
    ));
    Ok(())
}
