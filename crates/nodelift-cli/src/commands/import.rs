//! `nodelift import` command implementation.
//!
//! lookup, manifest check, download, extract, normalize, build, and finally
//! the normalized package.json is written into the output directory.

use camino::Utf8PathBuf;
use nodelift_config::json;
use nodelift_core::error::{LiftError, LiftResult};
use nodelift_registry::{LookupOutcome, RegistryClient};

use super::build::{convert_package, report_build};
use super::CommandContext;

/// Split `name@version`, allowing scoped names
pub fn parse_package_spec(spec: &str) -> LiftResult<(&str, &str)> {
    match spec.rfind('@') {
        Some(at) if at > 0 && at + 1 < spec.len() => Ok((&spec[..at], &spec[at + 1..])),
        _ => Err(LiftError::ConfigValidation {
            field: "package".to_string(),
            reason: format!("expected NAME@VERSION, got '{}'", spec),
        }),
    }
}

pub async fn execute(package: String, out: Utf8PathBuf, ctx: &CommandContext) -> LiftResult<()> {
    let (name, version) = parse_package_spec(&package)?;
    let out = ctx.resolve(&out);
    let config = ctx.load_config().await?;
    let client = RegistryClient::from_config(&config.endpoint, &config.build)?;

    ctx.output.step("lookup", name);
    let versions = match client.lookup(name).await? {
        LookupOutcome::Found { versions } => versions,
        LookupOutcome::NotFound => {
            return Err(LiftError::PackageNotFound {
                name: name.to_string(),
            })
        },
    };
    let entry = versions
        .get(version)
        .ok_or_else(|| LiftError::PackageNotFound {
            name: package.clone(),
        })?;

    let manifest = RegistryClient::package_config(name, version, Some(entry.hash.as_str()), Some(&entry.meta))?;
    let dist = manifest.dist.clone().ok_or_else(|| LiftError::ManifestIntegrity {
        package: package.clone(),
        reason: "dist is missing".to_string(),
    })?;

    ctx.output.step("download", &package);
    tokio::fs::create_dir_all(&out)
        .await
        .map_err(|e| LiftError::io(format!("Failed to create {}", out), e))?;
    let summary = client
        .download(name, &dist, &entry.hash, out.as_std_path())
        .await?;
    ctx.output.info(&format!("{} files extracted", summary.files));

    ctx.output.step("build", &out.to_string());
    let (normalized, report) = convert_package(&out, manifest, &config).await?;
    json::save_to_file(&out.join("package.json"), &normalized.manifest).await?;

    report_build(&out, &report, ctx)
}
