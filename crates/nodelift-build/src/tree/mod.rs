//! Whole-package conversion
//!
//! [`PackageTreeBuilder::build`] enumerates every `.js` file once, then runs
//! two phases over that list:
//!
//! 1. synthesis: directory-index forwarders are written for non-root
//!    `dir/index.js` files without a `dir.js` sibling
//! 2. rewrite: each listed file goes through the [`SourceRewriter`] on a
//!    bounded rayon pool and is overwritten when it changed
//!
//! Forwarders created in phase 1 are not part of the list, so they are only
//! rewritten by a later build. Failures are collected per file.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use nodelift_core::error::{LiftError, LiftResult};
use nodelift_core::utils::path::to_module_path;
use rayon::prelude::*;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::manifest::NormalizedManifest;
use crate::rewrite::{index_forwarder, RewriteContext, RewriteOutput, SourceRewriter};
use crate::shim::ShimConfig;

/// Tree build settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    /// Worker threads used by the rewrite phase
    pub concurrency: usize,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            concurrency: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
        }
    }
}

impl BuildOptions {
    pub fn with_concurrency(concurrency: usize) -> Self {
        Self {
            concurrency: concurrency.max(1),
        }
    }
}

/// Outcome for one rewritten file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRewriteResult {
    /// Package-relative path
    pub path: String,
    pub changed: bool,
    /// Source written back to disk; `None` when the file was left alone
    pub rewritten: Option<String>,
}

/// A failure confined to one file
#[derive(Debug)]
pub struct FileError {
    pub file: String,
    pub error: LiftError,
}

/// Everything a build did
#[derive(Debug, Default)]
pub struct BuildReport {
    /// Files processed by the rewrite phase, in path order
    pub results: Vec<FileRewriteResult>,
    pub errors: Vec<FileError>,
    /// Forwarders created by the synthesis phase
    pub synthesized: Vec<String>,
}

impl BuildReport {
    pub fn changed_files(&self) -> impl Iterator<Item = &str> {
        self.results
            .iter()
            .filter(|result| result.changed)
            .map(|result| result.path.as_str())
    }

    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Converts an extracted package directory in place
pub struct PackageTreeBuilder {
    options: BuildOptions,
    shim: Arc<ShimConfig>,
}

impl PackageTreeBuilder {
    pub fn new(options: BuildOptions, shim: Arc<ShimConfig>) -> Self {
        Self { options, shim }
    }

    /// Convert the package at `root` described by `normalized`
    pub fn build(&self, root: &Path, normalized: &NormalizedManifest) -> LiftResult<BuildReport> {
        let context = RewriteContext::from_manifest(normalized, Arc::clone(&self.shim));
        self.build_with(root, &SourceRewriter::new(context))
    }

    /// Convert the package at `root` with a preconfigured rewriter
    pub fn build_with(&self, root: &Path, rewriter: &SourceRewriter) -> LiftResult<BuildReport> {
        if !root.is_dir() {
            return Err(LiftError::io(
                format!("Package root {} is not a directory", root.display()),
                std::io::Error::from(std::io::ErrorKind::NotFound),
            ));
        }

        let mut report = BuildReport::default();
        let files = enumerate_sources(root, &mut report.errors);
        info!("{}: {} source files", rewriter.context().package_name, files.len());

        self.synthesize_forwarders(root, &files, &mut report);

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.options.concurrency)
            .build()
            .map_err(|e| LiftError::ConfigValidation {
                field: "build.concurrency".to_string(),
                reason: format!("Failed to start rewrite workers: {}", e),
            })?;

        let outcomes: Vec<(String, LiftResult<RewriteOutput>)> = pool.install(|| {
            files
                .par_iter()
                .map(|file| (file.clone(), rewrite_file(root, file, rewriter)))
                .collect()
        });

        for (path, outcome) in outcomes {
            match outcome {
                Ok(output) => {
                    if output.changed {
                        debug!("rewrote {}", path);
                    }
                    report.results.push(FileRewriteResult {
                        path,
                        changed: output.changed,
                        rewritten: output.changed.then_some(output.source),
                    });
                },
                Err(error) => {
                    warn!("{}: {}", path, error);
                    report.errors.push(FileError { file: path, error });
                },
            }
        }

        info!(
            "{}: {} rewritten, {} forwarders, {} errors",
            rewriter.context().package_name,
            report.changed_files().count(),
            report.synthesized.len(),
            report.errors.len()
        );
        Ok(report)
    }

    fn synthesize_forwarders(&self, root: &Path, files: &[String], report: &mut BuildReport) {
        for file in files {
            let Some(forwarder) = index_forwarder(file) else {
                continue;
            };

            let target = root.join(&forwarder.path);
            if target.exists() {
                continue;
            }

            match fs::write(&target, &forwarder.source) {
                Ok(()) => {
                    debug!("synthesized {}", forwarder.path);
                    report.synthesized.push(forwarder.path);
                },
                Err(e) => {
                    let error = LiftError::io(format!("Failed to write {}", forwarder.path), e);
                    warn!("{}: {}", forwarder.path, error);
                    report.errors.push(FileError {
                        file: forwarder.path,
                        error,
                    });
                },
            }
        }
        info!("synthesis phase: {} forwarders", report.synthesized.len());
    }
}

/// Package-relative paths of every `.js` file, sorted
fn enumerate_sources(root: &Path, errors: &mut Vec<FileError>) -> Vec<String> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let file = e
                    .path()
                    .map(|path| path.display().to_string())
                    .unwrap_or_else(|| root.display().to_string());
                errors.push(FileError {
                    error: LiftError::io(format!("Failed to walk {}", file), e.into()),
                    file,
                });
                continue;
            },
        };

        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().map_or(true, |ext| ext != "js") {
            continue;
        }
        if let Ok(relative) = path.strip_prefix(root) {
            files.push(to_module_path(relative));
        }
    }

    files
}

fn rewrite_file(root: &Path, file: &str, rewriter: &SourceRewriter) -> LiftResult<RewriteOutput> {
    let path = root.join(file);
    let source = fs::read_to_string(&path)
        .map_err(|e| LiftError::io(format!("Failed to read {}", file), e))?;

    let output = rewriter.rewrite(file, &source)?;
    if output.changed {
        fs::write(&path, &output.source)
            .map_err(|e| LiftError::io(format!("Failed to write {}", file), e))?;
    }
    Ok(output)
}
