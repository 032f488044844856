//! CommonJS source rewriting
//!
//! [`SourceRewriter::rewrite`] runs one module through these stages:
//!
//! 1. alias substitution from the manifest's `browser` object
//! 2. skip checks driven by the leading metadata and the package format
//! 3. shebang neutralization
//! 4. `Buffer` / `process` wrapping
//! 5. `require` specifier remapping through an [`ImportRemapper`]
//!
//! Directory-index forwarders ([`index_forwarder`]) are synthesized by the
//! tree builder before any file is rewritten.

pub mod globals;
pub mod index;
pub mod lexer;
pub mod metadata;
pub mod remap;
pub mod requires;

use std::borrow::Cow;
use std::collections::HashSet;
use std::sync::Arc;

use nodelift_core::error::{LiftError, LiftResult};
use nodelift_core::utils::path::parent_module_dir;
use nodelift_core::utils::{relative_module_path, strip_js_extension};
use tracing::trace;

use crate::manifest::{AliasTable, NormalizedManifest, CJS_FORMAT};
use crate::shim::ShimConfig;

pub use globals::{is_wrapped, wrap_globals, GlobalUsage};
pub use index::{index_forwarder, IndexForwarder};
pub use metadata::ModuleMetadata;
pub use remap::{ImportRemapper, NodeImportRemapper};
pub use requires::{find_requires, remap_requires, RequireSite};

/// Everything the rewriter needs to know about the owning package
#[derive(Debug, Clone)]
pub struct RewriteContext {
    pub package_name: String,
    /// Main entry without `./` or `.js`
    pub main: String,
    /// Declared package format
    pub format: String,
    /// Modules listed under `shim`, never rewritten
    pub shimmed: HashSet<String>,
    pub aliases: Arc<AliasTable>,
    pub shim: Arc<ShimConfig>,
}

impl RewriteContext {
    pub fn from_manifest(normalized: &NormalizedManifest, shim: Arc<ShimConfig>) -> Self {
        let manifest = &normalized.manifest;
        Self {
            package_name: manifest.name.clone(),
            main: manifest.main_module(),
            format: manifest
                .format
                .clone()
                .unwrap_or_else(|| CJS_FORMAT.to_string()),
            shimmed: manifest
                .shim
                .as_ref()
                .map(|shim| shim.keys().map(|key| strip_js_extension(key).to_string()).collect())
                .unwrap_or_default(),
            aliases: Arc::clone(&normalized.aliases),
            shim,
        }
    }

    fn is_shimmed(&self, module: &str) -> bool {
        self.shimmed.contains(module)
    }
}

/// Result of rewriting one module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteOutput {
    pub changed: bool,
    pub source: String,
}

/// Rewrites the modules of one package
pub struct SourceRewriter {
    context: RewriteContext,
    remapper: Box<dyn ImportRemapper>,
}

impl SourceRewriter {
    /// Rewriter using Node resolution rules for the context's package
    pub fn new(context: RewriteContext) -> Self {
        let remapper = NodeImportRemapper::new(
            context.package_name.clone(),
            context.main.clone(),
            Arc::clone(&context.shim),
        );
        Self::with_remapper(context, Box::new(remapper))
    }

    pub fn with_remapper(context: RewriteContext, remapper: Box<dyn ImportRemapper>) -> Self {
        Self { context, remapper }
    }

    pub fn context(&self) -> &RewriteContext {
        &self.context
    }

    /// Rewrite the module at `path` (package-relative, with extension)
    ///
    /// `changed` is only set when the returned source differs from the input.
    pub fn rewrite(&self, path: &str, source: &str) -> LiftResult<RewriteOutput> {
        let module = strip_js_extension(path);
        let mut code = Cow::Borrowed(source);
        let mut changed = false;

        if let Some(target) = self.context.aliases.get(module) {
            trace!("{} aliased to {}", path, target);
            code = Cow::Owned(alias_forwarder(module, target));
            changed = true;
        }

        if let Some(reason) = self.skip_reason(module, &code) {
            trace!("{} not rewritten: {}", path, reason);
            return Ok(finish(source, code.into_owned(), changed));
        }

        if let Some(neutralized) = neutralize_shebang(&code) {
            code = Cow::Owned(neutralized);
            changed = true;
        }

        let usage = GlobalUsage::detect(&code);
        if usage.any() && !is_wrapped(&code) {
            code = Cow::Owned(wrap_globals(&code, usage));
            changed = true;
        }

        let (remapped, remap_changed) =
            remap_requires(&code, path, self.remapper.as_ref()).map_err(|e| match e {
                LiftError::Rewrite { .. } => e,
                other => LiftError::rewrite(path, other.to_string()),
            })?;

        Ok(finish(source, remapped, changed || remap_changed))
    }

    fn skip_reason(&self, module: &str, code: &str) -> Option<&'static str> {
        let metadata = ModuleMetadata::parse(code);
        match metadata.format() {
            None if self.context.format != CJS_FORMAT => Some("package format is not cjs"),
            Some(format) if format != CJS_FORMAT => Some("module declares another format"),
            _ if self.context.is_shimmed(module) => Some("module is shimmed"),
            _ => None,
        }
    }
}

fn finish(original: &str, source: String, changed: bool) -> RewriteOutput {
    RewriteOutput {
        changed: changed && source != original,
        source,
    }
}

/// Module body forwarding to an alias target
fn alias_forwarder(module: &str, target: &str) -> String {
    let target = match target.strip_prefix("./") {
        Some(relative) => relative_module_path(parent_module_dir(module), relative),
        None => target.to_string(),
    };
    format!("module.exports = require(\"{}\");\n", target)
}

/// Comment out a leading `#!` line
fn neutralize_shebang(source: &str) -> Option<String> {
    let start = source.len() - source.trim_start().len();
    if source[start..].starts_with('#') {
        Some(format!("{}//{}", &source[..start], &source[start..]))
    } else {
        None
    }
}
