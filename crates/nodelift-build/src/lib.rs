//! Package conversion for nodelift
//!
//! Turns an npm package (manifest plus extracted source tree) into the form
//! a jspm-style loader consumes:
//!
//! - [`manifest`] normalizes package.json and builds the alias table
//! - [`rewrite`] rewrites one CommonJS source file
//! - [`tree`] drives the rewriter over a whole package directory

pub mod manifest;
pub mod rewrite;
pub mod shim;
pub mod tree;

// Re-export main types
pub use manifest::{normalize_manifest, AliasTable, ManifestNormalizer, NormalizedManifest, EMPTY_MODULE};
pub use rewrite::{
    ImportRemapper, ModuleMetadata, NodeImportRemapper, RewriteContext, RewriteOutput, SourceRewriter,
};
pub use shim::ShimConfig;
pub use tree::{BuildOptions, BuildReport, FileError, FileRewriteResult, PackageTreeBuilder};
