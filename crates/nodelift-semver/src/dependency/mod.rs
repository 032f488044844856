//! Dependency map normalization
//!
//! Rewrites every entry of an npm dependency map into target form:
//! - `git://github.com/owner/repo.git#ref` -> `github:owner/repo@ref`
//! - `owner/repo#ref` -> `github:owner/repo@ref`
//! - `name: range` -> `name@translated-range`
//!
//! Any other URL with an explicit protocol is rejected.

use indexmap::IndexMap;
use nodelift_core::error::{LiftError, LiftResult};
use nodelift_core::types::DependencyTarget;
use tracing::debug;

use crate::translate::translate;

const GITHUB_HOST: &str = "://github.com/";

/// Normalize a full dependency map, failing fast on unsupported sources
pub fn normalize_dependencies(
    dependencies: &IndexMap<String, String>,
) -> LiftResult<IndexMap<String, String>> {
    let mut normalized = IndexMap::with_capacity(dependencies.len());

    for (name, specifier) in dependencies {
        let target = classify_dependency(name, specifier)?;
        debug!("dependency {}: {} -> {}", name, specifier, target);
        normalized.insert(name.clone(), target.to_string());
    }

    Ok(normalized)
}

/// Classify a single `name: specifier` entry (first match wins)
pub fn classify_dependency(name: &str, specifier: &str) -> LiftResult<DependencyTarget> {
    let specifier = specifier.trim();

    if let Some(path) = github_url_path(specifier) {
        return hosted_target(path);
    }

    if has_protocol(specifier) {
        return Err(LiftError::UnsupportedSource {
            specifier: specifier.to_string(),
        });
    }

    if is_repo_shorthand(specifier) {
        return hosted_target(specifier);
    }

    Ok(DependencyTarget::registry(name, Some(translate(specifier)?)))
}

/// Path after the host of `git://github.com/…` or `git+proto://github.com/…`
fn github_url_path(specifier: &str) -> Option<&str> {
    let rest = specifier.strip_prefix("git")?;
    let rest = match rest.strip_prefix('+') {
        Some(with_transport) => {
            let end = with_transport.find(':')?;
            if end == 0 || with_transport[..end].contains('/') {
                return None;
            }
            &with_transport[end..]
        },
        None => rest,
    };

    rest.strip_prefix(GITHUB_HOST).filter(|path| !path.is_empty())
}

/// `scheme://` prefix with a non-empty scheme free of `:` and `/`
fn has_protocol(specifier: &str) -> bool {
    match specifier.find("://") {
        Some(end) => end > 0 && !specifier[..end].contains(['/', ':']),
        None => false,
    }
}

/// `owner/repo[#ref]` with exactly one slash before the ref
fn is_repo_shorthand(specifier: &str) -> bool {
    let repo = specifier.split('#').next().unwrap_or_default();
    if repo.contains(':') {
        return false;
    }

    match repo.split_once('/') {
        Some((owner, name)) => {
            !owner.is_empty() && !owner.starts_with('.') && !name.is_empty() && !name.contains('/')
        },
        None => false,
    }
}

fn hosted_target(path: &str) -> LiftResult<DependencyTarget> {
    let (repo, reference) = match path.split_once('#') {
        Some((repo, reference)) => (repo, Some(reference)),
        None => (path, None),
    };

    let repo = repo.strip_suffix(".git").unwrap_or(repo);
    let range = match reference {
        Some(reference) if !reference.is_empty() => Some(translate(reference)?),
        _ => None,
    };

    Ok(DependencyTarget::github(repo, range))
}
