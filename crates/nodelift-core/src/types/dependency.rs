//! Dependency target types.
//!
//! A normalized dependency is either a registry package or a hosted GitHub
//! repository, optionally paired with a range or tag.

use std::fmt;

/// Where a dependency is fetched from
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DependencySource {
    /// Plain registry package name
    Registry(String),
    /// `owner/repo` on GitHub
    GitHub(String),
}

/// A normalized dependency reference (`name@range`, `github:owner/repo@ref`)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DependencyTarget {
    pub source: DependencySource,
    pub range: Option<String>,
}

impl DependencyTarget {
    /// Registry package with an optional range
    pub fn registry(name: impl Into<String>, range: Option<String>) -> Self {
        Self {
            source: DependencySource::Registry(name.into()),
            range,
        }
    }

    /// GitHub repository with an optional ref
    pub fn github(repo: impl Into<String>, range: Option<String>) -> Self {
        Self {
            source: DependencySource::GitHub(repo.into()),
            range,
        }
    }

    /// Resolved name without the range (`name` or `github:owner/repo`)
    pub fn resolved_name(&self) -> String {
        match &self.source {
            DependencySource::Registry(name) => name.clone(),
            DependencySource::GitHub(repo) => format!("github:{}", repo),
        }
    }

    /// Check if this dependency comes from GitHub
    pub fn is_github(&self) -> bool {
        matches!(self.source, DependencySource::GitHub(_))
    }
}

impl fmt::Display for DependencyTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.resolved_name())?;

        match self.range.as_deref() {
            Some(range) if !range.is_empty() => write!(f, "@{}", range),
            _ => Ok(()),
        }
    }
}
