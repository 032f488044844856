//! Semantic version type used by range translation.
//!
//! Provides a structured version triple with semver precedence ordering and
//! the decrement-with-borrow arithmetic needed to turn exclusive upper bounds
//! into exact versions.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Semantic version (major.minor.patch-prerelease+build)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub prerelease: Option<String>,
    pub build: Option<String>,
}

/// Version parsing and validation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    #[error("Invalid version format: {input}")]
    InvalidFormat { input: String },

    #[error("Invalid number in version: {component}")]
    InvalidNumber { component: String },

    #[error("Invalid prerelease identifier: {prerelease}")]
    InvalidPrerelease { prerelease: String },

    #[error("Invalid build metadata: {build}")]
    InvalidBuild { build: String },
}

impl Version {
    /// Create a new version
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            prerelease: None,
            build: None,
        }
    }

    /// Attach a prerelease tag
    pub fn with_prerelease(mut self, prerelease: impl Into<String>) -> Self {
        self.prerelease = Some(prerelease.into());
        self
    }

    /// Parse a version, tolerating a leading `v` or `=` and surrounding whitespace
    pub fn parse_loose(input: &str) -> Result<Self, VersionError> {
        let trimmed = input.trim();
        let trimmed = trimmed.strip_prefix('=').unwrap_or(trimmed).trim_start();
        let trimmed = trimmed.strip_prefix('v').unwrap_or(trimmed);
        trimmed.parse()
    }

    /// Check if this is a prerelease version
    pub fn is_prerelease(&self) -> bool {
        self.prerelease.is_some()
    }

    /// `N.0.0` with no prerelease
    pub fn is_major_boundary(&self) -> bool {
        self.minor == 0 && self.patch == 0 && self.prerelease.is_none()
    }

    /// `N.M.0` with no prerelease
    pub fn is_minor_boundary(&self) -> bool {
        self.patch == 0 && self.prerelease.is_none()
    }

    /// Drop the `-0` prerelease that range desugaring appends to exclusive bounds
    pub fn without_synthetic_prerelease(mut self) -> Self {
        if self.prerelease.as_deref() == Some("0") {
            self.prerelease = None;
        }
        self
    }

    /// The closest release strictly below this version.
    ///
    /// A prerelease is stripped rather than decremented. Otherwise the patch
    /// is decremented, borrowing into minor and then major when a component
    /// is zero: `1.2.3 -> 1.2.2`, `1.2.0 -> 1.1.0`, `2.0.0 -> 1.0.0`.
    /// `0.0.0` has no predecessor.
    pub fn predecessor(&self) -> Option<Version> {
        if self.prerelease.is_some() {
            return Some(Version::new(self.major, self.minor, self.patch));
        }

        if self.patch > 0 {
            Some(Version::new(self.major, self.minor, self.patch - 1))
        } else if self.minor > 0 {
            Some(Version::new(self.major, self.minor - 1, 0))
        } else if self.major > 0 {
            Some(Version::new(self.major - 1, 0, 0))
        } else {
            None
        }
    }

    /// Get the precedence for comparison (ignores build metadata)
    fn precedence_cmp(&self, other: &Self) -> Ordering {
        match (self.major, self.minor, self.patch).cmp(&(other.major, other.minor, other.patch)) {
            Ordering::Equal => match (&self.prerelease, &other.prerelease) {
                (None, None) => Ordering::Equal,
                (Some(_), None) => Ordering::Less, // prerelease < normal
                (None, Some(_)) => Ordering::Greater, // normal > prerelease
                (Some(a), Some(b)) => compare_prerelease(a, b),
            },
            other => other,
        }
    }
}

/// Compare dot-separated prerelease identifiers: numeric identifiers compare
/// numerically and sort before alphanumeric ones, a shorter set sorts first
fn compare_prerelease(a: &str, b: &str) -> Ordering {
    let mut left = a.split('.');
    let mut right = b.split('.');

    loop {
        match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) => {
                let ordering = match (l.parse::<u64>(), r.parse::<u64>()) {
                    (Ok(l), Ok(r)) => l.cmp(&r),
                    (Ok(_), Err(_)) => Ordering::Less,
                    (Err(_), Ok(_)) => Ordering::Greater,
                    (Err(_), Err(_)) => l.cmp(r),
                };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            },
        }
    }
}

fn parse_component(component: &str) -> Result<u64, VersionError> {
    let invalid = || VersionError::InvalidNumber {
        component: component.to_string(),
    };

    if component.is_empty()
        || !component.bytes().all(|b| b.is_ascii_digit())
        || (component.len() > 1 && component.starts_with('0'))
    {
        return Err(invalid());
    }

    component.parse().map_err(|_| invalid())
}

fn valid_identifiers(input: &str) -> bool {
    !input.is_empty()
        && input.split('.').all(|ident| {
            !ident.is_empty() && ident.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-')
        })
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();

        // Split on '+' for build metadata
        let (version_part, build) = match input.split_once('+') {
            Some((v, b)) => {
                if !valid_identifiers(b) {
                    return Err(VersionError::InvalidBuild {
                        build: b.to_string(),
                    });
                }
                (v, Some(b.to_string()))
            },
            None => (input, None),
        };

        // Split on '-' for prerelease
        let (core_part, prerelease) = match version_part.split_once('-') {
            Some((c, p)) => {
                if !valid_identifiers(p) {
                    return Err(VersionError::InvalidPrerelease {
                        prerelease: p.to_string(),
                    });
                }
                (c, Some(p.to_string()))
            },
            None => (version_part, None),
        };

        // Parse major.minor.patch
        let parts: Vec<&str> = core_part.split('.').collect();
        if parts.len() != 3 {
            return Err(VersionError::InvalidFormat {
                input: input.to_string(),
            });
        }

        Ok(Version {
            major: parse_component(parts[0])?,
            minor: parse_component(parts[1])?,
            patch: parse_component(parts[2])?,
            prerelease,
            build,
        })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;

        if let Some(ref pre) = self.prerelease {
            write!(f, "-{}", pre)?;
        }

        if let Some(ref build) = self.build {
            write!(f, "+{}", build)?;
        }

        Ok(())
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.precedence_cmp(other)
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn version_round_trip(
            major in 0u64..1000,
            minor in 0u64..1000,
            patch in 0u64..1000,
            prerelease in prop::option::of("[a-z][a-z0-9]{0,6}(\\.[a-z0-9]{1,4}){0,2}"),
        ) {
            let original = Version { major, minor, patch, prerelease, build: None };
            let parsed = Version::from_str(&original.to_string()).unwrap();
            prop_assert_eq!(parsed, original);
        }

        #[test]
        fn predecessor_is_strictly_lower(
            major in 0u64..100,
            minor in 0u64..100,
            patch in 0u64..100,
        ) {
            let version = Version::new(major, minor, patch);
            match version.predecessor() {
                Some(prev) => prop_assert!(prev < version),
                None => prop_assert_eq!(version, Version::new(0, 0, 0)),
            }
        }

        #[test]
        fn version_comparison_transitivity(
            a in (0u64..50, 0u64..50, 0u64..50),
            b in (0u64..50, 0u64..50, 0u64..50),
            c in (0u64..50, 0u64..50, 0u64..50),
        ) {
            let a = Version::new(a.0, a.1, a.2);
            let b = Version::new(b.0, b.1, b.2);
            let c = Version::new(c.0, c.1, c.2);

            if a < b && b < c {
                prop_assert!(a < c, "Transitivity violated: {} < {} < {}", a, b, c);
            }
        }
    }
}
