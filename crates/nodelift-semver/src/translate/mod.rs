//! npm range to target range translation
//!
//! The target ecosystem only understands exact versions, `^` and `~` ranges
//! and the `*` wildcard. Any npm range is folded into a single lower and upper
//! bound and then expressed in the closest of those forms. Ranges combined
//! with `||` keep only their last alternative.

use nodelift_core::error::{LiftError, LiftResult};
use nodelift_core::types::Version;
use tracing::trace;

use crate::range::{self, ComparatorSet, Op, RangeParseError};

/// Target wildcard
pub const WILDCARD: &str = "*";

/// One side of a range
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionBound {
    pub version: Version,
    pub inclusive: bool,
}

/// A translated range before rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RangeExpression {
    /// No constraint
    Any,
    /// Exactly one version
    Exact(Version),
    /// Lower and/or upper bound; never constructed with lower above upper
    Bounded {
        lower: Option<VersionBound>,
        upper: Option<VersionBound>,
    },
}

impl VersionBound {
    pub fn inclusive(version: Version) -> Self {
        Self {
            version,
            inclusive: true,
        }
    }

    pub fn exclusive(version: Version) -> Self {
        Self {
            version,
            inclusive: false,
        }
    }

    fn without_synthetic_prerelease(self) -> Self {
        Self {
            version: self.version.without_synthetic_prerelease(),
            inclusive: self.inclusive,
        }
    }
}

impl RangeExpression {
    /// Build a bounded expression, rejecting empty intervals
    pub fn bounded(
        range: &str,
        lower: Option<VersionBound>,
        upper: Option<VersionBound>,
    ) -> LiftResult<Self> {
        if let (Some(lower), Some(upper)) = (&lower, &upper) {
            let empty = lower.version > upper.version
                || (lower.version == upper.version && !(lower.inclusive && upper.inclusive));
            if empty {
                return Err(LiftError::InvalidRange {
                    range: range.to_string(),
                    reason: format!(
                        "lower bound {} is above upper bound {}",
                        lower.version, upper.version
                    ),
                });
            }
        }

        Ok(RangeExpression::Bounded { lower, upper })
    }

    /// Fold one comparator set into a single lower and upper bound.
    ///
    /// The highest lower bound and the lowest upper bound win; on a tie the
    /// exclusive bound wins. A bare equality clause short-circuits to an
    /// exact version.
    pub fn from_comparators(range: &str, set: &ComparatorSet) -> LiftResult<Self> {
        let mut lower: Option<VersionBound> = None;
        let mut upper: Option<VersionBound> = None;

        for comparator in &set.comparators {
            let version = comparator.version.clone();
            match comparator.op {
                Op::Eq => return Ok(RangeExpression::Exact(version)),
                Op::Greater | Op::GreaterEq => {
                    let candidate = VersionBound {
                        version,
                        inclusive: comparator.op == Op::GreaterEq,
                    };
                    let replace = match &lower {
                        None => true,
                        Some(current) => {
                            candidate.version > current.version
                                || (candidate.version == current.version && !candidate.inclusive)
                        },
                    };
                    if replace {
                        lower = Some(candidate);
                    }
                },
                Op::Less | Op::LessEq => {
                    let candidate = VersionBound {
                        version,
                        inclusive: comparator.op == Op::LessEq,
                    };
                    let replace = match &upper {
                        None => true,
                        Some(current) => {
                            candidate.version < current.version
                                || (candidate.version == current.version && !candidate.inclusive)
                        },
                    };
                    if replace {
                        upper = Some(candidate);
                    }
                },
            }
        }

        let lower = lower.map(VersionBound::without_synthetic_prerelease);
        let upper = upper.map(VersionBound::without_synthetic_prerelease);

        if lower.is_none() && upper.is_none() {
            return Ok(RangeExpression::Any);
        }

        RangeExpression::bounded(range, lower, upper)
    }

    /// Render in target syntax
    pub fn to_target(&self, range: &str) -> LiftResult<String> {
        match self {
            RangeExpression::Any => Ok(WILDCARD.to_string()),
            RangeExpression::Exact(version) => Ok(version.to_string()),
            // Open lower-only ranges have no target form
            RangeExpression::Bounded { upper: None, .. } => Ok(WILDCARD.to_string()),
            RangeExpression::Bounded {
                lower: None,
                upper: Some(upper),
            } => {
                if upper.inclusive {
                    return Ok(upper.version.to_string());
                }
                upper
                    .version
                    .predecessor()
                    .map(|version| version.to_string())
                    .ok_or_else(|| LiftError::untranslatable(range, "no version precedes 0.0.0"))
            },
            RangeExpression::Bounded {
                lower: Some(lower),
                upper: Some(upper),
            } => render_interval(range, &lower.version, upper),
        }
    }
}

fn render_interval(range: &str, lower: &Version, upper: &VersionBound) -> LiftResult<String> {
    if upper.inclusive {
        return Ok(upper.version.to_string());
    }

    let upper = &upper.version;

    if upper.is_major_boundary() {
        return match upper.major {
            0 => Err(LiftError::untranslatable(range, "upper bound 0.0.0 excludes every release")),
            // `^0` keeps the whole 0.x line; `^0.m.p` would narrow it
            1 => Ok("^0".to_string()),
            major if lower.major.checked_add(1) == Some(major) => Ok(format!("^{}", lower)),
            major => Ok(format!("^{}", major - 1)),
        };
    }

    if upper.is_minor_boundary() {
        // not a major boundary, so minor >= 1
        let previous_minor = upper.minor - 1;
        // Only a lower bound on the same major line is kept; `>=0.2.0 <1.3.0` is `~1.2`
        if lower.major == upper.major && lower.minor == previous_minor {
            return Ok(format!("~{}", lower));
        }
        return Ok(format!("~{}.{}", upper.major, previous_minor));
    }

    Err(LiftError::untranslatable(
        range,
        format!("upper bound {} has no caret or tilde form", upper),
    ))
}

/// Translate an npm version or range into target range syntax.
///
/// Exact versions, plain `^`/`~` ranges and tags that are not ranges at all
/// are returned unchanged. Fails only for ranges whose shape cannot be
/// expressed (an exact-patch exclusive upper bound) or that are empty.
pub fn translate(raw: &str) -> LiftResult<String> {
    let input = raw.trim();

    if Version::parse_loose(input).is_ok() {
        return Ok(input.to_string());
    }

    if matches!(input, "" | "*" | "latest") {
        return Ok(WILDCARD.to_string());
    }

    if let Some(rest) = input.strip_prefix('^').or_else(|| input.strip_prefix('~')) {
        if range::is_plain_partial(rest) {
            return Ok(input.to_string());
        }
    }

    let alternatives = match range::parse_range(input) {
        Ok(alternatives) => alternatives,
        Err(err @ RangeParseError::Overflow { .. }) => {
            return Err(LiftError::InvalidRange {
                range: input.to_string(),
                reason: err.to_string(),
            });
        },
        Err(err) => {
            trace!("{} is not a range ({}), keeping it as a tag", input, err);
            return Ok(input.to_string());
        },
    };

    let Some(last) = alternatives.last() else {
        return Ok(WILDCARD.to_string());
    };

    let translated = RangeExpression::from_comparators(input, last)?.to_target(input)?;
    trace!("translated {} -> {}", input, translated);
    Ok(translated)
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn exact_versions_are_identity(
            major in 0u64..500,
            minor in 0u64..500,
            patch in 0u64..500,
        ) {
            let version = Version::new(major, minor, patch).to_string();
            prop_assert_eq!(translate(&version).unwrap(), version);
        }

        #[test]
        fn major_boundary_upper_gives_caret(
            lower in (0u64..20, 0u64..20, 0u64..20),
            distance in 1u64..5,
        ) {
            let upper_major = lower.0 + distance;
            let lower = Version::new(lower.0, lower.1, lower.2);
            let input = format!(">={} <{}.0.0", lower, upper_major);
            let expected = if upper_major == 1 {
                "^0".to_string()
            } else if distance == 1 {
                format!("^{}", lower)
            } else {
                format!("^{}", upper_major - 1)
            };
            prop_assert_eq!(translate(&input).unwrap(), expected);
        }

        #[test]
        fn exclusive_upper_only_gives_predecessor(
            major in 1u64..50,
            minor in 0u64..50,
            patch in 0u64..50,
        ) {
            let upper = Version::new(major, minor, patch);
            let expected = upper.predecessor().unwrap().to_string();
            prop_assert_eq!(translate(&format!("<{}", upper)).unwrap(), expected);
        }
    }
}
