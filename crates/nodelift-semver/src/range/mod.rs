//! npm range grammar
//!
//! Parses npm version-range expressions (carets, tildes, x-ranges, hyphen
//! ranges, partial comparators, `||` alternatives) and desugars every
//! alternative into plain comparator clauses against full versions.

use std::fmt;

use nodelift_core::types::Version;
use thiserror::Error;

/// Range syntax errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RangeParseError {
    #[error("Invalid range token: {token}")]
    InvalidToken { token: String },

    #[error("Incomplete hyphen range: {input}")]
    IncompleteHyphen { input: String },

    #[error("Version component out of range in {token}")]
    Overflow { token: String },
}

/// Comparison operator of a desugared clause
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Eq,
    Greater,
    GreaterEq,
    Less,
    LessEq,
}

/// A single desugared clause such as `>=1.2.3`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparator {
    pub op: Op,
    pub version: Version,
}

/// Clauses joined by AND; an empty set matches any version
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ComparatorSet {
    pub comparators: Vec<Comparator>,
}

/// A version with possibly missing trailing components (`1`, `1.2`, `1.x`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialVersion {
    pub major: Option<u64>,
    pub minor: Option<u64>,
    pub patch: Option<u64>,
    pub prerelease: Option<String>,
}

impl PartialVersion {
    /// Parse a partial version; components after the first wildcard are ignored
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.strip_prefix('v').unwrap_or(input);
        if input.is_empty() {
            return None;
        }

        let input = match input.split_once('+') {
            Some((core, build)) if !build.is_empty() => core,
            Some(_) => return None,
            None => input,
        };

        let (core, prerelease) = match input.split_once('-') {
            Some((core, pre)) if !pre.is_empty() => (core, Some(pre.to_string())),
            Some(_) => return None,
            None => (input, None),
        };

        let parts: Vec<&str> = core.split('.').collect();
        if parts.len() > 3 {
            return None;
        }

        let mut numbers = [None; 3];
        let mut wildcard = false;
        for (slot, part) in numbers.iter_mut().zip(&parts) {
            if matches!(*part, "x" | "X" | "*") {
                wildcard = true;
                continue;
            }
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            if !wildcard {
                *slot = Some(part.parse().ok()?);
            }
        }

        let partial = PartialVersion {
            major: numbers[0],
            minor: numbers[1],
            patch: numbers[2],
            prerelease,
        };

        // Prerelease tags only attach to complete versions
        if partial.prerelease.is_some() && partial.patch.is_none() {
            return None;
        }

        Some(partial)
    }

    /// Check if every component is present
    pub fn is_full(&self) -> bool {
        self.patch.is_some()
    }

    /// Fill missing components with zero
    pub fn floor(&self) -> Version {
        Version {
            major: self.major.unwrap_or(0),
            minor: self.minor.unwrap_or(0),
            patch: self.patch.unwrap_or(0),
            prerelease: self.prerelease.clone(),
            build: None,
        }
    }
}

impl Comparator {
    fn new(op: Op, version: Version) -> Self {
        Self { op, version }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self.op {
            Op::Eq => "",
            Op::Greater => ">",
            Op::GreaterEq => ">=",
            Op::Less => "<",
            Op::LessEq => "<=",
        };
        write!(f, "{}{}", op, self.version)
    }
}

impl fmt::Display for ComparatorSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.comparators.is_empty() {
            return write!(f, "*");
        }
        let parts: Vec<String> = self.comparators.iter().map(|c| c.to_string()).collect();
        write!(f, "{}", parts.join(" "))
    }
}

/// Check for `1`, `1.2`, `1.2.3` or `1.2.3-pre[+build]` with no wildcards
pub fn is_plain_partial(input: &str) -> bool {
    let core = input.split_once('+').map_or(input, |(core, _)| core);
    let (numbers, has_prerelease) = match core.split_once('-') {
        Some((numbers, _)) => (numbers, true),
        None => (core, false),
    };

    let parts: Vec<&str> = numbers.split('.').collect();
    if parts.is_empty() || parts.len() > 3 || (has_prerelease && parts.len() != 3) {
        return false;
    }

    parts
        .iter()
        .all(|part| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit()))
        && PartialVersion::parse(input).is_some()
}

/// Parse a full npm range into its `||` alternatives
pub fn parse_range(input: &str) -> Result<Vec<ComparatorSet>, RangeParseError> {
    input.split("||").map(parse_alternative).collect()
}

/// Parse one `||` alternative into a comparator set
pub fn parse_alternative(input: &str) -> Result<ComparatorSet, RangeParseError> {
    let tokens = tokenize(input);
    let mut set = ComparatorSet::default();
    let mut index = 0;

    while index < tokens.len() {
        if tokens.get(index + 1).map(String::as_str) == Some("-") {
            let to = tokens.get(index + 2).ok_or_else(|| RangeParseError::IncompleteHyphen {
                input: input.to_string(),
            })?;
            desugar_hyphen(&tokens[index], to, &mut set)?;
            index += 3;
        } else {
            desugar_token(&tokens[index], &mut set)?;
            index += 1;
        }
    }

    Ok(set)
}

/// Split on whitespace, gluing dangling operators onto the following token
fn tokenize(input: &str) -> Vec<String> {
    let mut tokens: Vec<String> = Vec::new();
    let mut pending_operator: Option<String> = None;

    for word in input.split_whitespace() {
        let is_operator = !word.is_empty()
            && word.chars().all(|c| matches!(c, '<' | '>' | '=' | '^' | '~'));

        if is_operator {
            let op = pending_operator.take().unwrap_or_default();
            pending_operator = Some(op + word);
            continue;
        }

        match pending_operator.take() {
            Some(op) => tokens.push(op + word),
            None => tokens.push(word.to_string()),
        }
    }

    if let Some(op) = pending_operator {
        tokens.push(op);
    }

    tokens
}

fn invalid(token: &str) -> RangeParseError {
    RangeParseError::InvalidToken {
        token: token.to_string(),
    }
}

/// Next component value, failing instead of wrapping
fn bump(component: u64, token: &str) -> Result<u64, RangeParseError> {
    component.checked_add(1).ok_or_else(|| RangeParseError::Overflow {
        token: token.to_string(),
    })
}

fn desugar_hyphen(from: &str, to: &str, set: &mut ComparatorSet) -> Result<(), RangeParseError> {
    let from_version = PartialVersion::parse(from).ok_or_else(|| invalid(from))?;
    let to_version = PartialVersion::parse(to).ok_or_else(|| invalid(to))?;

    if from_version.major.is_some() {
        set.comparators
            .push(Comparator::new(Op::GreaterEq, from_version.floor()));
    }

    match (to_version.major, to_version.minor, to_version.patch) {
        (None, _, _) => {},
        (Some(major), None, _) => set
            .comparators
            .push(Comparator::new(Op::Less, Version::new(bump(major, to)?, 0, 0))),
        (Some(major), Some(minor), None) => set
            .comparators
            .push(Comparator::new(Op::Less, Version::new(major, bump(minor, to)?, 0))),
        (Some(_), Some(_), Some(_)) => set
            .comparators
            .push(Comparator::new(Op::LessEq, to_version.floor())),
    }

    Ok(())
}

fn desugar_token(token: &str, set: &mut ComparatorSet) -> Result<(), RangeParseError> {
    let (operator, rest) = split_operator(token);
    if matches!(rest, "" | "*" | "x" | "X") && operator.is_empty() {
        return Ok(());
    }

    let partial = PartialVersion::parse(rest).ok_or_else(|| invalid(token))?;
    let comparators = &mut set.comparators;

    match operator {
        "^" => desugar_caret(&partial, token, comparators)?,
        "~" | "~>" => desugar_tilde(&partial, token, comparators)?,
        "" | "=" => desugar_x_range(&partial, token, comparators)?,
        ">" => match (partial.major, partial.minor, partial.patch) {
            (None, _, _) => comparators.push(Comparator::new(Op::Less, Version::new(0, 0, 0))),
            (Some(major), None, _) => comparators.push(Comparator::new(
                Op::GreaterEq,
                Version::new(bump(major, token)?, 0, 0),
            )),
            (Some(major), Some(minor), None) => comparators.push(Comparator::new(
                Op::GreaterEq,
                Version::new(major, bump(minor, token)?, 0),
            )),
            _ => comparators.push(Comparator::new(Op::Greater, partial.floor())),
        },
        ">=" => {
            if partial.major.is_some() {
                comparators.push(Comparator::new(Op::GreaterEq, partial.floor()));
            }
        },
        "<" => comparators.push(Comparator::new(Op::Less, partial.floor())),
        "<=" => match (partial.major, partial.minor, partial.patch) {
            (None, _, _) => {},
            (Some(major), None, _) => comparators.push(Comparator::new(
                Op::Less,
                Version::new(bump(major, token)?, 0, 0),
            )),
            (Some(major), Some(minor), None) => comparators.push(Comparator::new(
                Op::Less,
                Version::new(major, bump(minor, token)?, 0),
            )),
            _ => comparators.push(Comparator::new(Op::LessEq, partial.floor())),
        },
        _ => return Err(invalid(token)),
    }

    Ok(())
}

fn split_operator(token: &str) -> (&str, &str) {
    let end = token
        .find(|c: char| !matches!(c, '<' | '>' | '=' | '^' | '~'))
        .unwrap_or(token.len());
    (&token[..end], token[end..].trim_start())
}

/// `^1.2.3` := `>=1.2.3 <2.0.0`, `^0.2.3` := `>=0.2.3 <0.3.0`, `^0.0.3` := `>=0.0.3 <0.0.4`
fn desugar_caret(
    partial: &PartialVersion,
    token: &str,
    comparators: &mut Vec<Comparator>,
) -> Result<(), RangeParseError> {
    let Some(major) = partial.major else {
        return Ok(());
    };
    let lower = partial.floor();

    let upper = match (partial.minor, partial.patch) {
        (Some(minor), None) if major == 0 => Version::new(0, bump(minor, token)?, 0),
        (Some(0), Some(patch)) if major == 0 => Version::new(0, 0, bump(patch, token)?),
        (Some(minor), Some(_)) if major == 0 => Version::new(0, bump(minor, token)?, 0),
        _ => Version::new(bump(major, token)?, 0, 0),
    };

    comparators.push(Comparator::new(Op::GreaterEq, lower));
    comparators.push(Comparator::new(Op::Less, upper));
    Ok(())
}

/// `~1.2.3` := `>=1.2.3 <1.3.0`, `~1` := `>=1.0.0 <2.0.0`
fn desugar_tilde(
    partial: &PartialVersion,
    token: &str,
    comparators: &mut Vec<Comparator>,
) -> Result<(), RangeParseError> {
    let Some(major) = partial.major else {
        return Ok(());
    };

    let upper = match partial.minor {
        None => Version::new(bump(major, token)?, 0, 0),
        Some(minor) => Version::new(major, bump(minor, token)?, 0),
    };

    comparators.push(Comparator::new(Op::GreaterEq, partial.floor()));
    comparators.push(Comparator::new(Op::Less, upper));
    Ok(())
}

/// `1.2.3` := `=1.2.3`, `1.2.x` := `>=1.2.0 <1.3.0`, `1` := `>=1.0.0 <2.0.0`
fn desugar_x_range(
    partial: &PartialVersion,
    token: &str,
    comparators: &mut Vec<Comparator>,
) -> Result<(), RangeParseError> {
    match (partial.major, partial.minor, partial.patch) {
        (None, _, _) => {},
        (Some(major), None, _) => {
            comparators.push(Comparator::new(Op::GreaterEq, Version::new(major, 0, 0)));
            comparators.push(Comparator::new(Op::Less, Version::new(bump(major, token)?, 0, 0)));
        },
        (Some(major), Some(minor), None) => {
            comparators.push(Comparator::new(Op::GreaterEq, Version::new(major, minor, 0)));
            comparators.push(Comparator::new(Op::Less, Version::new(major, bump(minor, token)?, 0)));
        },
        _ => comparators.push(Comparator::new(Op::Eq, partial.floor())),
    }
    Ok(())
}
