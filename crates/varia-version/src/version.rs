//! Version parsing and total ordering.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Errors that can occur when parsing a version string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionError {
    #[error("unparsable version string: '{0}'")]
    Unparsable(String),
}

/// A single version token: either a number or an alphanumeric run.
///
/// Numbers compare numerically, alphanumeric runs compare bytewise, and
/// numbers order before alphanumeric runs.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Num(u64),
    Alpha(String),
}

impl Token {
    fn parse(s: &str) -> Result<Self, ()> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(());
        }
        match s.parse::<u64>() {
            Ok(n) => Ok(Token::Num(n)),
            Err(_) => Ok(Token::Alpha(s.to_string())),
        }
    }
}

impl Ord for Token {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Token::Num(a), Token::Num(b)) => a.cmp(b),
            (Token::Alpha(a), Token::Alpha(b)) => a.cmp(b),
            (Token::Num(_), Token::Alpha(_)) => Ordering::Less,
            (Token::Alpha(_), Token::Num(_)) => Ordering::Greater,
        }
    }
}

impl PartialOrd for Token {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A parsed version string with a total ordering.
///
/// The string is split on the first `-` into a release part and an optional
/// pre-release part; each part tokenizes on `.`. Ordering rules:
/// - Token lists compare elementwise; the list that runs out first is lower
///   (`1.2 < 1.2.1`).
/// - With equal release parts, a version carrying a pre-release is lower
///   than one without (`2.0.0-rc1 < 2.0.0`).
#[derive(Debug, Clone)]
pub struct Version {
    raw: String,
    release: Vec<Token>,
    pre: Option<Vec<Token>>,
}

impl Version {
    /// Parse a version string.
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        let unparsable = || VersionError::Unparsable(input.to_string());

        let (release_str, pre_str) = match input.split_once('-') {
            Some((r, p)) => (r, Some(p)),
            None => (input, None),
        };

        let release = parse_tokens(release_str).ok_or_else(unparsable)?;
        let pre = match pre_str {
            Some(p) => Some(parse_tokens(p).ok_or_else(unparsable)?),
            None => None,
        };

        Ok(Self {
            raw: input.to_string(),
            release,
            pre,
        })
    }

    /// The original version string.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Whether this version orders strictly before `reference`.
    pub fn older_than(&self, reference: &Version) -> bool {
        self < reference
    }

    /// Whether this version orders at or after `reference`.
    pub fn at_least(&self, reference: &Version) -> bool {
        self >= reference
    }

    /// Whether this version is in the half-open range `[lo, hi)`.
    pub fn between(&self, lo: &Version, hi: &Version) -> bool {
        self.at_least(lo) && self.older_than(hi)
    }
}

fn parse_tokens(part: &str) -> Option<Vec<Token>> {
    if part.is_empty() {
        return None;
    }
    part.split('.')
        .map(|t| Token::parse(t).ok())
        .collect::<Option<Vec<_>>>()
}

fn cmp_tokens(a: &[Token], b: &[Token]) -> Ordering {
    for (ta, tb) in a.iter().zip(b.iter()) {
        match ta.cmp(tb) {
            Ordering::Equal => {}
            other => return other,
        }
    }
    a.len().cmp(&b.len())
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        cmp_tokens(&self.release, &other.release).then_with(|| match (&self.pre, &other.pre) {
            (None, None) => Ordering::Equal,
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (Some(a), Some(b)) => cmp_tokens(a, b),
        })
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Equality follows the ordering, not the raw string: "1.0" == "1.00".
impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Version::parse(s)
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Version::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Compare two version strings.
pub fn compare(a: &str, b: &str) -> Result<Ordering, VersionError> {
    Ok(Version::parse(a)?.cmp(&Version::parse(b)?))
}
