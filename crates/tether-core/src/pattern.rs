#![forbid(unsafe_code)]

//! Path patterns for listener and validator registration.
//!
//! A [`Pattern`] is what callers hand in: a literal path, a list of literal
//! paths, or a regular expression. [`Pattern::compile`] validates literals and
//! yields a [`Matcher`] whose single [`test`](Matcher::test) operation decides
//! whether a changed path is of interest.
//!
//! Regular expressions are tested unanchored against the canonical path
//! string; anchor them explicitly (`^...$`) for whole-path matching.

use std::fmt;

use regex::Regex;

use crate::error::{BindError, BindResult};
use crate::path::Path;

/// Uncompiled registration pattern.
#[derive(Debug, Clone)]
pub enum Pattern {
    /// Exact path equality.
    Literal(String),
    /// Membership in a list of paths.
    Set(Vec<String>),
    /// Regular expression tested against the canonical path.
    Regex(Regex),
}

impl Pattern {
    /// Compile a regular expression pattern.
    ///
    /// # Errors
    ///
    /// [`BindError::InvalidPattern`] when `source` is not a valid regex.
    pub fn regex(source: &str) -> BindResult<Self> {
        Regex::new(source)
            .map(Self::Regex)
            .map_err(|err| BindError::InvalidPattern(err.to_string()))
    }

    /// Validate and canonicalize the pattern.
    ///
    /// # Errors
    ///
    /// [`BindError::MalformedPath`] when a literal is not a valid path.
    pub fn compile(self) -> BindResult<Matcher> {
        match self {
            Self::Literal(raw) => Ok(Matcher::Literal(canonical(&raw)?)),
            Self::Set(raws) => raws
                .iter()
                .map(|raw| canonical(raw))
                .collect::<BindResult<Vec<_>>>()
                .map(Matcher::Set),
            Self::Regex(re) => Ok(Matcher::Regex(re)),
        }
    }
}

fn canonical(raw: &str) -> BindResult<String> {
    Path::parse(raw).map(|path| path.to_string())
}

impl From<&str> for Pattern {
    fn from(raw: &str) -> Self {
        Self::Literal(raw.to_owned())
    }
}

impl From<String> for Pattern {
    fn from(raw: String) -> Self {
        Self::Literal(raw)
    }
}

impl From<&Path> for Pattern {
    fn from(path: &Path) -> Self {
        Self::Literal(path.to_string())
    }
}

impl From<Path> for Pattern {
    fn from(path: Path) -> Self {
        Self::Literal(path.to_string())
    }
}

impl From<Vec<String>> for Pattern {
    fn from(raws: Vec<String>) -> Self {
        Self::Set(raws)
    }
}

impl From<Vec<&str>> for Pattern {
    fn from(raws: Vec<&str>) -> Self {
        Self::Set(raws.into_iter().map(str::to_owned).collect())
    }
}

impl From<&[&str]> for Pattern {
    fn from(raws: &[&str]) -> Self {
        Self::Set(raws.iter().map(|s| (*s).to_owned()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Pattern {
    fn from(raws: [&str; N]) -> Self {
        Self::Set(raws.iter().map(|s| (*s).to_owned()).collect())
    }
}

impl From<Regex> for Pattern {
    fn from(re: Regex) -> Self {
        Self::Regex(re)
    }
}

/// Compiled pattern: one matching operation per shape.
#[derive(Debug, Clone)]
pub enum Matcher {
    Literal(String),
    Set(Vec<String>),
    Regex(Regex),
}

impl Matcher {
    /// Test a canonical path string.
    #[must_use]
    pub fn test(&self, path: &str) -> Option<Hit> {
        match self {
            Self::Literal(lit) => (lit == path).then_some(Hit::Exact),
            Self::Set(lits) => lits.iter().any(|lit| lit == path).then_some(Hit::Exact),
            Self::Regex(re) => re
                .captures(path)
                .map(|caps| Hit::Captured(PatternMatch::from_captures(re, &caps))),
        }
    }

    /// Test a parsed path.
    #[must_use]
    pub fn matches(&self, path: &Path) -> Option<Hit> {
        self.test(&path.to_string())
    }
}

impl fmt::Display for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(lit) => f.write_str(lit),
            Self::Set(lits) => write!(f, "[{}]", lits.join(", ")),
            Self::Regex(re) => write!(f, "/{}/", re.as_str()),
        }
    }
}

/// Outcome of a successful [`Matcher::test`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Hit {
    /// Literal or list membership.
    Exact,
    /// Regex match with its capture data.
    Captured(PatternMatch),
}

impl Hit {
    /// Capture data for regex hits.
    #[must_use]
    pub fn captures(&self) -> Option<&PatternMatch> {
        match self {
            Self::Exact => None,
            Self::Captured(m) => Some(m),
        }
    }
}

/// Owned capture groups of a regex pattern hit.
///
/// Group 0 is the whole match, as with [`regex::Captures`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternMatch {
    groups: Vec<Option<String>>,
    names: Vec<Option<String>>,
}

impl PatternMatch {
    fn from_captures(re: &Regex, caps: &regex::Captures<'_>) -> Self {
        let groups = caps
            .iter()
            .map(|group| group.map(|m| m.as_str().to_owned()))
            .collect();
        let names = re.capture_names().map(|n| n.map(str::to_owned)).collect();
        Self { groups, names }
    }

    /// The matched portion of the path.
    #[must_use]
    pub fn matched(&self) -> &str {
        self.get(0).unwrap_or_default()
    }

    /// Capture group `index`, `None` if it did not participate.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.groups.get(index)?.as_deref()
    }

    /// Named capture group.
    #[must_use]
    pub fn name(&self, name: &str) -> Option<&str> {
        let index = self
            .names
            .iter()
            .position(|n| n.as_deref() == Some(name))?;
        self.get(index)
    }

    /// Number of groups including group 0.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_parsed_paths() {
        let matcher = Pattern::from("powers.0.name").compile().unwrap();
        let path = Path::parse("powers.0.name").unwrap();
        assert_eq!(matcher.matches(&path), Some(Hit::Exact));
        assert_eq!(matcher.matches(&Path::parse("powers.1.name").unwrap()), None);
    }

    #[test]
    fn literal_matches_exactly() {
        let m = Pattern::from("name").compile().unwrap();
        assert_eq!(m.test("name"), Some(Hit::Exact));
        assert_eq!(m.test("names"), None);
        assert_eq!(m.test("first.name"), None);
    }

    #[test]
    fn literal_is_canonicalized() {
        let m = Pattern::from("powers.00.name").compile().unwrap();
        assert!(m.test("powers.0.name").is_some());
    }

    #[test]
    fn set_matches_membership() {
        let m = Pattern::from(["name", "level"]).compile().unwrap();
        assert!(m.test("name").is_some());
        assert!(m.test("level").is_some());
        assert!(m.test("race").is_none());
    }

    #[test]
    fn malformed_literal_fails_compile() {
        let err = Pattern::from(vec!["name", "a..b"]).compile().unwrap_err();
        assert!(matches!(err, BindError::MalformedPath { .. }));
    }

    #[test]
    fn regex_hit_carries_groups() {
        let m = Pattern::regex(r"skills\.(.*)\.day").unwrap().compile().unwrap();
        let hit = m.test("skills.programming.day").unwrap();
        let caps = hit.captures().unwrap();
        assert_eq!(caps.matched(), "skills.programming.day");
        assert_eq!(caps.get(1), Some("programming"));
        assert_eq!(caps.len(), 2);
        assert!(m.test("skills.programming.night").is_none());
    }

    #[test]
    fn regex_named_groups() {
        let m = Pattern::regex(r"^powers\.(?P<slot>\d+)\.name$")
            .unwrap()
            .compile()
            .unwrap();
        let hit = m.test("powers.1.name").unwrap();
        assert_eq!(hit.captures().unwrap().name("slot"), Some("1"));
        assert_eq!(hit.captures().unwrap().name("missing"), None);
    }

    #[test]
    fn invalid_regex_is_reported() {
        let err = Pattern::regex("skills.(").unwrap_err();
        assert!(matches!(err, BindError::InvalidPattern(_)));
    }

    #[test]
    fn display_forms() {
        assert_eq!(Pattern::from("a.b").compile().unwrap().to_string(), "a.b");
        assert_eq!(
            Pattern::from(["a", "b"]).compile().unwrap().to_string(),
            "[a, b]"
        );
        assert_eq!(
            Pattern::regex("x+").unwrap().compile().unwrap().to_string(),
            "/x+/"
        );
    }
}
