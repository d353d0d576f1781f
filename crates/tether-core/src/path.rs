#![forbid(unsafe_code)]

//! Dotted/indexed addresses into a nested value graph.
//!
//! A [`Path`] is an ordered list of [`Segment`]s. The canonical string form
//! joins segments with `.`; a segment written as a plain decimal number
//! (ASCII digits, no leading zero) is an array index, anything else is a
//! field name. `007` is therefore the object key `"007"`, not index 7.
//!
//! ```
//! use tether_core::{Path, Segment};
//!
//! let path = Path::parse("powers.0.name").unwrap();
//! assert_eq!(path.segments()[1], Segment::Index(0));
//! assert_eq!(path.to_string(), "powers.0.name");
//! ```
//!
//! # Invariants
//!
//! 1. `Path::parse(p.to_string()) == p` for every parsed path.
//! 2. Two paths are equal iff their canonical strings are equal. Every
//!    constructor normalizes its segments so that derived equality and
//!    hashing agree with the string: a field holding `.` is split, and a
//!    field spelling a canonical index becomes an [`Segment::Index`].
//! 3. A parsed path is never empty.

use std::fmt;
use std::str::FromStr;

use crate::error::{BindError, BindResult};

/// One step of a [`Path`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Segment {
    /// Object field name.
    Field(String),
    /// Array index (or decimal object key).
    Index(usize),
}

impl Segment {
    /// Whether the segment is an array index.
    #[must_use]
    pub fn is_index(&self) -> bool {
        matches!(self, Self::Index(_))
    }

    /// Key used when this segment addresses an object.
    #[must_use]
    pub fn as_key(&self) -> std::borrow::Cow<'_, str> {
        match self {
            Self::Field(name) => std::borrow::Cow::Borrowed(name),
            Self::Index(idx) => std::borrow::Cow::Owned(idx.to_string()),
        }
    }

    fn parse(raw: &str, full: &str) -> BindResult<Self> {
        if raw.is_empty() {
            return Err(BindError::malformed(full, "empty segment"));
        }
        if is_index_literal(raw) {
            return raw
                .parse::<usize>()
                .map(Self::Index)
                .map_err(|_| BindError::malformed(full, "index out of range"));
        }
        Ok(Self::Field(raw.to_owned()))
    }
}

/// ASCII digits without a leading zero (`"0"` itself is allowed).
fn is_index_literal(raw: &str) -> bool {
    !raw.is_empty()
        && raw.bytes().all(|b| b.is_ascii_digit())
        && (raw.len() == 1 || !raw.starts_with('0'))
}

/// Push `segment` in canonical form: dotted fields split, index-like fields
/// turned into indices.
fn push_normalized(segments: &mut Vec<Segment>, segment: Segment) {
    match segment {
        Segment::Field(name) if name.contains('.') => {
            segments.extend(name.split('.').map(Segment::from));
        }
        Segment::Field(name) => segments.push(Segment::from(name)),
        index => segments.push(index),
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(name) => f.write_str(name),
            Self::Index(idx) => write!(f, "{idx}"),
        }
    }
}

impl From<usize> for Segment {
    fn from(idx: usize) -> Self {
        Self::Index(idx)
    }
}

impl From<&str> for Segment {
    fn from(name: &str) -> Self {
        Self::from(name.to_owned())
    }
}

impl From<String> for Segment {
    fn from(name: String) -> Self {
        if is_index_literal(&name) {
            if let Ok(idx) = name.parse() {
                return Self::Index(idx);
            }
        }
        Self::Field(name)
    }
}

/// Address of a location in the bound graph.
///
/// The empty path addresses the root itself; it can be built with
/// [`Path::root`] but never produced by [`Path::parse`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Path {
    segments: Vec<Segment>,
}

impl Path {
    /// The root path (no segments).
    #[must_use]
    pub const fn root() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Parse a dotted path string.
    ///
    /// # Errors
    ///
    /// [`BindError::MalformedPath`] when any segment is empty (this includes
    /// the empty string, leading/trailing dots and `..`) or an index does
    /// not fit in `usize`.
    pub fn parse(raw: &str) -> BindResult<Self> {
        let segments = raw
            .split('.')
            .map(|seg| Segment::parse(seg, raw))
            .collect::<BindResult<Vec<_>>>()?;
        Ok(Self { segments })
    }

    /// Build a path from segments, normalizing them to canonical form.
    #[must_use]
    pub fn from_segments(segments: impl IntoIterator<Item = Segment>) -> Self {
        let mut normalized = Vec::new();
        for segment in segments {
            push_normalized(&mut normalized, segment);
        }
        Self {
            segments: normalized,
        }
    }

    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Last segment, `None` for the root.
    #[must_use]
    pub fn last(&self) -> Option<&Segment> {
        self.segments.last()
    }

    /// Path of the enclosing container, `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<Path> {
        let (_, init) = self.segments.split_last()?;
        Some(Self {
            segments: init.to_vec(),
        })
    }

    /// Append one segment, returning the child path.
    ///
    /// A field containing `.` descends several levels, matching what the
    /// same text would mean in [`Path::parse`].
    #[must_use]
    pub fn child(&self, segment: impl Into<Segment>) -> Path {
        let mut segments = Vec::with_capacity(self.segments.len() + 1);
        segments.extend_from_slice(&self.segments);
        push_normalized(&mut segments, segment.into());
        Self { segments }
    }

    /// Concatenate `other` below `self`.
    #[must_use]
    pub fn join(&self, other: &Path) -> Path {
        let mut segments = self.segments.clone();
        segments.extend_from_slice(&other.segments);
        Self { segments }
    }

    /// Whether `self` is `other` or lies beneath it.
    #[must_use]
    pub fn starts_with(&self, other: &Path) -> bool {
        self.segments.starts_with(&other.segments)
    }

    /// Whether one path is a prefix of the other (including equality).
    #[must_use]
    pub fn overlaps(&self, other: &Path) -> bool {
        self.starts_with(other) || other.starts_with(self)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, seg) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{seg}")?;
        }
        Ok(())
    }
}

impl FromStr for Path {
    type Err = BindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for Path {
    type Error = BindError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_fields_and_indices() {
        let path = Path::parse("skills.programming.day").unwrap();
        assert_eq!(
            path.segments(),
            &[
                Segment::Field("skills".into()),
                Segment::Field("programming".into()),
                Segment::Field("day".into()),
            ]
        );

        let path = Path::parse("powers.1.description").unwrap();
        assert_eq!(path.segments()[1], Segment::Index(1));
    }

    #[test]
    fn mixed_alnum_segment_is_a_field() {
        let path = Path::parse("a.1b.2").unwrap();
        assert_eq!(path.segments()[1], Segment::Field("1b".into()));
        assert_eq!(path.segments()[2], Segment::Index(2));
    }

    #[test]
    fn empty_segments_are_malformed() {
        for raw in ["", ".", "a.", ".a", "a..b"] {
            let err = Path::parse(raw).unwrap_err();
            assert!(
                matches!(err, BindError::MalformedPath { .. }),
                "{raw:?} should be malformed, got {err:?}"
            );
        }
    }

    #[test]
    fn oversized_index_is_malformed() {
        let err = Path::parse("a.99999999999999999999999999").unwrap_err();
        assert!(matches!(
            err,
            BindError::MalformedPath {
                reason: "index out of range",
                ..
            }
        ));
    }

    #[test]
    fn canonical_round_trip() {
        let raw = "powers.0.name";
        assert_eq!(Path::parse(raw).unwrap().to_string(), raw);
    }

    #[test]
    fn leading_zero_segment_is_a_field() {
        let path = Path::parse("codes.007").unwrap();
        assert_eq!(path.segments()[1], Segment::Field("007".into()));
        assert_eq!(path.to_string(), "codes.007");
        assert_ne!(path, Path::parse("codes.7").unwrap());
        assert_eq!(Path::parse("a.0").unwrap().segments()[1], Segment::Index(0));
    }

    #[test]
    fn equality_follows_canonical_string() {
        let built = Path::from_segments([Segment::Field("a.b".into())]);
        assert_eq!(built, Path::parse("a.b").unwrap());
        assert_eq!(built.len(), 2);

        let built = Path::from_segments([
            Segment::Field("powers".into()),
            Segment::Field("1".into()),
        ]);
        assert_eq!(built, Path::parse("powers.1").unwrap());

        let child = Path::parse("skills").unwrap().child("programming.day");
        assert_eq!(child, Path::parse("skills.programming.day").unwrap());

        let mut seen = std::collections::HashSet::new();
        seen.insert(Path::parse("x.0").unwrap());
        assert!(seen.contains(&Path::root().child("x").child("0")));
    }

    #[test]
    fn parent_child_relationships() {
        let path = Path::parse("skills.programming.day").unwrap();
        let parent = path.parent().unwrap();
        assert_eq!(parent.to_string(), "skills.programming");
        assert_eq!(parent.child("night").to_string(), "skills.programming.night");
        assert!(path.starts_with(&parent));
        assert!(!parent.starts_with(&path));
        assert!(parent.overlaps(&path));
        assert!(path.overlaps(&parent));

        let sibling = Path::parse("skills.underwaterBasketWeaving").unwrap();
        assert!(!sibling.overlaps(&path));
        assert_eq!(Path::root().parent(), None);
    }

    #[test]
    fn segment_from_str_detects_indices() {
        assert_eq!(Segment::from("3"), Segment::Index(3));
        assert_eq!(Segment::from("03"), Segment::Field("03".into()));
        assert_eq!(Segment::from("name"), Segment::Field("name".into()));
        assert_eq!(Segment::Index(4).as_key(), "4");
    }
}
