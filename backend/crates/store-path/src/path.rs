//! The [`StorePath`] value type.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{StorePathError, validate_segment};

/// Absolute path to a node in the hierarchical store.
///
/// ## Invariants
/// - Every segment satisfies [`validate_segment`].
/// - Leading, trailing, and repeated slashes are insignificant, so
///   `/signup/north/` and `signup/north` parse to the same path.
/// - The root path has no segments and renders as `/`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StorePath {
    segments: Vec<String>,
}

impl StorePath {
    /// The root of the store.
    #[must_use]
    pub const fn root() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Parse a slash-separated path.
    ///
    /// # Errors
    ///
    /// Returns [`StorePathError`] when any non-empty segment is invalid.
    pub fn parse(raw: &str) -> Result<Self, StorePathError> {
        let segments = raw
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(|segment| validate_segment(segment).map(|()| segment.to_owned()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { segments })
    }

    /// Build a path from individual segments.
    ///
    /// # Errors
    ///
    /// Returns [`StorePathError`] when any segment is invalid. Unlike
    /// [`StorePath::parse`], empty segments are rejected rather than skipped.
    pub fn from_segments<I, S>(segments: I) -> Result<Self, StorePathError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        segments
            .into_iter()
            .try_fold(Self::root(), |path, segment| path.child(segment))
    }

    /// Return a new path with `segment` appended.
    ///
    /// # Errors
    ///
    /// Returns [`StorePathError`] when `segment` is not a valid key.
    pub fn child(&self, segment: impl AsRef<str>) -> Result<Self, StorePathError> {
        let segment = segment.as_ref();
        validate_segment(segment)?;
        let mut segments = self.segments.clone();
        segments.push(segment.to_owned());
        Ok(Self { segments })
    }

    /// Return the enclosing path, or `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        let (_, init) = self.segments.split_last()?;
        Some(Self {
            segments: init.to_vec(),
        })
    }

    /// The final segment, typically a record key.
    #[must_use]
    pub fn last(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// Iterate over the path segments from the root downwards.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().map(String::as_str)
    }

    /// Whether `prefix` is this path or one of its ancestors.
    #[must_use]
    pub fn starts_with(&self, prefix: &Self) -> bool {
        self.segments.starts_with(&prefix.segments)
    }

    /// Whether one path contains the other.
    ///
    /// A change at either path is visible to an observer of the other.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.starts_with(other) || other.starts_with(self)
    }
}

impl fmt::Display for StorePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("/");
        }
        for segment in &self.segments {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}

impl FromStr for StorePath {
    type Err = StorePathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for StorePath {
    type Error = StorePathError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<StorePath> for String {
    fn from(value: StorePath) -> Self {
        value.to_string()
    }
}
