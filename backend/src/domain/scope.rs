//! Organisational scope (congregation) identifier.

use std::fmt;

use serde::{Deserialize, Serialize};
use store_path::{StorePathError, validate_segment};

/// Validation errors returned by [`Scope::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeValidationError {
    /// The identifier was blank.
    Empty,
    /// The identifier cannot be used as a store path segment.
    InvalidSegment(StorePathError),
}

impl fmt::Display for ScopeValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "scope must not be empty"),
            Self::InvalidSegment(err) => write!(f, "scope is not a valid path segment: {err}"),
        }
    }
}

impl std::error::Error for ScopeValidationError {}

/// Namespace under which every signup and user is partitioned.
///
/// ## Invariants
/// - Non-empty and free of surrounding whitespace.
/// - Usable verbatim as a store path segment.
///
/// # Examples
/// ```
/// use roster::domain::Scope;
///
/// let scope = Scope::new("north-side").expect("valid scope");
/// assert_eq!(scope.as_ref(), "north-side");
/// assert!(Scope::new("north.side").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Scope(String);

impl Scope {
    /// Validate and construct a [`Scope`].
    pub fn new(value: impl Into<String>) -> Result<Self, ScopeValidationError> {
        Self::from_owned(value.into())
    }

    fn from_owned(value: String) -> Result<Self, ScopeValidationError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ScopeValidationError::Empty);
        }
        validate_segment(trimmed).map_err(ScopeValidationError::InvalidSegment)?;
        if trimmed.len() == value.len() {
            Ok(Self(value))
        } else {
            Ok(Self(trimmed.to_owned()))
        }
    }
}

impl AsRef<str> for Scope {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<Scope> for String {
    fn from(value: Scope) -> Self {
        value.0
    }
}

impl TryFrom<String> for Scope {
    type Error = ScopeValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}
