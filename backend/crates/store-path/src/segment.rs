//! Segment validation rules.
//!
//! Keys in the hosted store may not contain `.`, `#`, `$`, `[`, `]` or `/`,
//! nor ASCII control characters. The same rules apply to scope identifiers and
//! collection names because both end up as path segments.

use crate::StorePathError;

/// Characters that may never appear inside a single path segment.
pub const FORBIDDEN_CHARACTERS: [char; 6] = ['.', '#', '$', '[', ']', '/'];

/// Validate a single path segment.
///
/// # Errors
///
/// Returns [`StorePathError::EmptySegment`] for blank input and
/// [`StorePathError::ForbiddenCharacter`] when a reserved or control
/// character is present.
///
/// # Examples
///
/// ```
/// use store_path::{StorePathError, validate_segment};
///
/// assert!(validate_segment("users").is_ok());
/// assert_eq!(validate_segment("  "), Err(StorePathError::EmptySegment));
/// assert!(validate_segment("a.b").is_err());
/// ```
pub fn validate_segment(segment: &str) -> Result<(), StorePathError> {
    if segment.trim().is_empty() {
        return Err(StorePathError::EmptySegment);
    }

    if let Some(character) = segment
        .chars()
        .find(|c| FORBIDDEN_CHARACTERS.contains(c) || c.is_ascii_control())
    {
        return Err(StorePathError::ForbiddenCharacter {
            segment: segment.to_owned(),
            character,
        });
    }

    Ok(())
}
