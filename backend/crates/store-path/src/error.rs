//! Error types for store path parsing.

use thiserror::Error;

/// Errors raised when a path or segment cannot address a store node.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorePathError {
    /// A segment was empty or whitespace-only.
    #[error("path segment must not be empty")]
    EmptySegment,

    /// A segment contained a character the store reserves.
    #[error("path segment '{segment}' contains forbidden character {character:?}")]
    ForbiddenCharacter {
        /// The offending segment.
        segment: String,
        /// The first reserved character found.
        character: char,
    },
}
