//! Username collision resolution.
//!
//! Approval derives a username from the signup's phone number. When another
//! user in the scope already holds it, a suffix is appended and the taken set
//! re-checked until a free candidate turns up or the policy runs out.

use std::collections::HashSet;

use thiserror::Error;

use crate::domain::Username;

/// Default upper bound for [`SuffixPolicy::Numeric`].
pub const DEFAULT_MAX_SUFFIX_ATTEMPTS: u32 = 99;

/// Raised when every candidate the policy can produce is taken.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no free username derived from '{base}' after {attempts} candidates")]
pub struct UsernameExhausted {
    /// The unsuffixed candidate.
    pub base: Username,
    /// Number of candidates tried, the bare one included.
    pub attempts: usize,
}

/// How colliding usernames are disambiguated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SuffixPolicy {
    /// Append a single lowercase letter, `a` through `z`.
    #[default]
    Alphabetic,
    /// Append a decimal counter from `1` up to `max_attempts`.
    Numeric {
        /// Largest counter value tried.
        max_attempts: u32,
    },
}

impl SuffixPolicy {
    /// Candidate usernames in the order they are tried.
    ///
    /// # Examples
    /// ```
    /// use roster::domain::{SuffixPolicy, Username};
    ///
    /// let base = Username::new("555").expect("valid username");
    /// let names: Vec<String> = SuffixPolicy::Numeric { max_attempts: 2 }
    ///     .candidates(&base)
    ///     .map(String::from)
    ///     .collect();
    /// assert_eq!(names, ["555", "5551", "5552"]);
    /// ```
    pub fn candidates<'a>(
        &self,
        base: &'a Username,
    ) -> impl Iterator<Item = Username> + use<'a> {
        let suffixes: Box<dyn Iterator<Item = String>> = match *self {
            Self::Alphabetic => Box::new(('a'..='z').map(String::from)),
            Self::Numeric { max_attempts } => {
                Box::new((1..=max_attempts).map(|n| n.to_string()))
            }
        };
        std::iter::once(base.clone()).chain(suffixes.map(move |suffix| base.with_suffix(&suffix)))
    }

    /// Pick the first candidate not present in `taken`.
    ///
    /// # Errors
    ///
    /// Returns [`UsernameExhausted`] when every candidate is taken.
    ///
    /// # Examples
    /// ```
    /// use std::collections::HashSet;
    /// use roster::domain::{SuffixPolicy, Username};
    ///
    /// let taken: HashSet<String> = ["555", "555a", "555b"].map(String::from).into();
    /// let base = Username::new("555").expect("valid username");
    /// let resolved = SuffixPolicy::Alphabetic.resolve(&base, &taken).expect("free name");
    /// assert_eq!(resolved.as_ref(), "555c");
    /// ```
    pub fn resolve(
        &self,
        base: &Username,
        taken: &HashSet<String>,
    ) -> Result<Username, UsernameExhausted> {
        let mut attempts = 0_usize;
        for candidate in self.candidates(base) {
            attempts += 1;
            if !taken.contains(candidate.as_ref()) {
                return Ok(candidate);
            }
        }
        Err(UsernameExhausted {
            base: base.clone(),
            attempts,
        })
    }
}
