//! Credential primitives.
//!
//! Signups carry the cleartext password chosen at registration until an
//! administrator approves them, and resets assign a known credential. Both
//! paths hold the value in a zeroizing buffer and never print it.

use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

/// Account credential.
///
/// ## Invariants
/// - The value is wiped from memory when dropped.
/// - `Debug` output is redacted.
///
/// # Examples
/// ```
/// use roster::domain::Password;
///
/// let password = Password::new("hunter2");
/// assert_eq!(password.expose(), "hunter2");
/// assert_eq!(format!("{password:?}"), "Password(<redacted>)");
/// ```
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Password(Zeroizing<String>);

impl Password {
    /// Wrap a credential value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(Zeroizing::new(value.into()))
    }

    /// Borrow the cleartext credential for a store write.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(<redacted>)")
    }
}

impl From<String> for Password {
    fn from(value: String) -> Self {
        Self(Zeroizing::new(value))
    }
}

impl From<Password> for String {
    fn from(value: Password) -> Self {
        value.expose().to_owned()
    }
}
