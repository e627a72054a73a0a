//! Store-assigned record keys.
//!
//! Keys are opaque strings generated by the hierarchical store when a record
//! is pushed onto a collection. Signup and user keys are distinct types so a
//! signup key can never address a user node by mistake.

use std::fmt;

use serde::{Deserialize, Serialize};
use store_path::{StorePathError, validate_segment};

macro_rules! define_record_key {
    ($(#[$outer:meta])* $name:ident) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Validate and construct a key from store output.
            pub fn new(value: impl Into<String>) -> Result<Self, StorePathError> {
                let value = value.into();
                validate_segment(&value)?;
                Ok(Self(value))
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.0.as_str()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_ref())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = StorePathError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }
    };
}

define_record_key! {
    /// Key of a pending signup within the scope's signup collection.
    SignupKey
}

define_record_key! {
    /// Key of an approved user within the scope's users collection.
    UserKey
}
