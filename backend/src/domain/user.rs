//! Approved user accounts.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::ports::StoreEntry;
use crate::domain::record::{RecordDecodeError, StoredRecord, decode_key, decode_payload};
use crate::domain::{Password, UserKey};

/// Validation errors returned by [`Username::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    /// The username was blank.
    EmptyUsername,
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyUsername => write!(f, "username must not be empty"),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Login name, unique within a scope.
///
/// ## Invariants
/// - Not blank. Otherwise kept verbatim, surrounding whitespace included,
///   since approval copies the phone number as entered.
///
/// # Examples
/// ```
/// use roster::domain::Username;
///
/// let base = Username::new("555").expect("valid username");
/// assert_eq!(base.with_suffix("c").as_ref(), "555c");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Validate and construct a [`Username`].
    pub fn new(value: impl Into<String>) -> Result<Self, UserValidationError> {
        Self::from_owned(value.into())
    }

    fn from_owned(value: String) -> Result<Self, UserValidationError> {
        if value.trim().is_empty() {
            return Err(UserValidationError::EmptyUsername);
        }
        Ok(Self(value))
    }

    /// Append a disambiguating suffix.
    #[must_use]
    pub fn with_suffix(&self, suffix: &str) -> Self {
        Self(format!("{}{suffix}", self.0))
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

impl TryFrom<String> for Username {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Permission level of an account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Ordinary congregation member; the role every approval assigns.
    #[default]
    Member,
    /// Administrator able to approve and manage accounts.
    Admin,
}

/// An approved account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Store-assigned key within the scope's users collection.
    pub key: UserKey,
    /// Login name, unique within the scope.
    pub username: Username,
    /// Stored credential, when the store exposes it.
    pub password: Option<Password>,
    /// Permission level.
    pub role: Role,
    /// Full name.
    pub name: String,
    /// Phone number.
    pub phone: String,
}

/// Stored shape of a user, without its key. Also the payload pushed when a
/// signup is approved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Login name.
    pub username: Username,
    /// Credential.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<Password>,
    /// Permission level.
    #[serde(default)]
    pub role: Role,
    /// Full name.
    #[serde(default)]
    pub name: String,
    /// Phone number.
    #[serde(default)]
    pub phone: String,
}

impl UserRecord {
    /// Attach the key the store assigned on push.
    pub fn into_user(self, key: UserKey) -> User {
        User {
            key,
            username: self.username,
            password: self.password,
            role: self.role,
            name: self.name,
            phone: self.phone,
        }
    }
}

impl StoredRecord for User {
    fn from_entry(entry: &StoreEntry) -> Result<Self, RecordDecodeError> {
        let key = decode_key(entry, UserKey::new)?;
        let record: UserRecord = decode_payload(entry)?;
        Ok(record.into_user(key))
    }
}

/// Partial update of an existing user.
///
/// Absent fields are left untouched by the store merge. A supplied password
/// is always discarded; credentials only change through a reset.
///
/// # Examples
/// ```
/// use roster::domain::{UserKey, UserUpdate, Username};
///
/// let key = UserKey::new("-k2").expect("valid key");
/// let update = UserUpdate::new(key)
///     .with_username(Username::new("dave").expect("valid username"))
///     .with_phone("123");
/// assert!(update.password.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserUpdate {
    /// Key of the record to update; never written.
    pub key: UserKey,
    /// New login name, applied only when no other user holds it.
    pub username: Option<Username>,
    /// Ignored; present so a full [`User`] can be passed through unchanged.
    pub password: Option<Password>,
    /// New permission level.
    pub role: Option<Role>,
    /// New full name.
    pub name: Option<String>,
    /// New phone number.
    pub phone: Option<String>,
}

impl UserUpdate {
    /// Start an empty update for `key`.
    pub fn new(key: UserKey) -> Self {
        Self {
            key,
            username: None,
            password: None,
            role: None,
            name: None,
            phone: None,
        }
    }

    /// Set the requested username.
    #[must_use]
    pub fn with_username(mut self, username: Username) -> Self {
        self.username = Some(username);
        self
    }

    /// Set a password; it will be stripped before writing.
    #[must_use]
    pub fn with_password(mut self, password: Password) -> Self {
        self.password = Some(password);
        self
    }

    /// Set the role.
    #[must_use]
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    /// Set the full name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the phone number.
    #[must_use]
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }
}

impl From<User> for UserUpdate {
    fn from(value: User) -> Self {
        Self {
            key: value.key,
            username: Some(value.username),
            password: value.password,
            role: Some(value.role),
            name: Some(value.name),
            phone: Some(value.phone),
        }
    }
}

/// Fields merged into a user node. Never carries a key or a password.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub(crate) struct UserPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) username: Option<Username>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) phone: Option<String>,
}

impl UserPatch {
    pub(crate) fn into_fields(self) -> Result<Map<String, Value>, serde_json::Error> {
        match serde_json::to_value(self)? {
            Value::Object(fields) => Ok(fields),
            _ => Ok(Map::new()),
        }
    }
}
