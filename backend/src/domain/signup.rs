//! Pending registrations awaiting administrator approval.

use serde::{Deserialize, Serialize};

use crate::domain::ports::StoreEntry;
use crate::domain::record::{RecordDecodeError, StoredRecord, decode_key, decode_payload};
use crate::domain::{Password, SignupKey};

/// A self-service registration that has not been approved yet.
///
/// Signups are created outside this crate and are only ever read and deleted
/// here; approval copies them into a user record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signup {
    /// Store-assigned key within the scope's signup collection.
    pub key: SignupKey,
    /// Full name entered at registration.
    pub name: String,
    /// Phone number entered at registration; seeds the username.
    pub phone: String,
    /// Credential chosen at registration.
    pub password: Password,
}

/// Stored shape of a signup, without its key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupRecord {
    /// Full name.
    #[serde(default)]
    pub name: String,
    /// Phone number.
    #[serde(default)]
    pub phone: String,
    /// Cleartext credential pending approval.
    pub password: Password,
}

impl StoredRecord for Signup {
    fn from_entry(entry: &StoreEntry) -> Result<Self, RecordDecodeError> {
        let key = decode_key(entry, SignupKey::new)?;
        let SignupRecord {
            name,
            phone,
            password,
        } = decode_payload(entry)?;
        Ok(Self {
            key,
            name,
            phone,
            password,
        })
    }
}
