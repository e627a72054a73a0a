//! Decoding of raw store entries into domain records.

use thiserror::Error;

use crate::domain::ports::StoreEntry;

/// Errors raised when a store entry cannot be read as a domain record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordDecodeError {
    /// The store key is not a valid record key.
    #[error("invalid record key '{key}': {message}")]
    InvalidKey {
        /// Raw key reported by the store.
        key: String,
        /// Validation failure.
        message: String,
    },
    /// The stored value does not match the record shape.
    #[error("malformed record '{key}': {message}")]
    InvalidPayload {
        /// Key of the malformed entry.
        key: String,
        /// Deserialisation failure.
        message: String,
    },
}

/// A domain record that lives in a store collection.
pub trait StoredRecord: Sized {
    /// Decode a collection entry, combining its key with the stored value.
    fn from_entry(entry: &StoreEntry) -> Result<Self, RecordDecodeError>;
}

/// Deserialise the value half of an entry.
pub(crate) fn decode_payload<P>(entry: &StoreEntry) -> Result<P, RecordDecodeError>
where
    P: serde::de::DeserializeOwned,
{
    serde_json::from_value(entry.value.clone()).map_err(|err| RecordDecodeError::InvalidPayload {
        key: entry.key.clone(),
        message: err.to_string(),
    })
}

/// Validate the key half of an entry.
pub(crate) fn decode_key<K, E>(
    entry: &StoreEntry,
    parse: impl FnOnce(String) -> Result<K, E>,
) -> Result<K, RecordDecodeError>
where
    E: std::fmt::Display,
{
    parse(entry.key.clone()).map_err(|err| RecordDecodeError::InvalidKey {
        key: entry.key.clone(),
        message: err.to_string(),
    })
}
