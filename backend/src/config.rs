//! Provisioning configuration loaded via OrthoConfig.

use ortho_config::OrthoConfig;
use serde::Deserialize;
use store_path::StorePathError;
use thiserror::Error;

use crate::domain::{
    CollectionLayout, DEFAULT_MAX_SUFFIX_ATTEMPTS, DEFAULT_SIGNUP_ROOT, DEFAULT_USERS_COLLECTION,
    SuffixPolicy,
};

const ALPHABETIC: &str = "alphabetic";
const NUMERIC: &str = "numeric";

/// Errors raised when settings describe an unusable configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// `username_suffix` names no known policy.
    #[error("unknown username suffix policy '{value}' (expected alphabetic or numeric)")]
    UnknownSuffixPolicy {
        /// Configured value.
        value: String,
    },
    /// The numeric policy would never try a suffix.
    #[error("max_suffix_attempts must be at least 1")]
    ZeroSuffixAttempts,
    /// A collection name cannot be used as a store path segment.
    #[error("invalid collection name: {0}")]
    InvalidCollection(#[from] StorePathError),
}

/// Configuration values controlling where records live and how usernames
/// are disambiguated.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "ROSTER")]
pub struct ProvisioningSettings {
    /// Root of the per-scope signup collections.
    pub signup_root: Option<String>,
    /// Name of each scope's users collection.
    pub users_collection: Option<String>,
    /// Collision policy: `alphabetic` or `numeric`.
    pub username_suffix: Option<String>,
    /// Largest counter tried by the numeric policy.
    pub max_suffix_attempts: Option<u32>,
}

impl ProvisioningSettings {
    /// Return the configured signup root, falling back to the default.
    pub fn signup_root(&self) -> &str {
        self.signup_root.as_deref().unwrap_or(DEFAULT_SIGNUP_ROOT)
    }

    /// Return the configured users collection, falling back to the default.
    pub fn users_collection(&self) -> &str {
        self.users_collection
            .as_deref()
            .unwrap_or(DEFAULT_USERS_COLLECTION)
    }

    /// Return the configured attempt bound, falling back to the default.
    pub fn max_suffix_attempts(&self) -> u32 {
        self.max_suffix_attempts.unwrap_or(DEFAULT_MAX_SUFFIX_ATTEMPTS)
    }

    /// Build the collision policy.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for an unknown policy name or a zero bound.
    pub fn suffix_policy(&self) -> Result<SuffixPolicy, ConfigError> {
        let name = self
            .username_suffix
            .as_deref()
            .map(str::trim)
            .unwrap_or(ALPHABETIC);
        if name.eq_ignore_ascii_case(ALPHABETIC) {
            return Ok(SuffixPolicy::Alphabetic);
        }
        if !name.eq_ignore_ascii_case(NUMERIC) {
            return Err(ConfigError::UnknownSuffixPolicy {
                value: name.to_owned(),
            });
        }
        match self.max_suffix_attempts() {
            0 => Err(ConfigError::ZeroSuffixAttempts),
            max_attempts => Ok(SuffixPolicy::Numeric { max_attempts }),
        }
    }

    /// Build the collection layout.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidCollection`] when a name is not a valid
    /// store path segment.
    pub fn layout(&self) -> Result<CollectionLayout, ConfigError> {
        Ok(CollectionLayout::new(
            self.signup_root(),
            self.users_collection(),
        )?)
    }
}
