//! Where signups and users live in the store.
//!
//! Signups sit under a global root partitioned by scope
//! (`/signup/{scope}`), while users sit under the scope itself
//! (`/{scope}/users`). Both collection names are configurable.

use store_path::{StorePath, StorePathError, validate_segment};

use crate::domain::{Scope, SignupKey, UserKey};

/// Default root of the signup collections.
pub const DEFAULT_SIGNUP_ROOT: &str = "signup";
/// Default name of each scope's users collection.
pub const DEFAULT_USERS_COLLECTION: &str = "users";

/// Builds store paths for the provisioning collections.
///
/// # Examples
/// ```
/// use roster::domain::{CollectionLayout, Scope};
///
/// let layout = CollectionLayout::default();
/// let scope = Scope::new("north").expect("valid scope");
/// assert_eq!(layout.signups(&scope).expect("path").to_string(), "/signup/north");
/// assert_eq!(layout.users(&scope).expect("path").to_string(), "/north/users");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionLayout {
    signup_root: String,
    users_collection: String,
}

impl CollectionLayout {
    /// Build a layout with custom collection names.
    ///
    /// # Errors
    ///
    /// Returns [`StorePathError`] when either name is not a valid segment.
    pub fn new(
        signup_root: impl Into<String>,
        users_collection: impl Into<String>,
    ) -> Result<Self, StorePathError> {
        let signup_root = signup_root.into();
        let users_collection = users_collection.into();
        validate_segment(&signup_root)?;
        validate_segment(&users_collection)?;
        Ok(Self {
            signup_root,
            users_collection,
        })
    }

    /// Collection of pending signups for `scope`.
    pub fn signups(&self, scope: &Scope) -> Result<StorePath, StorePathError> {
        StorePath::from_segments([self.signup_root.as_str(), scope.as_ref()])
    }

    /// Node of one pending signup.
    pub fn signup(&self, scope: &Scope, key: &SignupKey) -> Result<StorePath, StorePathError> {
        self.signups(scope)?.child(key)
    }

    /// Collection of approved users for `scope`.
    pub fn users(&self, scope: &Scope) -> Result<StorePath, StorePathError> {
        StorePath::from_segments([scope.as_ref(), self.users_collection.as_str()])
    }

    /// Node of one user.
    pub fn user(&self, scope: &Scope, key: &UserKey) -> Result<StorePath, StorePathError> {
        self.users(scope)?.child(key)
    }
}

impl Default for CollectionLayout {
    fn default() -> Self {
        Self {
            signup_root: DEFAULT_SIGNUP_ROOT.to_owned(),
            users_collection: DEFAULT_USERS_COLLECTION.to_owned(),
        }
    }
}
