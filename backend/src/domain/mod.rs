//! Domain primitives, ports, and the identity provisioning service.
//!
//! Purpose: Define the strongly typed records an administrator works with
//! (signups, users, usernames, scopes) and the service that turns signups
//! into users. Storage, session, and locking concerns sit behind the traits
//! in [`ports`] so adapters can be swapped without touching the rules here.
//!
//! Public surface:
//! - Error (alias to `error::Error`): failure payload for every operation.
//! - ErrorCode (alias to `error::ErrorCode`): stable error identifier.
//! - Signup / User (aliases to `signup::Signup` and `user::User`): records.
//! - IdentityProvisioningService: implements the driving port.

pub mod auth;
pub mod error;
pub mod identity_provisioning_service;
pub mod keys;
pub mod layout;
pub mod live;
pub mod ports;
pub mod record;
pub mod scope;
pub mod signup;
pub mod user;
pub mod username;

pub use self::auth::Password;
pub use self::error::{Error, ErrorCode};
pub use self::identity_provisioning_service::IdentityProvisioningService;
pub use self::keys::{SignupKey, UserKey};
pub use self::layout::{CollectionLayout, DEFAULT_SIGNUP_ROOT, DEFAULT_USERS_COLLECTION};
pub use self::live::LiveCollection;
pub use self::record::{RecordDecodeError, StoredRecord};
pub use self::scope::{Scope, ScopeValidationError};
pub use self::signup::{Signup, SignupRecord};
pub use self::user::{Role, User, UserRecord, UserUpdate, UserValidationError, Username};
pub use self::username::{DEFAULT_MAX_SUFFIX_ATTEMPTS, SuffixPolicy, UsernameExhausted};

/// Result alias used by the provisioning operations.
///
/// # Examples
/// ```
/// use roster::domain::{Error, ProvisioningResult};
///
/// fn approve() -> ProvisioningResult<()> {
///     Err(Error::forbidden("no active session"))
/// }
/// assert!(approve().is_err());
/// ```
pub type ProvisioningResult<T> = Result<T, Error>;
