//! Driving port for account administration.
//!
//! Presentation collaborators hold an `Arc<dyn IdentityProvisioning>` and
//! never reach the store or session adapters directly.

use async_trait::async_trait;

use crate::domain::{
    LiveCollection, ProvisioningResult, Scope, Signup, SignupKey, User, UserKey, UserUpdate,
};

/// Domain use-case port for approving signups and managing users.
#[async_trait]
pub trait IdentityProvisioning: Send + Sync {
    /// Scope of the signed-in administrator.
    async fn current_scope(&self) -> ProvisioningResult<Scope>;

    /// Live view of pending signups in `scope`.
    async fn watch_signups(&self, scope: &Scope) -> ProvisioningResult<LiveCollection<Signup>>;

    /// Turn a signup into a member account and delete the signup.
    async fn approve_user(&self, scope: &Scope, signup: &Signup) -> ProvisioningResult<User>;

    /// Live view of users in `scope`.
    async fn watch_users(&self, scope: &Scope) -> ProvisioningResult<LiveCollection<User>>;

    /// Delete a signup without approving it.
    async fn remove_signup(&self, scope: &Scope, key: &SignupKey) -> ProvisioningResult<()>;

    /// Reset the user's credential to their username.
    async fn reset_password(&self, scope: &Scope, user: &User) -> ProvisioningResult<()>;

    /// Merge `update` into the stored user.
    ///
    /// Resolves to `true` when the username was written and `false` when it
    /// was withheld or never supplied.
    async fn update_user(&self, scope: &Scope, update: UserUpdate) -> ProvisioningResult<bool>;

    /// Delete a user.
    async fn remove_user(&self, scope: &Scope, key: &UserKey) -> ProvisioningResult<()>;
}
