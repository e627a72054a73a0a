//! Identity provisioning domain service.
//!
//! Implements the [`IdentityProvisioning`] driving port on top of the store,
//! session, and lease driven ports. Username uniqueness within a scope rests
//! on two read-check-write sequences (approval and update); both run while the
//! scope lease is held.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};
use store_path::{StorePath, StorePathError};
use tracing::{debug, info, warn};

use crate::domain::ports::{
    HierarchicalStore, IdentityProvisioning, LeaseError, LeaseGuard, ScopeLease, SessionContext,
    SessionError, StoreEntry, StoreError,
};
use crate::domain::user::UserPatch;
use crate::domain::{
    CollectionLayout, Error, LiveCollection, Password, ProvisioningResult, Role, Scope, Signup,
    SignupKey, SuffixPolicy, User, UserKey, UserRecord, UserUpdate, Username, UsernameExhausted,
};

fn map_store_error(error: StoreError) -> Error {
    match error {
        StoreError::Connection { message } => {
            Error::service_unavailable(format!("store unavailable: {message}"))
        }
        StoreError::Rejected { path, message } => {
            Error::forbidden(format!("store rejected operation at {path}: {message}"))
        }
        StoreError::Missing { path } => Error::not_found(format!("no record at {path}")),
    }
}

fn map_session_error(error: SessionError) -> Error {
    match error {
        SessionError::NoActiveSession => Error::forbidden("no active session"),
        SessionError::UnknownAccount { key } => Error::not_found(format!("unknown account {key}")),
        SessionError::Rejected { message } => {
            Error::forbidden(format!("credential change rejected: {message}"))
        }
    }
}

fn map_lease_error(error: LeaseError) -> Error {
    match error {
        LeaseError::Unavailable { message } => {
            Error::service_unavailable(format!("scope lease unavailable: {message}"))
        }
    }
}

fn map_path_error(error: StorePathError) -> Error {
    Error::internal(format!("invalid store path: {error}"))
}

fn map_exhausted(error: UsernameExhausted) -> Error {
    Error::conflict("username candidates exhausted").with_details(json!({
        "base": error.base.as_ref(),
        "attempts": error.attempts,
        "code": "username_exhausted",
    }))
}

fn stored_username(entry: &StoreEntry) -> Option<&str> {
    entry.value.get("username").and_then(Value::as_str)
}

/// Identity provisioning service implementing the driving port.
#[derive(Clone)]
pub struct IdentityProvisioningService<S, C, L> {
    store: Arc<S>,
    session: Arc<C>,
    lease: Arc<L>,
    layout: CollectionLayout,
    suffix_policy: SuffixPolicy,
}

impl<S, C, L> IdentityProvisioningService<S, C, L> {
    /// Create a service with the default layout and suffix policy.
    pub fn new(store: Arc<S>, session: Arc<C>, lease: Arc<L>) -> Self {
        Self {
            store,
            session,
            lease,
            layout: CollectionLayout::default(),
            suffix_policy: SuffixPolicy::default(),
        }
    }

    /// Use a custom collection layout.
    #[must_use]
    pub fn with_layout(mut self, layout: CollectionLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Use a custom username collision policy.
    #[must_use]
    pub fn with_suffix_policy(mut self, suffix_policy: SuffixPolicy) -> Self {
        self.suffix_policy = suffix_policy;
        self
    }
}

impl<S, C, L> IdentityProvisioningService<S, C, L>
where
    S: HierarchicalStore,
    C: SessionContext,
    L: ScopeLease,
{
    async fn acquire(&self, scope: &Scope) -> Result<LeaseGuard, Error> {
        self.lease.acquire(scope).await.map_err(map_lease_error)
    }

    async fn list_users(&self, users_path: &StorePath) -> Result<Vec<StoreEntry>, Error> {
        self.store.list(users_path).await.map_err(map_store_error)
    }

    fn approved_record(signup: &Signup, username: Username) -> UserRecord {
        UserRecord {
            username,
            password: Some(signup.password.clone()),
            role: Role::Member,
            name: signup.name.clone(),
            phone: signup.phone.clone(),
        }
    }
}

#[async_trait]
impl<S, C, L> IdentityProvisioning for IdentityProvisioningService<S, C, L>
where
    S: HierarchicalStore,
    C: SessionContext,
    L: ScopeLease,
{
    async fn current_scope(&self) -> ProvisioningResult<Scope> {
        self.session.congregation().await.map_err(map_session_error)
    }

    async fn watch_signups(&self, scope: &Scope) -> ProvisioningResult<LiveCollection<Signup>> {
        let path = self.layout.signups(scope).map_err(map_path_error)?;
        let feed = self
            .store
            .subscribe(&path)
            .await
            .map_err(map_store_error)?;
        Ok(LiveCollection::new(path, feed))
    }

    async fn approve_user(&self, scope: &Scope, signup: &Signup) -> ProvisioningResult<User> {
        let base = Username::new(signup.phone.clone()).map_err(|err| {
            Error::invalid_request(format!(
                "signup {} cannot seed a username: {err}",
                signup.key
            ))
        })?;
        let users_path = self.layout.users(scope).map_err(map_path_error)?;
        let signup_path = self
            .layout
            .signup(scope, &signup.key)
            .map_err(map_path_error)?;

        let _lease = self.acquire(scope).await?;
        let entries = self.list_users(&users_path).await?;
        let taken: HashSet<String> = entries
            .iter()
            .filter_map(stored_username)
            .map(str::to_owned)
            .collect();
        let username = self
            .suffix_policy
            .resolve(&base, &taken)
            .map_err(map_exhausted)?;
        if username != base {
            debug!(%scope, %base, resolved = %username, "username collision resolved");
        }

        let record = Self::approved_record(signup, username);
        let payload = serde_json::to_value(&record)
            .map_err(|err| Error::internal(format!("failed to serialise user: {err}")))?;
        let raw_key = self
            .store
            .push(&users_path, payload)
            .await
            .map_err(map_store_error)?;
        let key = UserKey::new(raw_key)
            .map_err(|err| Error::internal(format!("store generated an invalid key: {err}")))?;

        if let Err(err) = self.store.remove(&signup_path).await {
            warn!(
                %scope,
                user_key = %key,
                signup_key = %signup.key,
                error = %err,
                "user created but signup removal failed"
            );
            return Err(map_store_error(err));
        }

        info!(%scope, user_key = %key, username = %record.username, "signup approved");
        Ok(record.into_user(key))
    }

    async fn watch_users(&self, scope: &Scope) -> ProvisioningResult<LiveCollection<User>> {
        let path = self.layout.users(scope).map_err(map_path_error)?;
        let feed = self
            .store
            .subscribe(&path)
            .await
            .map_err(map_store_error)?;
        Ok(LiveCollection::new(path, feed))
    }

    async fn remove_signup(&self, scope: &Scope, key: &SignupKey) -> ProvisioningResult<()> {
        let path = self.layout.signup(scope, key).map_err(map_path_error)?;
        self.store.remove(&path).await.map_err(map_store_error)?;
        info!(%scope, signup_key = %key, "signup removed");
        Ok(())
    }

    async fn reset_password(&self, scope: &Scope, user: &User) -> ProvisioningResult<()> {
        let credential = Password::new(user.username.as_ref());
        self.session
            .change_password(scope, &user.key, &credential)
            .await
            .map_err(map_session_error)?;
        info!(%scope, user_key = %user.key, "password reset to username");
        Ok(())
    }

    async fn update_user(&self, scope: &Scope, update: UserUpdate) -> ProvisioningResult<bool> {
        let UserUpdate {
            key,
            username,
            password,
            role,
            name,
            phone,
        } = update;
        if password.is_some() {
            debug!(%scope, user_key = %key, "discarding password from user update");
        }
        let users_path = self.layout.users(scope).map_err(map_path_error)?;
        let user_path = self.layout.user(scope, &key).map_err(map_path_error)?;

        let _lease = self.acquire(scope).await?;
        let entries = self.list_users(&users_path).await?;
        if !entries.iter().any(|entry| entry.key == key.as_ref()) {
            return Err(Error::not_found(format!("user {key} not found in {scope}")));
        }

        let username = username.filter(|requested| {
            let held_elsewhere = entries.iter().any(|entry| {
                entry.key != key.as_ref() && stored_username(entry) == Some(requested.as_ref())
            });
            if held_elsewhere {
                debug!(%scope, user_key = %key, %requested, "username held by another user");
            }
            !held_elsewhere
        });
        let username_applied = username.is_some();

        let fields = UserPatch {
            username,
            role,
            name,
            phone,
        }
        .into_fields()
        .map_err(|err| Error::internal(format!("failed to serialise user patch: {err}")))?;
        if fields.is_empty() {
            return Ok(false);
        }

        self.store
            .update(&user_path, fields)
            .await
            .map_err(map_store_error)?;
        Ok(username_applied)
    }

    async fn remove_user(&self, scope: &Scope, key: &UserKey) -> ProvisioningResult<()> {
        let path = self.layout.user(scope, key).map_err(map_path_error)?;
        self.store.remove(&path).await.map_err(map_store_error)?;
        info!(%scope, user_key = %key, "user removed");
        Ok(())
    }
}

#[cfg(test)]
#[path = "identity_provisioning_service_tests.rs"]
mod tests;
