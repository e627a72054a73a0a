//! Session context backed by the hierarchical store.

use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::domain::ports::{HierarchicalStore, SessionContext, SessionError, StoreError};
use crate::domain::{CollectionLayout, Password, Scope, UserKey};

const PASSWORD_FIELD: &str = "password";

fn map_store_error(error: StoreError) -> SessionError {
    SessionError::rejected(error.to_string())
}

/// Session whose credential changes write the account's user node.
///
/// The signed-in scope is set by whatever authenticated the administrator;
/// this adapter only remembers it.
pub struct StoreSessionContext<S> {
    store: Arc<S>,
    layout: CollectionLayout,
    scope: RwLock<Option<Scope>>,
}

impl<S> StoreSessionContext<S> {
    /// Create a signed-out session over `store`.
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            layout: CollectionLayout::default(),
            scope: RwLock::new(None),
        }
    }

    /// Use a custom collection layout.
    #[must_use]
    pub fn with_layout(mut self, layout: CollectionLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Record that an administrator of `scope` signed in.
    pub fn sign_in(&self, scope: Scope) {
        debug!(%scope, "session started");
        *self.scope.write().unwrap_or_else(PoisonError::into_inner) = Some(scope);
    }

    /// Forget the signed-in scope.
    pub fn sign_out(&self) {
        self.scope
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }

    fn signed_in(&self) -> Option<Scope> {
        self.scope
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl<S> SessionContext for StoreSessionContext<S>
where
    S: HierarchicalStore,
{
    async fn congregation(&self) -> Result<Scope, SessionError> {
        self.signed_in().ok_or(SessionError::NoActiveSession)
    }

    async fn change_password(
        &self,
        scope: &Scope,
        account: &UserKey,
        credential: &Password,
    ) -> Result<(), SessionError> {
        if self.signed_in().is_none() {
            return Err(SessionError::no_active_session());
        }
        let users = self
            .layout
            .users(scope)
            .map_err(|err| SessionError::rejected(err.to_string()))?;
        let node = self
            .layout
            .user(scope, account)
            .map_err(|err| SessionError::rejected(err.to_string()))?;

        let known = self
            .store
            .list(&users)
            .await
            .map_err(map_store_error)?
            .iter()
            .any(|entry| entry.key == account.as_ref());
        if !known {
            return Err(SessionError::unknown_account(account.as_ref()));
        }

        let mut fields = Map::new();
        fields.insert(
            PASSWORD_FIELD.to_owned(),
            Value::String(credential.expose().to_owned()),
        );
        self.store
            .update(&node, fields)
            .await
            .map_err(map_store_error)?;
        info!(%scope, user_key = %account, "credential replaced");
        Ok(())
    }
}
