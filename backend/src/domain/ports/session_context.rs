//! Port for the caller's session.
//!
//! The session knows which congregation the signed-in administrator manages
//! and owns the credential-reset primitive. Scope is read once by the
//! presentation layer and threaded into every provisioning call.

use async_trait::async_trait;

use crate::domain::{Password, Scope, UserKey};

use super::define_port_error;

define_port_error! {
    /// Errors raised by session context adapters.
    pub enum SessionError {
        /// Nobody is signed in, so no scope can be resolved.
        NoActiveSession => "no active session",
        /// The credential belongs to no known account.
        UnknownAccount { key: String } => "unknown account: {key}",
        /// The backing service refused the change.
        Rejected { message: String } => "credential change rejected: {message}",
    }
}

/// Port for session-derived context and credential changes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionContext: Send + Sync {
    /// Scope of the signed-in administrator.
    async fn congregation(&self) -> Result<Scope, SessionError>;

    /// Replace the credential of `account` within `scope`.
    async fn change_password(
        &self,
        scope: &Scope,
        account: &UserKey,
        credential: &Password,
    ) -> Result<(), SessionError>;
}
