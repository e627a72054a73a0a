//! In-process scope lease.
//!
//! One async mutex per scope, created on first use. Suitable when every
//! writer of a scope lives in this process.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex as AsyncMutex;
use tracing::warn;

use crate::domain::Scope;
use crate::domain::ports::{LeaseError, LeaseGuard, ScopeLease};

/// Per-scope async mutex lease.
#[derive(Debug, Default)]
pub struct InProcessScopeLease {
    locks: Mutex<HashMap<Scope, Arc<AsyncMutex<()>>>>,
    timeout: Option<Duration>,
}

impl InProcessScopeLease {
    /// Create a lease that waits indefinitely.
    pub fn new() -> Self {
        Self::default()
    }

    /// Give up waiting for a lease after `timeout`.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn lock_for(&self, scope: &Scope) -> Arc<AsyncMutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(scope.clone()).or_default())
    }
}

#[async_trait]
impl ScopeLease for InProcessScopeLease {
    async fn acquire(&self, scope: &Scope) -> Result<LeaseGuard, LeaseError> {
        let lock = self.lock_for(scope);
        let guard = match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, lock.lock_owned())
                .await
                .map_err(|_| {
                    warn!(%scope, ?timeout, "timed out waiting for scope lease");
                    LeaseError::unavailable(format!("timed out after {timeout:?} on {scope}"))
                })?,
            None => lock.lock_owned().await,
        };
        Ok(LeaseGuard::new(guard))
    }
}
