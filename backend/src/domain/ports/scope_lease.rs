//! Port for per-scope mutual exclusion.
//!
//! Username uniqueness depends on a read-check-write sequence. Holding a
//! scope lease across that sequence makes it single-writer per scope.

use std::fmt;

use async_trait::async_trait;

use crate::domain::Scope;

use super::define_port_error;

define_port_error! {
    /// Errors raised by scope lease adapters.
    pub enum LeaseError {
        /// The lease could not be obtained.
        Unavailable { message: String } => "scope lease unavailable: {message}",
    }
}

/// Proof that the holder owns the scope lease. Released on drop.
pub struct LeaseGuard {
    held: Option<Box<dyn Send + Sync>>,
}

impl LeaseGuard {
    /// Wrap whatever keeps the lease alive, such as a mutex guard.
    pub fn new(held: impl Send + Sync + 'static) -> Self {
        Self {
            held: Some(Box::new(held)),
        }
    }

    /// A guard that holds nothing.
    pub fn unguarded() -> Self {
        Self { held: None }
    }
}

impl fmt::Debug for LeaseGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LeaseGuard")
            .field("held", &self.held.is_some())
            .finish()
    }
}

/// Port for acquiring the single-writer lease of a scope.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ScopeLease: Send + Sync {
    /// Wait for and take the lease on `scope`.
    async fn acquire(&self, scope: &Scope) -> Result<LeaseGuard, LeaseError>;
}

/// Lease that never blocks, for stores that enforce uniqueness themselves.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopScopeLease;

#[async_trait]
impl ScopeLease for NoopScopeLease {
    async fn acquire(&self, _scope: &Scope) -> Result<LeaseGuard, LeaseError> {
        Ok(LeaseGuard::unguarded())
    }
}
