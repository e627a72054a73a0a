//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod hierarchical_store;
mod identity_provisioning;
mod scope_lease;
mod session_context;

#[cfg(test)]
pub use hierarchical_store::MockHierarchicalStore;
pub use hierarchical_store::{
    CollectionFeed, HierarchicalStore, StoreEntry, StoreError, StoreSnapshot,
};
pub use identity_provisioning::IdentityProvisioning;
#[cfg(test)]
pub use scope_lease::MockScopeLease;
pub use scope_lease::{LeaseError, LeaseGuard, NoopScopeLease, ScopeLease};
#[cfg(test)]
pub use session_context::MockSessionContext;
pub use session_context::{SessionContext, SessionError};
