//! Driven adapters for the provisioning ports.
//!
//! These adapters run in-process. A hosted store, session provider, or
//! distributed lock plugs in by implementing the same port traits.

pub mod lease;
pub mod memory_store;
pub mod session;

pub use lease::InProcessScopeLease;
pub use memory_store::InMemoryStore;
pub use session::StoreSessionContext;
