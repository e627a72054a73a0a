//! Port for the hosted hierarchical key-value store.
//!
//! The store is a tree of JSON nodes addressed by [`StorePath`]. Collections
//! are object nodes whose children are records keyed by store-generated
//! identifiers; pushing onto a collection allocates the key. Adapters also
//! expose live feeds so callers observe later changes without re-reading.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use store_path::StorePath;
use tokio::sync::watch;

use super::define_port_error;

define_port_error! {
    /// Errors raised by hierarchical store adapters.
    pub enum StoreError {
        /// The store could not be reached or the feed was closed.
        Connection { message: String } => "store connection failed: {message}",
        /// The store refused the operation, typically a security rule.
        Rejected { path: String, message: String } =>
            "store rejected operation at {path}: {message}",
        /// The addressed node does not exist.
        Missing { path: String } => "no store node at {path}",
    }
}

/// One child of a collection node.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreEntry {
    /// Key of the child within its collection.
    pub key: String,
    /// Stored JSON value.
    pub value: Value,
}

impl StoreEntry {
    /// Build an entry from a key and value.
    pub fn new(key: impl Into<String>, value: Value) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// Immutable view of a collection at one point in time, in key order.
pub type StoreSnapshot = Arc<Vec<StoreEntry>>;

/// Live feed of snapshots for one collection.
///
/// Dropping the feed ends the subscription.
#[derive(Debug)]
pub struct CollectionFeed {
    receiver: watch::Receiver<StoreSnapshot>,
}

impl CollectionFeed {
    /// Wrap a watch receiver published by an adapter.
    pub fn new(receiver: watch::Receiver<StoreSnapshot>) -> Self {
        Self { receiver }
    }

    /// Create a publisher/feed pair seeded with `initial` entries.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use roster::domain::ports::{CollectionFeed, StoreEntry};
    /// use serde_json::json;
    ///
    /// let (publisher, feed) = CollectionFeed::channel(Vec::new());
    /// publisher.send_replace(Arc::new(vec![StoreEntry::new("-k1", json!({}))]));
    /// assert_eq!(feed.peek().len(), 1);
    /// ```
    pub fn channel(initial: Vec<StoreEntry>) -> (watch::Sender<StoreSnapshot>, Self) {
        let (sender, receiver) = watch::channel(Arc::new(initial));
        (sender, Self::new(receiver))
    }

    /// Latest snapshot without marking it as seen.
    pub fn peek(&self) -> StoreSnapshot {
        Arc::clone(&*self.receiver.borrow())
    }

    /// Latest snapshot, marking it as seen.
    pub fn latest(&mut self) -> StoreSnapshot {
        Arc::clone(&*self.receiver.borrow_and_update())
    }

    /// Wait for a snapshot newer than the last one seen.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Connection`] once the adapter stops publishing.
    pub async fn changed(&mut self) -> Result<StoreSnapshot, StoreError> {
        self.receiver
            .changed()
            .await
            .map_err(|_| StoreError::connection("collection feed closed"))?;
        Ok(self.latest())
    }
}

/// Port for reading and writing the hierarchical store.
///
/// Every write either resolves or fails as a whole; the store offers no
/// multi-node transactions through this port.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HierarchicalStore: Send + Sync {
    /// Read the current children of a collection, in key order.
    ///
    /// A missing collection reads as empty.
    async fn list(&self, path: &StorePath) -> Result<Vec<StoreEntry>, StoreError>;

    /// Subscribe to a collection. The feed starts at the current snapshot.
    async fn subscribe(&self, path: &StorePath) -> Result<CollectionFeed, StoreError>;

    /// Append `value` to a collection and return the generated key.
    async fn push(&self, path: &StorePath, value: Value) -> Result<String, StoreError>;

    /// Merge `fields` into the object node at `path`.
    ///
    /// Fields not named in `fields` keep their stored values.
    async fn update(&self, path: &StorePath, fields: Map<String, Value>)
    -> Result<(), StoreError>;

    /// Delete the node at `path`. Deleting a missing node succeeds.
    async fn remove(&self, path: &StorePath) -> Result<(), StoreError>;
}
