//! In-process hierarchical store.
//!
//! Holds the whole tree as one JSON object behind a mutex. Every write
//! republishes the snapshot of each subscribed collection whose path overlaps
//! the written node. Push keys are a zero-padded counter followed by a random
//! fragment, so they sort in insertion order.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde_json::{Map, Value};
use store_path::StorePath;
use tokio::sync::watch;
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{
    CollectionFeed, HierarchicalStore, StoreEntry, StoreError, StoreSnapshot,
};

const PUSH_FRAGMENT_LEN: usize = 6;

struct Watcher {
    path: StorePath,
    publisher: watch::Sender<StoreSnapshot>,
}

#[derive(Default)]
struct StoreState {
    root: Map<String, Value>,
    watchers: Vec<Watcher>,
    denied: Vec<StorePath>,
    offline: bool,
    pushes: u64,
}

impl StoreState {
    fn ensure_online(&self) -> Result<(), StoreError> {
        if self.offline {
            return Err(StoreError::connection("store is offline"));
        }
        Ok(())
    }

    fn ensure_writable(&self, path: &StorePath) -> Result<(), StoreError> {
        self.ensure_online()?;
        if self.denied.iter().any(|prefix| path.starts_with(prefix)) {
            return Err(StoreError::rejected(path.to_string(), "permission denied"));
        }
        Ok(())
    }

    fn node(&self, path: &StorePath) -> Option<&Value> {
        let mut segments = path.segments();
        let first = segments.next()?;
        segments.try_fold(self.root.get(first)?, |node, segment| {
            node.as_object()?.get(segment)
        })
    }

    fn entries(&self, path: &StorePath) -> Vec<StoreEntry> {
        self.node(path)
            .and_then(Value::as_object)
            .map(|children| {
                children
                    .iter()
                    .map(|(key, value)| StoreEntry::new(key.clone(), value.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn collection_mut(&mut self, path: &StorePath) -> Result<&mut Map<String, Value>, StoreError> {
        let mut current = &mut self.root;
        for segment in path.segments() {
            current = current
                .entry(segment)
                .or_insert_with(|| Value::Object(Map::new()))
                .as_object_mut()
                .ok_or_else(|| {
                    StoreError::rejected(path.to_string(), "a leaf value blocks this path")
                })?;
        }
        Ok(current)
    }

    fn existing_mut(&mut self, path: &StorePath) -> Option<&mut Value> {
        let mut segments = path.segments();
        let first = segments.next()?;
        segments.try_fold(self.root.get_mut(first)?, |node, segment| {
            node.as_object_mut()?.get_mut(segment)
        })
    }

    fn publish(&mut self, written: &StorePath) {
        self.watchers.retain(|watcher| !watcher.publisher.is_closed());
        for watcher in &self.watchers {
            if watcher.path.overlaps(written) {
                watcher
                    .publisher
                    .send_replace(Arc::new(self.entries(&watcher.path)));
            }
        }
    }
}

/// Hierarchical store kept entirely in memory.
///
/// Intended for tests and local runs. Write-denial rules and an offline
/// switch stand in for the hosted store's security rules and outages.
///
/// # Examples
/// ```
/// use roster::outbound::InMemoryStore;
/// use serde_json::json;
/// use store_path::StorePath;
///
/// let store = InMemoryStore::new();
/// let path = StorePath::parse("north/users/-k1").expect("valid path");
/// store.insert(&path, json!({"username": "555"})).expect("seeded");
/// assert_eq!(store.read(&path), Some(json!({"username": "555"})));
/// ```
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<StoreState>,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Set the node at `path`, creating parents as needed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Rejected`] when `path` is the root or crosses a
    /// leaf value.
    pub fn insert(&self, path: &StorePath, value: Value) -> Result<(), StoreError> {
        let (Some(parent), Some(key)) = (path.parent(), path.last()) else {
            return Err(StoreError::rejected(path.to_string(), "cannot replace the root"));
        };
        let mut state = self.lock();
        state.collection_mut(&parent)?.insert(key.to_owned(), value);
        state.publish(path);
        Ok(())
    }

    /// Current value of the node at `path`, if any.
    pub fn read(&self, path: &StorePath) -> Option<Value> {
        self.lock().node(path).cloned()
    }

    /// Refuse every write at or below `prefix`.
    pub fn deny_writes(&self, prefix: StorePath) {
        self.lock().denied.push(prefix);
    }

    /// Lift every write-denial rule.
    pub fn allow_writes(&self) {
        self.lock().denied.clear();
    }

    /// Simulate losing or regaining the connection to the store.
    pub fn set_offline(&self, offline: bool) {
        self.lock().offline = offline;
    }

    /// Number of live subscriptions that still have an observer.
    pub fn subscriber_count(&self) -> usize {
        let mut state = self.lock();
        state.watchers.retain(|watcher| !watcher.publisher.is_closed());
        state.watchers.len()
    }
}

#[async_trait]
impl HierarchicalStore for InMemoryStore {
    async fn list(&self, path: &StorePath) -> Result<Vec<StoreEntry>, StoreError> {
        let state = self.lock();
        state.ensure_online()?;
        Ok(state.entries(path))
    }

    async fn subscribe(&self, path: &StorePath) -> Result<CollectionFeed, StoreError> {
        let mut state = self.lock();
        state.ensure_online()?;
        let (publisher, feed) = CollectionFeed::channel(state.entries(path));
        state.watchers.push(Watcher {
            path: path.clone(),
            publisher,
        });
        debug!(path = %path, "collection subscribed");
        Ok(feed)
    }

    async fn push(&self, path: &StorePath, value: Value) -> Result<String, StoreError> {
        let mut state = self.lock();
        state.ensure_writable(path)?;
        state.pushes += 1;
        let fragment: String = Uuid::new_v4()
            .simple()
            .to_string()
            .chars()
            .take(PUSH_FRAGMENT_LEN)
            .collect();
        let key = format!("-{:010}{fragment}", state.pushes);
        state.collection_mut(path)?.insert(key.clone(), value);
        state.publish(path);
        debug!(path = %path, key = %key, "store node pushed");
        Ok(key)
    }

    async fn update(
        &self,
        path: &StorePath,
        fields: Map<String, Value>,
    ) -> Result<(), StoreError> {
        let mut state = self.lock();
        state.ensure_writable(path)?;
        let node = state
            .existing_mut(path)
            .and_then(Value::as_object_mut)
            .ok_or_else(|| StoreError::missing(path.to_string()))?;
        for (field, value) in fields {
            if value.is_null() {
                node.remove(&field);
            } else {
                node.insert(field, value);
            }
        }
        state.publish(path);
        debug!(path = %path, "store node updated");
        Ok(())
    }

    async fn remove(&self, path: &StorePath) -> Result<(), StoreError> {
        let (Some(parent), Some(key)) = (path.parent(), path.last()) else {
            return Err(StoreError::rejected(path.to_string(), "cannot remove the root"));
        };
        let mut state = self.lock();
        state.ensure_writable(path)?;
        let removed = state
            .existing_mut(&parent)
            .and_then(Value::as_object_mut)
            .and_then(|children| children.remove(key))
            .is_some();
        if removed {
            state.publish(path);
            debug!(path = %path, "store node removed");
        }
        Ok(())
    }
}
