//! Live collection subscriptions.
//!
//! A [`LiveCollection`] is an explicit handle on a store collection: it is
//! started by a provisioning call, observed with [`LiveCollection::changed`]
//! or as a stream, and stopped with [`LiveCollection::cancel`] or by dropping
//! it.

use std::marker::PhantomData;

use futures_util::Stream;
use futures_util::stream;
use store_path::StorePath;
use tracing::{debug, warn};

use crate::domain::Error;
use crate::domain::ports::{CollectionFeed, StoreEntry};
use crate::domain::record::StoredRecord;

/// Decoded, continuously updated view of one collection.
#[derive(Debug)]
pub struct LiveCollection<T> {
    path: StorePath,
    feed: CollectionFeed,
    _record: PhantomData<fn() -> T>,
}

impl<T> LiveCollection<T>
where
    T: StoredRecord,
{
    /// Wrap a store feed for the collection at `path`.
    pub fn new(path: StorePath, feed: CollectionFeed) -> Self {
        Self {
            path,
            feed,
            _record: PhantomData,
        }
    }

    /// Path of the observed collection.
    pub fn path(&self) -> &StorePath {
        &self.path
    }

    /// Records in the latest snapshot, in key order.
    ///
    /// Entries that do not decode are skipped and logged.
    pub fn current(&self) -> Vec<T> {
        decode_all(&self.path, &self.feed.peek())
    }

    /// Wait for the collection to change and return the new records.
    ///
    /// # Errors
    ///
    /// Returns [`crate::domain::ErrorCode::ServiceUnavailable`] when the
    /// store closes the feed.
    pub async fn changed(&mut self) -> Result<Vec<T>, Error> {
        let snapshot = self.feed.changed().await.map_err(|err| {
            Error::service_unavailable(format!("live view of {} ended: {err}", self.path))
        })?;
        Ok(decode_all(&self.path, &snapshot))
    }

    /// Adapt into a stream that yields the current records first and then
    /// every change. The stream ends when the store closes the feed.
    pub fn into_stream(self) -> impl Stream<Item = Vec<T>> + Send
    where
        T: Send,
    {
        stream::unfold((self, true), |(mut live, first)| async move {
            if first {
                let records = decode_all(&live.path, &live.feed.latest());
                return Some((records, (live, false)));
            }
            match live.changed().await {
                Ok(records) => Some((records, (live, false))),
                Err(_) => None,
            }
        })
    }

    /// Stop observing the collection.
    pub fn cancel(self) {
        debug!(path = %self.path, "live collection cancelled");
    }
}

fn decode_all<T: StoredRecord>(path: &StorePath, entries: &[StoreEntry]) -> Vec<T> {
    entries
        .iter()
        .filter_map(|entry| match T::from_entry(entry) {
            Ok(record) => Some(record),
            Err(err) => {
                warn!(path = %path, error = %err, "skipping undecodable record");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use std::sync::Arc;

    use super::*;
    use crate::domain::Signup;
    use futures_util::StreamExt;
    use rstest::{fixture, rstest};
    use serde_json::json;

    #[fixture]
    fn path() -> StorePath {
        StorePath::parse("signup/north").expect("valid path")
    }

    fn signup_entry(key: &str, phone: &str) -> StoreEntry {
        StoreEntry::new(
            key,
            json!({"name": "Ann", "phone": phone, "password": "pw"}),
        )
    }

    #[rstest]
    fn current_skips_malformed_entries(path: StorePath) {
        let (_publisher, feed) = CollectionFeed::channel(vec![
            signup_entry("-k1", "555"),
            StoreEntry::new("-k2", json!({"name": "no password"})),
        ]);
        let live: LiveCollection<Signup> = LiveCollection::new(path, feed);

        let records = live.current();
        assert_eq!(records.len(), 1);
        assert_eq!(records.first().map(|s| s.phone.as_str()), Some("555"));
    }

    #[rstest]
    #[tokio::test]
    async fn changed_observes_new_snapshot(path: StorePath) {
        let (publisher, feed) = CollectionFeed::channel(Vec::new());
        let mut live: LiveCollection<Signup> = LiveCollection::new(path, feed);

        publisher.send_replace(Arc::new(vec![signup_entry("-k1", "555")]));
        let records = live.changed().await.expect("feed open");
        assert_eq!(records.len(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn changed_fails_once_feed_closes(path: StorePath) {
        let (publisher, feed) = CollectionFeed::channel(Vec::new());
        let mut live: LiveCollection<Signup> = LiveCollection::new(path, feed);
        drop(publisher);

        let error = live.changed().await.expect_err("feed closed");
        assert_eq!(error.code(), crate::domain::ErrorCode::ServiceUnavailable);
    }

    #[rstest]
    #[tokio::test]
    async fn stream_yields_current_then_changes_then_ends(path: StorePath) {
        let (publisher, feed) = CollectionFeed::channel(vec![signup_entry("-k1", "555")]);
        let live: LiveCollection<Signup> = LiveCollection::new(path, feed);
        let mut stream = Box::pin(live.into_stream());

        let first = stream.next().await.expect("initial snapshot");
        assert_eq!(first.len(), 1);

        publisher.send_replace(Arc::new(Vec::new()));
        let second = stream.next().await.expect("changed snapshot");
        assert!(second.is_empty());

        drop(publisher);
        assert!(stream.next().await.is_none());
    }
}
