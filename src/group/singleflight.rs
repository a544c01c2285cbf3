//! Duplicate Call Suppression
//!
//! Collapses concurrent loads of the same key into a single execution. The first caller
//! for a key becomes the leader: it publishes an in-flight record, runs the work and
//! broadcasts the result. Callers arriving while the record exists wait for that result
//! instead of running the work again.
//!
//! The record is removed as soon as the work finishes, so the next caller for the same key
//! starts a fresh execution. Nothing here caches results.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::future::Future;
use tokio::sync::watch;

/// In-flight call registry keyed by request key.
///
/// The map's shard lock is only held while a record is looked up, inserted or removed,
/// never while the work runs, so unrelated keys never wait on each other.
pub struct SingleFlight<T> {
    calls: DashMap<String, watch::Receiver<Option<T>>>,
}

enum Role<T> {
    Leader(watch::Sender<Option<T>>),
    Follower(watch::Receiver<Option<T>>),
}

/// Removes the leader's record even if the leading future is dropped mid-flight.
struct CallGuard<'a, T> {
    calls: &'a DashMap<String, watch::Receiver<Option<T>>>,
    key: &'a str,
}

impl<T> Drop for CallGuard<'_, T> {
    fn drop(&mut self) {
        self.calls.remove(self.key);
    }
}

impl<T> SingleFlight<T>
where
    T: Clone + Send + Sync,
{
    pub fn new() -> Self {
        Self {
            calls: DashMap::new(),
        }
    }

    /// Runs `work` unless a call for `key` is already in flight, in which case the result
    /// of that call is returned.
    pub async fn run<F, Fut>(&self, key: &str, work: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let sender = loop {
            let role = match self.calls.entry(key.to_string()) {
                Entry::Occupied(entry) => Role::Follower(entry.get().clone()),
                Entry::Vacant(entry) => {
                    let (sender, receiver) = watch::channel(None);
                    entry.insert(receiver);
                    Role::Leader(sender)
                }
            };

            match role {
                Role::Leader(sender) => break sender,
                Role::Follower(mut receiver) => {
                    tracing::trace!("Waiting for in-flight load of {}", key);
                    let published = receiver
                        .wait_for(Option::is_some)
                        .await
                        .ok()
                        .and_then(|value| value.clone());
                    if let Some(value) = published {
                        return value;
                    }
                    // The leader was dropped before publishing; take over.
                    tracing::debug!("In-flight load of {} was abandoned, retrying", key);
                }
            }
        };

        let guard = CallGuard {
            calls: &self.calls,
            key,
        };

        let result = work().await;
        sender.send_replace(Some(result.clone()));
        drop(guard);

        result
    }

    /// Number of keys currently being loaded.
    #[cfg(test)]
    pub(crate) fn in_flight(&self) -> usize {
        self.calls.len()
    }
}

impl<T> Default for SingleFlight<T>
where
    T: Clone + Send + Sync,
{
    fn default() -> Self {
        Self::new()
    }
}
