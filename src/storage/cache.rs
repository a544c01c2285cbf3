use super::byteview::ByteView;
use super::lru::LruStore;

use parking_lot::Mutex;

/// Thread safe wrapper around an [`LruStore`] of [`ByteView`]s.
///
/// The store is only allocated by the first `add`; until then every lookup misses.
/// The lock is held for the duration of a single store operation and never across a
/// loader or peer call.
pub struct ConcurrentCache {
    cache_bytes: usize,
    lru: Mutex<Option<LruStore<ByteView>>>,
}

impl ConcurrentCache {
    pub fn new(cache_bytes: usize) -> Self {
        Self {
            cache_bytes,
            lru: Mutex::new(None),
        }
    }

    pub fn get(&self, key: &str) -> Option<ByteView> {
        let mut lru = self.lru.lock();
        lru.as_mut()?.get(key).cloned()
    }

    pub fn add(&self, key: &str, value: ByteView) {
        let mut lru = self.lru.lock();
        lru.get_or_insert_with(|| LruStore::new(self.cache_bytes))
            .add(key.to_string(), value);
    }

    /// Returns `(entries, bytes)` currently held.
    pub fn stats(&self) -> (usize, usize) {
        match self.lru.lock().as_ref() {
            Some(lru) => (lru.len(), lru.bytes_used()),
            None => (0, 0),
        }
    }

    #[cfg(test)]
    pub(crate) fn is_initialized(&self) -> bool {
        self.lru.lock().is_some()
    }
}
