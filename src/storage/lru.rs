//! Size bounded least-recently-used store.
//!
//! Not thread safe on its own, see [`ConcurrentCache`](super::cache::ConcurrentCache).

use linked_hash_map::LinkedHashMap;

/// Anything that can report how many bytes it occupies.
pub trait Value {
    fn len(&self) -> usize;
}

/// Called with the key and value of every entry dropped by `remove_oldest`.
pub type OnEvicted<V> = Box<dyn FnMut(&str, &V) + Send>;

/// Maps keys to values and keeps them in recency order.
///
/// Every entry accounts for `key.len() + value.len()` bytes. After each `add`, least
/// recently used entries are evicted until `bytes_used() <= max_bytes()`. A `max_bytes`
/// of `0` disables eviction.
///
/// The front of the underlying map holds the least recently used entry, the back the most
/// recently used one. Lookups, inserts and moves are O(1).
pub struct LruStore<V: Value> {
    max_bytes: usize,
    used_bytes: usize,
    map: LinkedHashMap<String, V>,
    on_evicted: Option<OnEvicted<V>>,
}

impl<V: Value> LruStore<V> {
    pub fn new(max_bytes: usize) -> Self {
        Self {
            max_bytes,
            used_bytes: 0,
            map: LinkedHashMap::new(),
            on_evicted: None,
        }
    }

    /// Creates a store which reports every eviction to `on_evicted`.
    pub fn with_on_evicted<F>(max_bytes: usize, on_evicted: F) -> Self
    where
        F: FnMut(&str, &V) + Send + 'static,
    {
        Self {
            on_evicted: Some(Box::new(on_evicted)),
            ..Self::new(max_bytes)
        }
    }

    /// Looks up `key` and marks it as most recently used.
    pub fn get(&mut self, key: &str) -> Option<&V> {
        self.map.get_refresh(key).map(|value| &*value)
    }

    /// Inserts or replaces the value for `key` and marks it as most recently used.
    pub fn add(&mut self, key: String, value: V) {
        if let Some(existing) = self.map.get_refresh(&key) {
            self.used_bytes = self.used_bytes - existing.len() + value.len();
            *existing = value;
        } else {
            self.used_bytes += key.len() + value.len();
            self.map.insert(key, value);
        }

        while self.max_bytes != 0 && self.used_bytes > self.max_bytes {
            if self.remove_oldest().is_none() {
                break;
            }
        }
    }

    /// Evicts the least recently used entry and returns it.
    pub fn remove_oldest(&mut self) -> Option<(String, V)> {
        let (key, value) = self.map.pop_front()?;
        self.used_bytes -= key.len() + value.len();

        if let Some(on_evicted) = self.on_evicted.as_mut() {
            on_evicted(&key, &value);
        }

        Some((key, value))
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn bytes_used(&self) -> usize {
        self.used_bytes
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Keys from least to most recently used.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.map.keys().map(String::as_str)
    }
}
