//! Storage Module Tests
//!
//! Validates the local, single-node building blocks.
//!
//! ## Test Scopes
//! - **ByteView**: Copies out, never aliases.
//! - **LruStore**: Byte accounting, recency order and eviction.
//! - **ConcurrentCache**: Lazy initialisation and access from many threads.
//! - **HashRing**: Deterministic lookups, wrap-around and limited remapping on growth.

#[cfg(test)]
mod tests {
    use crate::storage::byteview::ByteView;
    use crate::storage::cache::ConcurrentCache;
    use crate::storage::lru::{LruStore, Value};
    use crate::storage::partitioner::{DEFAULT_REPLICAS, HashRing};
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, PartialEq)]
    struct Text(String);

    impl Value for Text {
        fn len(&self) -> usize {
            self.0.len()
        }
    }

    fn text(s: &str) -> Text {
        Text(s.to_string())
    }

    // ============================================================
    // BYTEVIEW TESTS
    // ============================================================

    #[test]
    fn test_byteview_returns_copies() {
        let view = ByteView::from("payload");

        let mut copy = view.byte_slice();
        copy[0] = b'X';

        assert_eq!(view.byte_slice(), b"payload".to_vec());
        assert_eq!(view.to_string(), "payload");
        assert_eq!(Value::len(&view), 7);
    }

    #[test]
    fn test_byteview_new_does_not_alias_source() {
        let mut source = b"abc".to_vec();
        let view = ByteView::new(&source);

        source[0] = b'z';

        assert_eq!(view.as_str_lossy(), "abc");
    }

    #[test]
    fn test_byteview_empty() {
        let view = ByteView::default();

        assert!(view.is_empty());
        assert_eq!(view.len(), 0);
    }

    // ============================================================
    // LRU STORE TESTS
    // ============================================================

    #[test]
    fn test_lru_get_hit_and_miss() {
        let mut lru = LruStore::new(0);
        lru.add("key1".to_string(), text("1234"));

        assert_eq!(lru.get("key1"), Some(&text("1234")));
        assert_eq!(lru.get("key2"), None);
    }

    #[test]
    fn test_lru_evicts_oldest_when_over_budget() {
        // ARRANGE: room for exactly two entries
        let capacity = "key1".len() + "key2".len() + "value1".len() + "value2".len();
        let mut lru = LruStore::new(capacity);

        // ACT
        lru.add("key1".to_string(), text("value1"));
        lru.add("key2".to_string(), text("value2"));
        lru.add("k3".to_string(), text("v3"));

        // ASSERT
        assert!(lru.get("key1").is_none(), "key1 should have been evicted");
        assert_eq!(lru.len(), 2);
        assert!(lru.bytes_used() <= capacity);
    }

    #[test]
    fn test_lru_get_moves_entry_to_front() {
        // ARRANGE: a, b, c use 2 bytes each, a fourth entry forces one eviction
        let mut lru = LruStore::new(6);
        lru.add("a".to_string(), text("1"));
        lru.add("b".to_string(), text("1"));
        lru.add("c".to_string(), text("1"));

        // ACT
        assert!(lru.get("a").is_some());
        lru.add("d".to_string(), text("1"));

        // ASSERT: b was least recently touched
        assert!(lru.get("b").is_none());
        assert!(lru.get("a").is_some());
        assert!(lru.get("c").is_some());
        assert!(lru.get("d").is_some());
    }

    #[test]
    fn test_lru_update_in_place_adjusts_bytes() {
        let mut lru = LruStore::new(0);
        lru.add("key".to_string(), text("short"));
        assert_eq!(lru.bytes_used(), 3 + 5);

        lru.add("key".to_string(), text("a much longer value"));

        assert_eq!(lru.len(), 1);
        assert_eq!(lru.bytes_used(), 3 + 19);
        assert_eq!(lru.get("key"), Some(&text("a much longer value")));

        lru.add("key".to_string(), text("x"));
        assert_eq!(lru.bytes_used(), 3 + 1);
    }

    #[test]
    fn test_lru_update_refreshes_recency() {
        let mut lru = LruStore::new(6);
        lru.add("a".to_string(), text("1"));
        lru.add("b".to_string(), text("1"));
        lru.add("c".to_string(), text("1"));

        // Overwriting a makes it most recently used
        lru.add("a".to_string(), text("2"));
        lru.add("d".to_string(), text("1"));

        let order: Vec<&str> = lru.keys().collect();
        assert_eq!(order, vec!["c", "a", "d"]);
    }

    #[test]
    fn test_lru_unbounded_never_evicts() {
        let mut lru = LruStore::new(0);

        for i in 0..1000 {
            lru.add(format!("key-{}", i), text("some value"));
        }

        assert_eq!(lru.len(), 1000);
    }

    #[test]
    fn test_lru_entry_larger_than_budget_is_dropped() {
        let mut lru = LruStore::new(10);
        lru.add("a".to_string(), text("1"));

        lru.add("huge".to_string(), text("0123456789"));

        assert!(lru.is_empty());
        assert_eq!(lru.bytes_used(), 0);
    }

    #[test]
    fn test_lru_on_evicted_callback() {
        // ARRANGE
        let evicted = Arc::new(Mutex::new(Vec::new()));
        let sink = evicted.clone();
        let mut lru = LruStore::with_on_evicted(10, move |key: &str, value: &Text| {
            sink.lock().unwrap().push(format!("{}={}", key, value.0));
        });

        // ACT
        lru.add("key1".to_string(), text("123456"));
        lru.add("k2".to_string(), text("k2"));
        lru.add("k3".to_string(), text("k3"));
        lru.add("k4".to_string(), text("k4"));

        // ASSERT
        assert_eq!(*evicted.lock().unwrap(), vec!["key1=123456", "k2=k2"]);
    }

    #[test]
    fn test_lru_remove_oldest() {
        let mut lru = LruStore::new(0);
        assert!(lru.remove_oldest().is_none());

        lru.add("first".to_string(), text("1"));
        lru.add("second".to_string(), text("2"));

        let (key, value) = lru.remove_oldest().unwrap();
        assert_eq!(key, "first");
        assert_eq!(value, text("1"));
        assert_eq!(lru.bytes_used(), "second".len() + 1);
    }

    #[test]
    fn test_lru_reports_budget() {
        let bounded = LruStore::<Text>::new(64);
        let unbounded = LruStore::<Text>::new(0);

        assert_eq!(bounded.max_bytes(), 64);
        assert_eq!(unbounded.max_bytes(), 0);
        assert_eq!(bounded.bytes_used(), 0);
    }

    // ============================================================
    // CONCURRENT CACHE TESTS
    // ============================================================

    #[test]
    fn test_concurrent_cache_lazy_initialisation() {
        let cache = ConcurrentCache::new(64);

        assert!(cache.get("missing").is_none());
        assert!(!cache.is_initialized(), "get must not allocate the store");

        cache.add("key", ByteView::from("value"));

        assert!(cache.is_initialized());
        assert_eq!(cache.get("key"), Some(ByteView::from("value")));
        assert_eq!(cache.stats(), (1, 8));
    }

    #[test]
    fn test_concurrent_cache_respects_budget_under_contention() {
        let cache = ConcurrentCache::new(1024);

        std::thread::scope(|scope| {
            for t in 0..8 {
                let cache = &cache;
                scope.spawn(move || {
                    for i in 0..500 {
                        let key = format!("t{}-k{}", t, i);
                        cache.add(&key, ByteView::from("0123456789"));
                        let _ = cache.get(&key);
                    }
                });
            }
        });

        let (entries, bytes) = cache.stats();
        assert!(entries > 0);
        assert!(bytes <= 1024, "cache holds {} bytes", bytes);
    }

    // ============================================================
    // HASH RING TESTS
    // ============================================================

    fn decimal_hash(data: &[u8]) -> u32 {
        std::str::from_utf8(data).unwrap().parse().unwrap()
    }

    #[test]
    fn test_ring_lookup_with_custom_hash() {
        // ARRANGE: positions 2, 4, 6, 12, 14, 16, 22, 24, 26
        let mut ring = HashRing::with_hash(3, decimal_hash);
        ring.add(["6", "4", "2"]);

        let cases = [("2", "2"), ("11", "2"), ("23", "4"), ("27", "2")];
        for (key, owner) in cases {
            assert_eq!(ring.get(key), Some(owner), "asking for {}", key);
        }

        // ACT: 8, 18, 28 join the ring
        ring.add(["8"]);

        // ASSERT: only 27 moves
        let cases = [("2", "2"), ("11", "2"), ("23", "4"), ("27", "8")];
        for (key, owner) in cases {
            assert_eq!(ring.get(key), Some(owner), "asking for {}", key);
        }
    }

    #[test]
    fn test_ring_empty_returns_none() {
        let ring = HashRing::new(DEFAULT_REPLICAS);

        assert!(ring.is_empty());
        assert_eq!(ring.get("key"), None);
    }

    #[test]
    fn test_ring_is_deterministic() {
        let mut ring = HashRing::new(DEFAULT_REPLICAS);
        ring.add(["http://10.0.0.1:8001", "http://10.0.0.2:8001", "http://10.0.0.3:8001"]);

        for i in 0..500 {
            let key = format!("user:{}", i);
            assert_eq!(ring.get(&key), ring.get(&key));
        }
    }

    #[test]
    fn test_ring_adding_node_moves_keys_only_to_new_node() {
        // ARRANGE
        let mut ring = HashRing::new(DEFAULT_REPLICAS);
        ring.add(["node-a", "node-b", "node-c"]);

        let before: HashMap<String, String> = (0..2000)
            .map(|i| {
                let key = format!("key-{}", i);
                let owner = ring.get(&key).unwrap().to_string();
                (key, owner)
            })
            .collect();

        // ACT
        ring.add(["node-d"]);

        // ASSERT
        let mut moved = 0;
        for (key, old_owner) in &before {
            let new_owner = ring.get(key).unwrap();
            if new_owner != old_owner {
                assert_eq!(new_owner, "node-d", "{} moved between old nodes", key);
                moved += 1;
            }
        }

        assert!(moved > 0, "the new node should take over some keys");
        assert!(moved < before.len() / 2, "{} of {} keys moved", moved, before.len());
    }

    #[test]
    fn test_ring_spreads_keys_over_all_nodes() {
        let mut ring = HashRing::new(DEFAULT_REPLICAS);
        ring.add(["node-a", "node-b", "node-c"]);

        let mut counts: HashMap<&str, usize> = HashMap::new();
        for i in 0..3000 {
            let key = format!("book_{}", i);
            *counts.entry(ring.get(&key).unwrap()).or_insert(0) += 1;
        }

        assert_eq!(counts.len(), 3);
        for (node, count) in counts {
            assert!(count > 300, "{} only owns {} keys", node, count);
        }
    }
}
