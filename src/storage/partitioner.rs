use std::collections::HashMap;

/// Hash function used to place nodes and keys on the ring.
pub type HashFn = fn(&[u8]) -> u32;

/// Number of virtual nodes created per real node unless configured otherwise.
pub const DEFAULT_REPLICAS: usize = 50;

/// Consistent hash ring mapping keys to node identifiers.
///
/// Each node is placed `replicas` times on the ring, at `hash("<i><node>")` for
/// `i in 0..replicas`. A key belongs to the first position clockwise from `hash(key)`,
/// wrapping around past the largest position.
pub struct HashRing {
    hash: HashFn,
    replicas: usize,
    /// Sorted ring positions.
    keys: Vec<u32>,
    owners: HashMap<u32, String>,
}

impl HashRing {
    /// Creates an empty ring hashing with CRC-32 (IEEE).
    pub fn new(replicas: usize) -> Self {
        Self::with_hash(replicas, crc32fast::hash)
    }

    pub fn with_hash(replicas: usize, hash: HashFn) -> Self {
        Self {
            hash,
            replicas,
            keys: Vec::new(),
            owners: HashMap::new(),
        }
    }

    /// Places every given node on the ring.
    pub fn add<I, S>(&mut self, nodes: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for node in nodes {
            let node = node.as_ref();
            for i in 0..self.replicas {
                let position = (self.hash)(format!("{}{}", i, node).as_bytes());
                self.keys.push(position);
                self.owners.insert(position, node.to_string());
            }
        }
        self.keys.sort_unstable();
    }

    /// Returns the node owning `key`, or `None` if the ring is empty.
    pub fn get(&self, key: &str) -> Option<&str> {
        if self.keys.is_empty() {
            return None;
        }

        let hash = (self.hash)(key.as_bytes());
        let idx = self.keys.partition_point(|&position| position < hash);
        let position = self.keys[idx % self.keys.len()];

        self.owners.get(&position).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Number of virtual nodes on the ring.
    pub fn len(&self) -> usize {
        self.keys.len()
    }
}
