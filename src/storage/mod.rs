//! Local Storage Module
//!
//! Everything a single node needs to hold cached values in memory and to decide which
//! node owns a key.
//!
//! ## Core Concepts
//! - **ByteView**: Immutable snapshot of a cached byte payload. Readers only ever get copies.
//! - **Eviction**: `LruStore` bounds the bytes held (`len(key) + value.len()` per entry) and
//!   evicts the least recently used entries once the bound is exceeded.
//! - **Concurrency**: `ConcurrentCache` serialises access to one lazily created `LruStore`.
//! - **Placement**: `HashRing` maps keys to owning nodes with consistent hashing over
//!   virtual nodes, so adding a node only moves the keys that now land on it.

pub mod byteview;
pub mod cache;
pub mod lru;
pub mod partitioner;

#[cfg(test)]
mod tests;
