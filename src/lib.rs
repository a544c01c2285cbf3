//! Distributed Read-Through Cache Library
//!
//! This library crate defines the core modules of the cache. It serves as the foundation
//! for the node binary (`main.rs`), and can be embedded directly by applications that run
//! their own HTTP server.
//!
//! ## Architecture Modules
//! - **`group`**: Named cache namespaces (`Group`) with read-through loading, duplicate
//!   call suppression and a process-wide registry.
//! - **`peers`**: Key ownership over a consistent hash ring and the HTTP protocol nodes use
//!   to fetch values from each other.
//! - **`storage`**: The node-local layer. Immutable `ByteView` values, a byte-bounded LRU
//!   store and the consistent hash ring.
//! - **`error`**: Errors surfaced to callers and returned by peer clients.

pub mod error;
pub mod group;
pub mod peers;
pub mod storage;
