//! Peer Networking Module
//!
//! How nodes of a cache cluster find the owner of a key and fetch values from each other.
//!
//! ## Core Concepts
//! - **Ownership**: Every node builds the same consistent hash ring over the same peer list,
//!   so all of them agree on which node owns a key without coordinating.
//! - **Protocol**: A single HTTP `GET <base_path><group>/<key>`; the body is a
//!   `bincode`-encoded `GetResponse`.
//! - **Seams**: `PeerPicker` and `PeerGetter` decouple the group logic from HTTP. `PeerPool`
//!   and `HttpGetter` are the HTTP implementations.

pub mod handlers;
pub mod pool;
pub mod protocol;
pub mod types;
