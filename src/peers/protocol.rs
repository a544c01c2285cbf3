//! Peer Network Protocol
//!
//! Defines the routing prefix and the Data Transfer Objects exchanged between nodes when
//! one node asks the owner of a key for its value.
//!
//! A request is carried entirely by the URL (`<base_path><group>/<key>`, both segments
//! percent-encoded). The response body is the `bincode` encoding of [`GetResponse`], sent
//! as `application/octet-stream`.

use serde::{Deserialize, Serialize};

// --- API Endpoints ---

/// Default routing prefix served by every node.
pub const DEFAULT_BASE_PATH: &str = "/_gocache/";

/// Content type of a successful peer response.
pub const CONTENT_TYPE_OCTET_STREAM: &str = "application/octet-stream";

// --- Data Transfer Objects ---

/// Identifies the value a node wants from its owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetRequest {
    /// Name of the group (namespace) on the remote node.
    pub group: String,
    /// The cache key.
    pub key: String,
}

/// The owner's answer: the raw value bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetResponse {
    pub value: Vec<u8>,
}

impl GetResponse {
    pub fn encode(&self) -> bincode::Result<Vec<u8>> {
        bincode::serialize(self)
    }

    pub fn decode(body: &[u8]) -> bincode::Result<Self> {
        bincode::deserialize(body)
    }
}

/// Normalises a routing prefix to start and end with `/`.
pub fn normalize_base_path(base_path: &str) -> String {
    let cleaned = base_path.trim_matches('/');
    if cleaned.is_empty() {
        "/".to_string()
    } else {
        format!("/{}/", cleaned)
    }
}
