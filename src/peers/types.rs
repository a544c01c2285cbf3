use super::protocol::{GetRequest, GetResponse};
use crate::error::PeerError;

use async_trait::async_trait;
use std::sync::Arc;

/// Selects the node owning a key.
///
/// Returns `None` when the key should be served locally: no peers are known, or the
/// owner is this node itself.
pub trait PeerPicker: Send + Sync {
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerGetter>>;
}

/// Client side of the peer protocol, bound to one remote node.
#[async_trait]
pub trait PeerGetter: Send + Sync {
    /// Fetches `request.key` from the group `request.group` on the remote node.
    async fn get(&self, request: &GetRequest) -> Result<GetResponse, PeerError>;
}
