//! Read-Through Group
//!
//! A [`Group`] is a named cache namespace. `get` answers from the local cache when it can;
//! on a miss it loads the value exactly once per key, no matter how many callers ask
//! concurrently:
//!
//! 1. If a peer picker is attached and selects a remote owner, the value is fetched from
//!    that peer. The owner caches it, this node does not.
//! 2. Otherwise, or if the peer fetch fails, the caller-supplied loader produces the value
//!    and it is stored in the local cache.
//!
//! Loader errors reach the caller. Peer errors are logged and answered by a local load.

use super::registry::registry;
use super::singleflight::SingleFlight;
use crate::error::{CacheError, PeerError};
use crate::peers::protocol::GetRequest;
use crate::peers::types::{PeerGetter, PeerPicker};
use crate::storage::byteview::ByteView;
use crate::storage::cache::ConcurrentCache;

use anyhow::Result;
use async_trait::async_trait;
use std::future::Future;
use std::sync::{Arc, OnceLock};

/// Source of truth consulted on a full cache miss.
#[async_trait]
pub trait Getter: Send + Sync {
    async fn get(&self, key: &str) -> Result<Vec<u8>>;
}

/// Adapts an async closure into a [`Getter`].
pub struct LoaderFn<F>(pub F);

#[async_trait]
impl<F, Fut> Getter for LoaderFn<F>
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Vec<u8>>> + Send + 'static,
{
    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        (self.0)(key.to_string()).await
    }
}

pub struct Group {
    name: String,
    getter: Arc<dyn Getter>,
    main_cache: ConcurrentCache,
    peers: OnceLock<Arc<dyn PeerPicker>>,
    loader: SingleFlight<Result<ByteView, CacheError>>,
}

impl Group {
    /// Creates a group backed by an async loader closure and registers it process-wide.
    ///
    /// # Arguments
    /// * `name` - Unique group name, also used to address the group on remote peers.
    /// * `cache_bytes` - Byte budget of the local cache; `0` means unbounded.
    /// * `loader` - Called with the key on a full miss.
    pub fn new<F, Fut>(name: &str, cache_bytes: usize, loader: F) -> Arc<Self>
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Vec<u8>>> + Send + 'static,
    {
        Self::with_getter(name, cache_bytes, Arc::new(LoaderFn(loader)))
    }

    /// Creates a group backed by any [`Getter`] and registers it process-wide.
    pub fn with_getter(name: &str, cache_bytes: usize, getter: Arc<dyn Getter>) -> Arc<Self> {
        let group = Arc::new(Self {
            name: name.to_string(),
            getter,
            main_cache: ConcurrentCache::new(cache_bytes),
            peers: OnceLock::new(),
            loader: SingleFlight::new(),
        });

        registry().register(group.clone());
        tracing::info!("Created group {} (cache budget: {} bytes)", name, cache_bytes);

        group
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attaches the peer picker used to route misses to owning nodes.
    ///
    /// # Panics
    /// If a picker has already been attached.
    pub fn register_peers(&self, peers: Arc<dyn PeerPicker>) {
        if self.peers.set(peers).is_err() {
            panic!("register_peers called more than once for group {}", self.name);
        }
    }

    pub async fn get(&self, key: &str) -> Result<ByteView, CacheError> {
        if key.is_empty() {
            return Err(CacheError::EmptyKey);
        }

        if let Some(value) = self.main_cache.get(key) {
            tracing::debug!("[{}] cache hit for {}", self.name, key);
            return Ok(value);
        }

        self.load(key).await
    }

    /// Returns `(entries, bytes)` held by the local cache.
    pub fn cache_stats(&self) -> (usize, usize) {
        self.main_cache.stats()
    }

    async fn load(&self, key: &str) -> Result<ByteView, CacheError> {
        self.loader
            .run(key, || async {
                if let Some(peers) = self.peers.get()
                    && let Some(peer) = peers.pick_peer(key)
                {
                    match self.get_from_peer(peer.as_ref(), key).await {
                        Ok(value) => return Ok(value),
                        Err(e) => {
                            tracing::warn!(
                                "[{}] failed to get {} from peer, loading locally: {}",
                                self.name,
                                key,
                                e
                            );
                        }
                    }
                }

                self.get_locally(key).await
            })
            .await
    }

    async fn get_from_peer(&self, peer: &dyn PeerGetter, key: &str) -> Result<ByteView, PeerError> {
        let request = GetRequest {
            group: self.name.clone(),
            key: key.to_string(),
        };

        let response = peer.get(&request).await?;
        Ok(ByteView::from(response.value))
    }

    async fn get_locally(&self, key: &str) -> Result<ByteView, CacheError> {
        let bytes = self.getter.get(key).await?;
        let value = ByteView::from(bytes);

        tracing::debug!("[{}] loaded {} locally ({} bytes)", self.name, key, value.len());
        self.populate_cache(key, value.clone());

        Ok(value)
    }

    fn populate_cache(&self, key: &str, value: ByteView) {
        self.main_cache.add(key, value);
    }
}
