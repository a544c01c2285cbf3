//! HTTP Peer Pool
//!
//! A [`PeerPool`] is both sides of the peer protocol for one node:
//!
//! - **Server**: [`PeerPool::router`] serves `GET <base_path><group>/<key>` for the groups
//!   registered in this process.
//! - **Client**: as a [`PeerPicker`] it maps keys to owning nodes on a consistent hash ring
//!   and hands out an [`HttpGetter`] for every remote owner.
//!
//! Peers are identified by their base URL (`http://10.0.0.2:8008`). The pool's own URL must
//! appear in the same form in [`PeerPool::set`] so that self-owned keys are recognised and
//! served locally.

use super::handlers::handle_peer_get;
use super::protocol::{DEFAULT_BASE_PATH, GetRequest, GetResponse, normalize_base_path};
use super::types::{PeerGetter, PeerPicker};
use crate::error::PeerError;
use crate::storage::partitioner::{DEFAULT_REPLICAS, HashFn, HashRing};

use async_trait::async_trait;
use axum::{Router, routing::get};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Default timeout for a single peer request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(3);

/// Tunables of a [`PeerPool`].
#[derive(Debug, Clone)]
pub struct PoolOptions {
    /// Routing prefix served and requested. Normalised to start and end with `/`.
    pub base_path: String,
    /// Virtual nodes per peer on the hash ring.
    pub replicas: usize,
    /// Hash function of the ring. Every node of a cluster must use the same one.
    pub hash: HashFn,
    /// Per-request timeout for peer fetches; `None` disables it.
    pub request_timeout: Option<Duration>,
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self {
            base_path: DEFAULT_BASE_PATH.to_string(),
            replicas: DEFAULT_REPLICAS,
            hash: crc32fast::hash,
            request_timeout: Some(DEFAULT_REQUEST_TIMEOUT),
        }
    }
}

struct PeerState {
    ring: HashRing,
    getters: HashMap<String, Arc<HttpGetter>>,
}

pub struct PeerPool {
    self_url: String,
    options: PoolOptions,
    http_client: reqwest::Client,
    state: Mutex<PeerState>,
}

impl PeerPool {
    /// Creates a pool for the node reachable at `self_url`, with default options.
    pub fn new(self_url: &str) -> Arc<Self> {
        Self::with_options(self_url, PoolOptions::default())
    }

    pub fn with_options(self_url: &str, mut options: PoolOptions) -> Arc<Self> {
        options.base_path = normalize_base_path(&options.base_path);
        let ring = HashRing::with_hash(options.replicas, options.hash);

        Arc::new(Self {
            self_url: self_url.trim_end_matches('/').to_string(),
            options,
            http_client: reqwest::Client::new(),
            state: Mutex::new(PeerState {
                ring,
                getters: HashMap::new(),
            }),
        })
    }

    /// Replaces the peer set. The ring and the clients are rebuilt from scratch.
    pub fn set<I, S>(&self, peers: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let peers: Vec<String> = peers
            .into_iter()
            .map(|peer| peer.as_ref().trim_end_matches('/').to_string())
            .collect();

        let mut ring = HashRing::with_hash(self.options.replicas, self.options.hash);
        ring.add(&peers);

        let getters = peers
            .iter()
            .map(|peer| {
                let getter = HttpGetter {
                    base_url: format!("{}{}", peer, self.options.base_path),
                    http_client: self.http_client.clone(),
                    timeout: self.options.request_timeout,
                };
                (peer.clone(), Arc::new(getter))
            })
            .collect();

        *self.state.lock() = PeerState { ring, getters };
        tracing::info!("[{}] peer set updated: {:?}", self.self_url, peers);
    }

    pub fn self_url(&self) -> &str {
        &self.self_url
    }

    pub fn base_path(&self) -> &str {
        &self.options.base_path
    }

    /// Number of peers currently on the ring, this node included.
    pub fn peer_count(&self) -> usize {
        self.state.lock().getters.len()
    }

    /// Router serving the peer protocol under the pool's base path.
    pub fn router(self: &Arc<Self>) -> Router {
        Router::new()
            .route(&format!("{}*rest", self.options.base_path), get(handle_peer_get))
            .with_state(self.clone())
    }
}

impl PeerPicker for PeerPool {
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerGetter>> {
        let state = self.state.lock();
        let owner = state.ring.get(key)?;
        if owner == self.self_url {
            return None;
        }

        tracing::debug!("[{}] Pick peer {} for {}", self.self_url, owner, key);
        let getter = state.getters.get(owner)?.clone();
        Some(getter)
    }
}

/// Client for one remote node's peer endpoint.
pub struct HttpGetter {
    /// `<peer_url><base_path>`, ending with `/`.
    base_url: String,
    http_client: reqwest::Client,
    timeout: Option<Duration>,
}

impl HttpGetter {
    /// Creates a standalone getter for the node at `peer_url` serving `base_path`.
    pub fn new(peer_url: &str, base_path: &str) -> Self {
        Self {
            base_url: format!(
                "{}{}",
                peer_url.trim_end_matches('/'),
                normalize_base_path(base_path)
            ),
            http_client: reqwest::Client::new(),
            timeout: Some(DEFAULT_REQUEST_TIMEOUT),
        }
    }

    pub fn url_for(&self, request: &GetRequest) -> String {
        format!(
            "{}{}/{}",
            self.base_url,
            urlencoding::encode(&request.group),
            urlencoding::encode(&request.key)
        )
    }
}

#[async_trait]
impl PeerGetter for HttpGetter {
    async fn get(&self, request: &GetRequest) -> Result<GetResponse, PeerError> {
        let url = self.url_for(request);

        let mut builder = self.http_client.get(&url);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await.map_err(PeerError::Transport)?;
        if !response.status().is_success() {
            return Err(PeerError::Status(response.status()));
        }

        let body = response.bytes().await.map_err(PeerError::Transport)?;
        GetResponse::decode(&body).map_err(PeerError::Decode)
    }
}
