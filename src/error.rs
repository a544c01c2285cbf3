//! Error types surfaced by the cache.
//!
//! - [`CacheError`] is what callers of [`Group::get`](crate::group::group::Group::get) see.
//!   It is `Clone` because a single load result is handed to every caller waiting on it.
//! - [`PeerError`] is returned by the peer client contract. The orchestration logs it and
//!   falls back to the local loader, so it never reaches the `get` caller.

use reqwest::StatusCode;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub enum CacheError {
    /// `get` was called with an empty key.
    EmptyKey,
    /// The loader failed. Displayed verbatim.
    Loader(Arc<anyhow::Error>),
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheError::EmptyKey => f.write_str("key is required"),
            CacheError::Loader(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for CacheError {}

impl From<anyhow::Error> for CacheError {
    fn from(err: anyhow::Error) -> Self {
        CacheError::Loader(Arc::new(err))
    }
}

/// Failure while fetching a key from a remote peer.
#[derive(Debug)]
pub enum PeerError {
    /// The request could not be sent or the body could not be read.
    Transport(reqwest::Error),
    /// The peer answered with a non-success status.
    Status(StatusCode),
    /// The response body is not a valid encoded `GetResponse`.
    Decode(bincode::Error),
}

impl fmt::Display for PeerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeerError::Transport(err) => write!(f, "peer request failed: {}", err),
            PeerError::Status(status) => write!(f, "peer returned {}", status),
            PeerError::Decode(err) => write!(f, "failed to decode peer response: {}", err),
        }
    }
}

impl std::error::Error for PeerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PeerError::Transport(err) => Some(err),
            PeerError::Status(_) => None,
            PeerError::Decode(err) => Some(err.as_ref()),
        }
    }
}
