use axum::{
    extract::State,
    http::{Method, StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use std::fmt;
use std::sync::Arc;

use super::pool::PeerPool;
use super::protocol::{CONTENT_TYPE_OCTET_STREAM, GetResponse};
use crate::group::registry::get_group;

/// Why a peer request could not be answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    /// The path is not `<base_path><group>/<key>`.
    BadRequest(String),
    /// No group with that name exists on this node.
    NotFound(String),
    /// The group failed to produce the value, or it could not be encoded.
    Internal(String),
}

impl RouteError {
    pub fn status(&self) -> StatusCode {
        match self {
            RouteError::BadRequest(_) => StatusCode::BAD_REQUEST,
            RouteError::NotFound(_) => StatusCode::NOT_FOUND,
            RouteError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for RouteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteError::BadRequest(msg) | RouteError::NotFound(msg) | RouteError::Internal(msg) => {
                f.write_str(msg)
            }
        }
    }
}

/// Resolves a request path under `base_path` to the encoded [`GetResponse`] body.
///
/// The part after `base_path` is split at its first `/` into a group name and a key, each
/// percent-decoded. A key may therefore contain further `/` characters.
pub async fn serve_path(base_path: &str, path: &str) -> Result<Vec<u8>, RouteError> {
    let rest = path
        .strip_prefix(base_path)
        .ok_or_else(|| RouteError::BadRequest(format!("unexpected path: {}", path)))?;

    let (group_name, key) = rest
        .split_once('/')
        .ok_or_else(|| RouteError::BadRequest("bad request".to_string()))?;

    let group_name = urlencoding::decode(group_name)
        .map_err(|e| RouteError::BadRequest(format!("invalid group name: {}", e)))?;
    let key = urlencoding::decode(key)
        .map_err(|e| RouteError::BadRequest(format!("invalid key: {}", e)))?;

    let group = get_group(&group_name)
        .ok_or_else(|| RouteError::NotFound(format!("no such group: {}", group_name)))?;

    let value = group
        .get(&key)
        .await
        .map_err(|e| RouteError::Internal(e.to_string()))?;

    GetResponse {
        value: value.byte_slice(),
    }
    .encode()
    .map_err(|e| RouteError::Internal(e.to_string()))
}

pub async fn handle_peer_get(
    State(pool): State<Arc<PeerPool>>,
    method: Method,
    uri: Uri,
) -> Response {
    tracing::info!("[{}] {} {}", pool.self_url(), method, uri.path());

    match serve_path(pool.base_path(), uri.path()).await {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, CONTENT_TYPE_OCTET_STREAM)],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("[{}] peer request failed: {}", pool.self_url(), e);
            (e.status(), e.to_string()).into_response()
        }
    }
}
