use anyhow::{Context, anyhow};
use axum::extract::{Extension, Query};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing::get};
use distributed_cache::group::group::Group;
use distributed_cache::peers::pool::PeerPool;
use distributed_cache::peers::protocol::CONTENT_TYPE_OCTET_STREAM;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

const GROUP_NAME: &str = "scores";
const DEFAULT_CACHE_BYTES: usize = 2048 << 10;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        // .with_max_level(tracing::Level::DEBUG)
        .with_max_level(tracing::Level::INFO)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 3 {
        eprintln!(
            "Usage: {} --bind <addr:port> [--peer <url>]... [--api <addr:port>] [--cache-bytes <n>]",
            args[0]
        );
        eprintln!("Example: {} --bind 127.0.0.1:8001", args[0]);
        eprintln!(
            "Example: {} --bind 127.0.0.1:8001 --peer http://127.0.0.1:8002 --api 127.0.0.1:9999",
            args[0]
        );

        std::process::exit(1);
    }

    let mut bind_addr: Option<SocketAddr> = None;
    let mut api_addr: Option<SocketAddr> = None;
    let mut peers: Vec<String> = vec![];
    let mut cache_bytes = DEFAULT_CACHE_BYTES;

    let mut i = 1;
    while i < args.len() {
        let value = || {
            args.get(i + 1)
                .ok_or_else(|| anyhow!("{} requires a value", args[i]))
        };
        match args[i].as_str() {
            "--bind" => {
                bind_addr = Some(value()?.parse().context("invalid --bind address")?);
                i += 2;
            }
            "--peer" => {
                peers.push(value()?.trim_end_matches('/').to_string());
                i += 2;
            }
            "--api" => {
                api_addr = Some(value()?.parse().context("invalid --api address")?);
                i += 2;
            }
            "--cache-bytes" => {
                cache_bytes = value()?.parse().context("invalid --cache-bytes")?;
                i += 2;
            }
            _ => {
                i += 1;
            }
        }
    }

    let bind_addr = bind_addr.ok_or_else(|| anyhow!("--bind is required"))?;
    let self_url = format!("http://{}", bind_addr);
    if !peers.contains(&self_url) {
        peers.push(self_url.clone());
    }

    tracing::info!("Starting cache node on {}", self_url);
    tracing::info!("Peers: {:?}", peers);

    // 1. Cache group backed by the slow database:
    let scores = create_group(cache_bytes);

    // 2. Peer pool:
    let pool = PeerPool::new(&self_url);
    pool.set(&peers);
    scores.register_peers(pool.clone());

    // 3. Optional front-end API:
    if let Some(api_addr) = api_addr {
        let api = Router::new()
            .route("/api", get(handle_api_get))
            .route("/api/stats", get(handle_api_stats))
            .layer(Extension(scores.clone()));

        let listener = tokio::net::TcpListener::bind(api_addr).await?;
        tracing::info!("Front-end API listening on {}", api_addr);
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, api).await {
                tracing::error!("Front-end API stopped: {}", e);
            }
        });
    }

    // 4. Spawn stats reporter:
    let stats_group = scores.clone();
    let stats_pool = pool.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(30));

        loop {
            interval.tick().await;
            let (entries, bytes) = stats_group.cache_stats();
            tracing::info!(
                "Cache stats [{}]: {} entries, {} bytes, {} peers",
                stats_group.name(),
                entries,
                bytes,
                stats_pool.peer_count()
            );
        }
    });

    // 5. Start peer server:
    tracing::info!("Peer server listening on {}{}", self_url, pool.base_path());
    tracing::info!("Press Ctrl+C to shutdown");

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    axum::serve(listener, pool.router()).await?;

    Ok(())
}

/// Group over a small in-memory "database" that takes a while to answer.
fn create_group(cache_bytes: usize) -> Arc<Group> {
    let db: Arc<HashMap<String, String>> = Arc::new(
        [("Tom", "630"), ("Jack", "589"), ("Sam", "567")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    );

    Group::new(GROUP_NAME, cache_bytes, move |key| {
        let db = db.clone();
        async move {
            tracing::info!("[SlowDB] search key {}", key);
            tokio::time::sleep(Duration::from_millis(100)).await;
            db.get(&key)
                .map(|value| value.clone().into_bytes())
                .ok_or_else(|| anyhow!("{} not exist", key))
        }
    })
}

#[derive(Debug, Deserialize)]
struct ApiQuery {
    key: String,
}

#[derive(Debug, Serialize)]
struct StatsResponse {
    group: String,
    entries: usize,
    bytes: usize,
}

async fn handle_api_get(
    Extension(group): Extension<Arc<Group>>,
    Query(query): Query<ApiQuery>,
) -> Response {
    match group.get(&query.key).await {
        Ok(value) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, CONTENT_TYPE_OCTET_STREAM)],
            value.byte_slice(),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to get {}: {}", query.key, e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

async fn handle_api_stats(Extension(group): Extension<Arc<Group>>) -> Json<StatsResponse> {
    let (entries, bytes) = group.cache_stats();
    Json(StatsResponse {
        group: group.name().to_string(),
        entries,
        bytes,
    })
}
