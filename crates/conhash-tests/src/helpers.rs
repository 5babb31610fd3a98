use std::collections::BTreeMap;

use axum::Router;
use conhash_core::{ApiConfig, Node, NodeId};
use conhash_ring::RingManager;

/// Ring with nodes registered at the default address.
pub fn ring_with(ids: &[&str]) -> RingManager {
    let ring = RingManager::default();
    for id in ids {
        ring.register_node(Node::with_id(*id));
    }
    ring
}

pub fn sample_keys(prefix: &str, count: usize) -> Vec<String> {
    (0..count).map(|i| format!("{prefix}-{i}")).collect()
}

pub fn owners(ring: &RingManager, keys: &[String]) -> BTreeMap<String, Option<NodeId>> {
    ring.snapshot_owners(keys.iter().cloned())
}

/// Build the REST router around an existing ring.
pub fn build_test_router(ring: RingManager) -> Router {
    let metrics_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .build_recorder()
        .handle();
    conhash_server::rest::build_api_router(ring, ApiConfig::default(), metrics_handle)
}

/// Convert a serde_json::Value into an axum-compatible request body.
pub fn json_body(value: serde_json::Value) -> String {
    serde_json::to_string(&value).unwrap()
}

/// Read the response body as bytes and parse as JSON.
pub async fn parse_response_json(
    response: axum::http::Response<axum::body::Body>,
) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}
