use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use std::net::SocketAddr;
use tokio::sync::watch;
use tower_http::trace::TraceLayer;
use tracing::info;

use conhash_core::{ApiConfig, ServerError};
use conhash_ring::{DistributionReport, RingInfo, RingManager};

use crate::dto::{
    ApiResponse, DistributionRequest, LookupRequest, NodeLookupResponse, NodeRequest,
};

#[derive(Clone)]
struct AppState {
    ring: RingManager,
    api: ApiConfig,
    metrics_handle: metrics_exporter_prometheus::PrometheusHandle,
}

/// Error rendered as the JSON error envelope.
pub struct ApiError(ServerError);

impl From<ServerError> for ApiError {
    fn from(err: ServerError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(ApiResponse::<()>::error(&self.0))).into_response()
    }
}

pub fn build_api_router(
    ring: RingManager,
    api: ApiConfig,
    metrics_handle: metrics_exporter_prometheus::PrometheusHandle,
) -> Router {
    let state = AppState {
        ring,
        api,
        metrics_handle,
    };

    Router::new()
        .route("/api/v1/nodes", post(register_node).delete(clear_nodes))
        .route("/api/v1/nodes/{node_id}", delete(deregister_node))
        .route("/api/v1/nodes/lookup/{key}", get(lookup_by_path))
        .route("/api/v1/lookup", post(lookup))
        .route("/api/v1/ring/info", get(ring_info))
        .route("/api/v1/test/distribution", post(test_distribution))
        .route("/metrics", get(metrics))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve_rest(
    addr: SocketAddr,
    ring: RingManager,
    api: ApiConfig,
    metrics_handle: metrics_exporter_prometheus::PrometheusHandle,
    mut shutdown: watch::Receiver<bool>,
) -> Result<(), anyhow::Error> {
    let app = build_api_router(ring, api, metrics_handle);

    info!("REST server listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            while shutdown.changed().await.is_ok() {
                if *shutdown.borrow() {
                    break;
                }
            }
        })
        .await?;

    Ok(())
}

async fn register_node(
    State(state): State<AppState>,
    Json(body): Json<NodeRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    body.validate(&state.api)?;
    let node = body.into_node();
    let label = format!("{} ({})", node.id(), node.address());

    let message = if state.ring.register_node(node) {
        format!("Node added: {label}")
    } else {
        format!("Node already registered: {label}")
    };
    Ok(Json(ApiResponse::message(message)))
}

async fn deregister_node(
    State(state): State<AppState>,
    Path(node_id): Path<String>,
) -> Json<ApiResponse<()>> {
    let message = if state.ring.deregister_node(&node_id) {
        format!("Node removed: {node_id}")
    } else {
        format!("Node not registered: {node_id}")
    };
    Json(ApiResponse::message(message))
}

async fn clear_nodes(State(state): State<AppState>) -> Json<ApiResponse<()>> {
    state.ring.reset();
    Json(ApiResponse::message("All nodes removed"))
}

async fn lookup_by_path(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Json<ApiResponse<NodeLookupResponse>> {
    let owner = state.ring.resolve(&key);
    Json(lookup_response(key, owner.as_deref()))
}

async fn lookup(
    State(state): State<AppState>,
    Json(body): Json<LookupRequest>,
) -> Result<Json<ApiResponse<NodeLookupResponse>>, ApiError> {
    let owner = state
        .ring
        .try_resolve(body.key.as_deref())
        .map_err(ServerError::from)?;
    let key = body.key.unwrap_or_default();
    Ok(Json(lookup_response(key, owner.as_deref())))
}

fn lookup_response(
    key: String,
    owner: Option<&conhash_core::Node>,
) -> ApiResponse<NodeLookupResponse> {
    match owner {
        Some(node) => ApiResponse::success(NodeLookupResponse::found(key, node), "Owner found"),
        None => ApiResponse::success(
            NodeLookupResponse::not_found(key),
            "No owner: ring has no nodes",
        ),
    }
}

async fn ring_info(State(state): State<AppState>) -> Json<ApiResponse<RingInfo>> {
    Json(ApiResponse::success(state.ring.ring_info(), "Ring info"))
}

async fn test_distribution(
    State(state): State<AppState>,
    Json(body): Json<DistributionRequest>,
) -> Result<Json<ApiResponse<DistributionReport>>, ApiError> {
    let key_count = body.validate(&state.api)?;
    let ring = state.ring.clone();
    let report =
        tokio::task::spawn_blocking(move || ring.distribution(&body.key_prefix, key_count))
            .await
            .map_err(|e| ServerError::Internal(format!("distribution task failed: {e}")))?;

    let message = format!(
        "Distributed {} keys across {} nodes (uniformity {:.2})",
        report.total_key_count,
        report.node_distribution.len(),
        report.uniformity_score
    );
    Ok(Json(ApiResponse::success(report, message)))
}

async fn metrics(State(state): State<AppState>) -> String {
    state.metrics_handle.render()
}

async fn healthz() -> &'static str {
    "ok"
}
