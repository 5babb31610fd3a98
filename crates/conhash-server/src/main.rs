#[cfg(target_os = "linux")]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use anyhow::Result;
use tokio::sync::watch;
use tracing::info;

use conhash_server::{rest, shutdown};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "conhash=info,tower_http=info".into()),
        )
        .init();

    info!("Starting conhash server");

    // Load configuration
    let config_path = std::env::args().nth(1);
    let config = conhash_core::ServerConfig::load(config_path.as_deref())?;

    let ring = conhash_ring::RingManager::new(config.ring.clone())?;
    info!(
        virtual_nodes_per_node = ring.virtual_nodes_per_node(),
        "Ring initialized"
    );

    let metrics_handle =
        metrics_exporter_prometheus::PrometheusBuilder::new().install_recorder()?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let http_addr = config.http_addr.parse()?;
    let http_handle = tokio::spawn(rest::serve_rest(
        http_addr,
        ring,
        config.api.clone(),
        metrics_handle,
        shutdown_rx,
    ));

    info!(http_addr = %config.http_addr, "conhash server started");

    shutdown::wait_for_shutdown().await;
    info!("Shutdown signal received, draining...");
    let _ = shutdown_tx.send(true);

    let _ = tokio::time::timeout(tokio::time::Duration::from_secs(30), http_handle).await;

    info!("conhash server stopped");
    Ok(())
}
