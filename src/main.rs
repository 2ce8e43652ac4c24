//! Portfolio Bridge - cross-chain transfer service
//!
//! Serves validation, quoting, execution and status tracking for the
//! dashboard over HTTP, backed by a LI.FI-compatible aggregator.

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};

use portfolio_bridge::aggregator::LifiClient;
use portfolio_bridge::api::{self, AppState};
use portfolio_bridge::chain::ChainRegistry;
use portfolio_bridge::config::{LogFormat, Settings};
use portfolio_bridge::metrics::MetricsServer;
use portfolio_bridge::tx::{BridgeSigner, WalletSigner};
use portfolio_bridge::BridgeService;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first so the log format can be applied
    let settings = Settings::load()?;

    init_logging(settings.logging.format);

    info!(
        "Starting Portfolio Bridge v{} ({})",
        env!("CARGO_PKG_VERSION"),
        settings.service.instance_id
    );

    let registry = Arc::new(ChainRegistry::new(settings.networks()));
    info!(
        "Loaded {} networks ({} testnets)",
        registry.all().len(),
        registry.testnets().len()
    );

    let aggregator = Arc::new(
        LifiClient::new(&settings.aggregator).context("Failed to build aggregator client")?,
    );
    info!("Aggregator client ready: {}", settings.aggregator.base_url);

    let mut service = BridgeService::new(registry.clone(), aggregator, settings.quote.clone());
    match load_signer(&settings, &registry) {
        Some(signer) => service = service.with_signer(signer),
        None => warn!("No wallet configured, execution endpoints will refuse requests"),
    }

    let state = AppState::new(Arc::new(service)).with_settled_retention(
        chrono::Duration::seconds(settings.api.settled_retention_secs as i64),
    );

    // Evict settled transactions even when no new transfers arrive
    let eviction_handle = tokio::spawn({
        let state = state.clone();
        async move {
            let mut interval = tokio::time::interval(std::time::Duration::from_secs(60));
            loop {
                interval.tick().await;
                state.evict_settled(chrono::Utc::now());
            }
        }
    });

    // Start API server
    let api_handle = tokio::spawn({
        let config = settings.api.clone();
        let state = state.clone();
        async move {
            if let Err(e) = api::run_server(config, state).await {
                error!("API server error: {}", e);
            }
        }
    });

    // Start metrics server
    let metrics_handle = if settings.metrics.enabled {
        let server = MetricsServer::new(settings.metrics.port);
        Some(tokio::spawn(async move {
            if let Err(e) = server.run().await {
                error!("Metrics server error: {}", e);
            }
        }))
    } else {
        None
    };

    info!("Portfolio Bridge is running");
    info!("API server: http://{}:{}", settings.api.host, settings.api.port);
    if settings.metrics.enabled {
        info!("Metrics: http://0.0.0.0:{}/metrics", settings.metrics.port);
    }

    // Wait for shutdown signal
    shutdown_signal().await;

    info!("Shutdown signal received, stopping...");

    api_handle.abort();
    eviction_handle.abort();
    if let Some(h) = metrics_handle {
        h.abort();
    }

    info!(
        "Portfolio Bridge stopped with {} tracked transactions",
        state.transactions.len()
    );
    Ok(())
}

/// Wallet signer for the configured chain, if one is set up
fn load_signer(settings: &Settings, registry: &ChainRegistry) -> Option<Arc<dyn BridgeSigner>> {
    let var_name = settings.wallet.private_key_env.as_deref()?;
    let chain_id = settings.wallet.chain_id?;

    let network = match registry.require(chain_id) {
        Ok(network) => network,
        Err(e) => {
            error!("Wallet chain unavailable: {}", e);
            return None;
        }
    };

    match WalletSigner::from_env(network, var_name) {
        Ok(signer) => Some(Arc::new(signer)),
        Err(e) => {
            error!("Failed to load wallet from {}: {}", var_name, e);
            None
        }
    }
}

fn init_logging(format: LogFormat) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("info,portfolio_bridge=debug,hyper=warn,reqwest=warn")
    });

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_target(true).with_thread_ids(true))
            .init(),
        LogFormat::Pretty => registry
            .with(fmt::layer().with_target(true).with_thread_ids(true))
            .init(),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
