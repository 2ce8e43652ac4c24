//! Prometheus metrics for monitoring
//!
//! Exposes metrics for:
//! - Quote requests and route discovery outcomes
//! - Upstream provider failures
//! - Execution submissions and failures
//! - Status snapshots

use crate::error::{BridgeError, BridgeResult};
use crate::types::BridgeStatus;

use axum::{http::StatusCode, routing::get, Router};
use lazy_static::lazy_static;
use prometheus::{
    register_counter_vec, register_histogram_vec, CounterVec, Encoder, HistogramVec, TextEncoder,
};
use std::net::SocketAddr;
use tracing::{error, info};

lazy_static! {
    // Quote metrics
    pub static ref QUOTE_REQUESTS: CounterVec = register_counter_vec!(
        "portfolio_bridge_quote_requests_total",
        "Total quote requests sent to the aggregator",
        &["from_chain", "to_chain"]
    ).expect("register quote_requests");

    pub static ref ROUTES_RETURNED: HistogramVec = register_histogram_vec!(
        "portfolio_bridge_routes_returned",
        "Routes returned per quote request",
        &[],
        vec![1.0, 2.0, 3.0, 5.0, 10.0, 20.0]
    ).expect("register routes_returned");

    pub static ref NO_ROUTES: CounterVec = register_counter_vec!(
        "portfolio_bridge_no_routes_total",
        "Quote requests that returned no routes",
        &["from_chain", "to_chain"]
    ).expect("register no_routes");

    pub static ref QUOTE_LATENCY: HistogramVec = register_histogram_vec!(
        "portfolio_bridge_quote_latency_seconds",
        "Aggregator route discovery latency",
        &[],
        vec![0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]
    ).expect("register quote_latency");

    // Provider metrics
    pub static ref UPSTREAM_ERRORS: CounterVec = register_counter_vec!(
        "portfolio_bridge_upstream_errors_total",
        "Aggregator failures by operation",
        &["operation"]
    ).expect("register upstream_errors");

    // Execution metrics
    pub static ref EXECUTIONS_SUBMITTED: CounterVec = register_counter_vec!(
        "portfolio_bridge_executions_submitted_total",
        "Bridge executions that returned a source transaction",
        &["chain_id"]
    ).expect("register executions_submitted");

    pub static ref EXECUTIONS_FAILED: CounterVec = register_counter_vec!(
        "portfolio_bridge_executions_failed_total",
        "Bridge executions that failed or were rejected",
        &["chain_id", "reason"]
    ).expect("register executions_failed");

    pub static ref EXECUTION_STEPS: CounterVec = register_counter_vec!(
        "portfolio_bridge_execution_steps_total",
        "Confirmed execution steps and approvals",
        &["chain_id", "stage"]
    ).expect("register execution_steps");

    // Tracking metrics
    pub static ref STATUS_SNAPSHOTS: CounterVec = register_counter_vec!(
        "portfolio_bridge_status_snapshots_total",
        "Status snapshots by canonical status",
        &["status"]
    ).expect("register status_snapshots");
}

/// Prometheus metrics server
pub struct MetricsServer {
    port: u16,
}

impl MetricsServer {
    pub fn new(port: u16) -> Self {
        Self { port }
    }

    pub fn router() -> Router {
        Router::new().route("/metrics", get(metrics_handler))
    }

    pub async fn run(&self) -> BridgeResult<()> {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        info!("Starting metrics server on {}", addr);

        let listener = tokio::net::TcpListener::bind(&addr).await?;
        axum::serve(listener, Self::router()).await?;

        Ok(())
    }
}

async fn metrics_handler() -> Result<String, StatusCode> {
    encode_metrics().map_err(|e| {
        error!("Failed to encode metrics: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })
}

/// Current registry in prometheus text format
pub fn encode_metrics() -> BridgeResult<String> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| BridgeError::Internal(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| BridgeError::Internal(e.to_string()))
}

// Helper functions to record metrics

pub fn record_quote_request(from_chain: u64, to_chain: u64) {
    QUOTE_REQUESTS
        .with_label_values(&[&from_chain.to_string(), &to_chain.to_string()])
        .inc();
}

pub fn record_routes_returned(count: usize) {
    ROUTES_RETURNED.with_label_values(&[]).observe(count as f64);
}

pub fn record_no_routes(from_chain: u64, to_chain: u64) {
    NO_ROUTES
        .with_label_values(&[&from_chain.to_string(), &to_chain.to_string()])
        .inc();
}

pub fn record_quote_latency(latency_secs: f64) {
    QUOTE_LATENCY.with_label_values(&[]).observe(latency_secs);
}

pub fn record_upstream_error(operation: &str) {
    UPSTREAM_ERRORS.with_label_values(&[operation]).inc();
}

pub fn record_execution_submitted(chain_id: u64) {
    EXECUTIONS_SUBMITTED
        .with_label_values(&[&chain_id.to_string()])
        .inc();
}

pub fn record_execution_failed(chain_id: u64, err: &BridgeError) {
    let reason = match err {
        BridgeError::SignerUnavailable(_) => "signer_unavailable",
        BridgeError::ExecutionRejected(_) => "rejected",
        BridgeError::ExecutionFailed(_) => "failed",
        BridgeError::ExecutionInterrupted { .. } => "interrupted",
        BridgeError::Upstream { .. } => "upstream",
        _ => "other",
    };
    EXECUTIONS_FAILED
        .with_label_values(&[&chain_id.to_string(), reason])
        .inc();
}

pub fn record_execution_step(chain_id: u64, stage: &str) {
    EXECUTION_STEPS
        .with_label_values(&[&chain_id.to_string(), stage])
        .inc();
}

pub fn record_status_snapshot(status: BridgeStatus) {
    STATUS_SNAPSHOTS.with_label_values(&[status.as_str()]).inc();
}
