//! HTTP API for validation, quoting, execution and status tracking

use crate::chain::NetworkConfig;
use crate::config::ApiConfig;
use crate::error::{BridgeError, BridgeResult};
use crate::execution::ExecuteOptions;
use crate::quote::QuoteSession;
use crate::service::BridgeService;
use crate::tracking::BridgeTransaction;
use crate::types::{BridgeRoute, CrossChainRequest};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, info, warn};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<BridgeService>,
    /// Transactions opened through this instance, keyed by source tx hash
    pub transactions: Arc<DashMap<String, BridgeTransaction>>,
    /// How long a settled transaction stays in the book
    pub settled_retention: Duration,
}

impl AppState {
    pub fn new(service: Arc<BridgeService>) -> Self {
        Self {
            service,
            transactions: Arc::new(DashMap::new()),
            settled_retention: Duration::hours(1),
        }
    }

    pub fn with_settled_retention(mut self, retention: Duration) -> Self {
        self.settled_retention = retention;
        self
    }

    /// Drop settled transactions older than the retention window; returns how
    /// many were removed. In-flight transactions are never evicted.
    pub fn evict_settled(&self, now: DateTime<Utc>) -> usize {
        let before = self.transactions.len();
        let cutoff = now - self.settled_retention;
        self.transactions.retain(|_, record| match record.completed_at {
            Some(completed) if record.is_terminal() => completed > cutoff,
            _ => true,
        });
        let evicted = before.saturating_sub(self.transactions.len());
        if evicted > 0 {
            debug!("Evicted {} settled transactions", evicted);
        }
        evicted
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/chains", get(get_chains))
        .route("/validate", post(validate_request))
        .route("/quotes", post(get_quotes))
        .route("/estimate/:from/:to", get(estimate_time))
        .route("/transactions", post(create_transaction))
        .route("/transactions/:id", get(get_transaction))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Run the HTTP API server
pub async fn run_server(config: ApiConfig, state: AppState) -> BridgeResult<()> {
    let addr = format!("{}:{}", config.host, config.port);
    info!("Starting API server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router(state)).await?;

    Ok(())
}

/// Health check endpoint - basic liveness
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        signer: state.service.has_signer(),
    })
}

async fn get_chains(State(state): State<AppState>) -> impl IntoResponse {
    Json(ChainsResponse {
        chains: state.service.registry().all().to_vec(),
    })
}

async fn validate_request(
    State(state): State<AppState>,
    Json(request): Json<CrossChainRequest>,
) -> impl IntoResponse {
    let response = match state.service.validate_bridge_request(&request) {
        Ok(()) => ValidateResponse {
            valid: true,
            error: None,
        },
        Err(e) => ValidateResponse {
            valid: false,
            error: Some(e.to_string()),
        },
    };
    Json(response)
}

async fn get_quotes(
    State(state): State<AppState>,
    Json(request): Json<CrossChainRequest>,
) -> Result<Json<QuoteSession>, BridgeError> {
    let session = state.service.quote_session(&request).await?;
    Ok(Json(session))
}

async fn estimate_time(
    State(state): State<AppState>,
    Path((from, to)): Path<(u64, u64)>,
) -> impl IntoResponse {
    Json(EstimateResponse {
        from_chain: from,
        to_chain: to,
        minutes: state.service.estimate_bridge_time(from, to),
    })
}

async fn create_transaction(
    State(state): State<AppState>,
    Json(body): Json<CreateTransactionRequest>,
) -> Result<(StatusCode, Json<TransactionView>), BridgeError> {
    state.evict_settled(Utc::now());

    let record = state
        .service
        .start_transfer(&body.route, &body.options)
        .await?;

    match &record.error_message {
        Some(message) => warn!(
            "Opened interrupted transaction {} ({} -> {}): {}",
            record.id, record.from_chain, record.to_chain, message
        ),
        None => info!(
            "Opened transaction {} ({} -> {})",
            record.id, record.from_chain, record.to_chain
        ),
    }
    let view = TransactionView::new(record.clone());
    state.transactions.insert(record.id.clone(), record);

    Ok((StatusCode::CREATED, Json(view)))
}

async fn get_transaction(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TransactionView>, BridgeError> {
    let (terminal, provider) = match state.transactions.get(&id) {
        Some(record) => (record.is_terminal(), record.provider.clone()),
        None => return Err(BridgeError::TransactionNotFound { tx_id: id }),
    };

    if !terminal {
        // No map guard is held across the provider call
        let snapshot = state
            .service
            .track_bridge_status(&id, Some(&provider))
            .await?;

        let mut entry = state
            .transactions
            .get_mut(&id)
            .ok_or_else(|| BridgeError::TransactionNotFound { tx_id: id.clone() })?;
        // A settled record that now reads differently is left as it was, and
        // the caller sees the conflict
        if let Err(e) = entry.apply(&snapshot, Utc::now()) {
            warn!("Conflicting status for {}: {}", id, e);
            return Err(e);
        }
    }

    let record = state
        .transactions
        .get(&id)
        .map(|r| r.clone())
        .ok_or(BridgeError::TransactionNotFound { tx_id: id })?;

    Ok(Json(TransactionView::new(record)))
}

impl IntoResponse for BridgeError {
    fn into_response(self) -> Response {
        let status = match &self {
            BridgeError::Validation(_) => StatusCode::BAD_REQUEST,
            BridgeError::NoRoutesFound { .. }
            | BridgeError::EmptyQuoteSet
            | BridgeError::ChainNotFound { .. }
            | BridgeError::TransactionNotFound { .. } => StatusCode::NOT_FOUND,
            BridgeError::Upstream { .. } | BridgeError::Tracking { .. } => StatusCode::BAD_GATEWAY,
            BridgeError::SignerUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            BridgeError::ExecutionRejected(_) => StatusCode::UNPROCESSABLE_ENTITY,
            BridgeError::InvalidStateTransition { .. } => StatusCode::CONFLICT,
            BridgeError::ExecutionFailed(_)
            | BridgeError::ExecutionInterrupted { .. }
            | BridgeError::Config(_)
            | BridgeError::Io(_)
            | BridgeError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = ErrorResponse {
            error: self.to_string(),
            retryable: self.is_retryable(),
            source_tx_hash: self.source_tx_hash().map(str::to_string),
        };
        (status, Json(body)).into_response()
    }
}

// Request and response types

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateTransactionRequest {
    route: BridgeRoute,
    #[serde(flatten)]
    options: ExecuteOptions,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionView {
    #[serde(flatten)]
    pub transaction: BridgeTransaction,
    pub display_progress: u8,
    pub delayed: bool,
}

impl TransactionView {
    fn new(transaction: BridgeTransaction) -> Self {
        let now = chrono::Utc::now();
        Self {
            display_progress: transaction.display_progress(now),
            delayed: transaction.is_delayed(now),
            transaction,
        }
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    signer: bool,
}

#[derive(Serialize)]
struct ChainsResponse {
    chains: Vec<NetworkConfig>,
}

#[derive(Serialize)]
struct ValidateResponse {
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EstimateResponse {
    from_chain: u64,
    to_chain: u64,
    minutes: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorResponse {
    error: String,
    retryable: bool,
    /// Set when a transaction was already broadcast before the failure
    #[serde(skip_serializing_if = "Option::is_none")]
    source_tx_hash: Option<String>,
}
