//! Bridge service facade
//!
//! The single entry point callers use: validate, quote, pick, execute, track.

use crate::aggregator::BridgeAggregator;
use crate::chain::ChainRegistry;
use crate::config::QuoteConfig;
use crate::error::{BridgeError, BridgeResult, ValidationError};
use crate::execution::{ExecuteOptions, ExecutionOrchestrator};
use crate::quote::{self, QuoteService, QuoteSession, RankedQuote};
use crate::tracking::{BridgeTransaction, StatusTracker};
use crate::tx::BridgeSigner;
use crate::types::{BridgeQuote, BridgeRoute, BridgeStatusResponse, CrossChainRequest};
use crate::validation::RequestValidator;

use std::sync::Arc;
use tracing::{info, warn};

pub struct BridgeService {
    registry: Arc<ChainRegistry>,
    quotes: QuoteService,
    executor: ExecutionOrchestrator,
    tracker: StatusTracker,
    signer: Option<Arc<dyn BridgeSigner>>,
}

impl BridgeService {
    pub fn new(
        registry: Arc<ChainRegistry>,
        aggregator: Arc<dyn BridgeAggregator>,
        quote_config: QuoteConfig,
    ) -> Self {
        Self {
            quotes: QuoteService::new(registry.clone(), aggregator.clone(), quote_config),
            executor: ExecutionOrchestrator::new(aggregator.clone()),
            tracker: StatusTracker::new(aggregator),
            registry,
            signer: None,
        }
    }

    /// Attach the connected wallet used for execution
    pub fn with_signer(mut self, signer: Arc<dyn BridgeSigner>) -> Self {
        self.signer = Some(signer);
        self
    }

    pub fn registry(&self) -> &ChainRegistry {
        &self.registry
    }

    pub fn has_signer(&self) -> bool {
        self.signer.is_some()
    }

    pub fn validate_bridge_request(&self, request: &CrossChainRequest) -> Result<(), ValidationError> {
        RequestValidator::new(&self.registry).validate(request)
    }

    pub async fn get_quote(&self, request: &CrossChainRequest) -> BridgeResult<Vec<BridgeQuote>> {
        self.quotes.get_quote(request).await
    }

    pub fn get_best_quote(&self, quotes: &[BridgeQuote]) -> BridgeResult<BridgeQuote> {
        quote::select_best(quotes)
    }

    pub fn rank_quotes(&self, quotes: &[BridgeQuote]) -> Vec<RankedQuote> {
        quote::rank(quotes)
    }

    /// Quote a request and pick the best route in one call
    pub async fn quote_session(&self, request: &CrossChainRequest) -> BridgeResult<QuoteSession> {
        let quotes = self.quotes.get_quote(request).await?;
        let session = QuoteSession::new(quotes)?;
        info!(
            "Quote session {}: {} routes, best {} via {}",
            session.session_id,
            session.quotes.len(),
            session.best.route.id,
            session.best.route.provider
        );
        Ok(session)
    }

    pub fn estimate_bridge_time(&self, from_chain: u64, to_chain: u64) -> u32 {
        quote::estimate_bridge_time(from_chain, to_chain)
    }

    /// Execute a route; returns the transaction id (source-chain hash)
    pub async fn initiate_bridge(
        &self,
        route: &BridgeRoute,
        options: &ExecuteOptions,
    ) -> BridgeResult<String> {
        self.executor
            .execute(route, options, self.signer.clone())
            .await
    }

    /// Execute a route and open a pending record for it.
    ///
    /// A route that failed after its first transaction was broadcast still
    /// gets a record, keyed by that hash, with the failure in `error_message`.
    pub async fn start_transfer(
        &self,
        route: &BridgeRoute,
        options: &ExecuteOptions,
    ) -> BridgeResult<BridgeTransaction> {
        let now = chrono::Utc::now();
        match self.initiate_bridge(route, options).await {
            Ok(tx_hash) => Ok(BridgeTransaction::from_execution(route, tx_hash, now)),
            Err(BridgeError::ExecutionInterrupted { message, partial }) => {
                warn!(
                    "Transfer {} interrupted after {} broadcast step(s): {}",
                    partial.transaction_hash,
                    partial.step_hashes.len(),
                    message
                );
                let mut record =
                    BridgeTransaction::from_execution(route, partial.transaction_hash, now);
                record.error_message = Some(message);
                Ok(record)
            }
            Err(e) => Err(e),
        }
    }

    pub async fn track_bridge_status(
        &self,
        tx_hash: &str,
        bridge: Option<&str>,
    ) -> BridgeResult<BridgeStatusResponse> {
        self.tracker.track_status(tx_hash, bridge).await
    }

    /// Fetch a snapshot and apply it; on any error the record is left as it was
    pub async fn refresh(&self, record: &mut BridgeTransaction) -> BridgeResult<()> {
        if record.is_terminal() {
            return Ok(());
        }
        let snapshot = self
            .tracker
            .track_status(&record.id, Some(&record.provider))
            .await?;
        record.apply(&snapshot, chrono::Utc::now())
    }
}
