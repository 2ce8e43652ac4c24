//! Quote acquisition and normalization
//!
//! The quote service:
//! 1. Re-validates the request
//! 2. Builds a provider-agnostic route request
//! 3. Calls the aggregator exactly once
//! 4. Maps every returned route to a comparable `BridgeQuote`

pub mod estimate;
pub mod ranking;

pub use estimate::{estimate_bridge_time, DEFAULT_BRIDGE_MINUTES};
pub use ranking::{rank, select_best, RankedQuote};

use crate::aggregator::{AggregatorRoute, BridgeAggregator, RouteOptions, RoutesRequest};
use crate::chain::ChainRegistry;
use crate::config::QuoteConfig;
use crate::error::{BridgeError, BridgeResult};
use crate::types::{BridgeQuote, BridgeRoute, CrossChainRequest};
use crate::validation::RequestValidator;

use ethers::types::U256;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Base confidence before the fee penalty
const BASE_CONFIDENCE: f64 = 0.9;

/// Quotes from one quoting round, tagged so a later confirmation can be
/// matched to the round it came from
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteSession {
    pub session_id: Uuid,
    pub quotes: Vec<BridgeQuote>,
    pub best: BridgeQuote,
}

impl QuoteSession {
    pub fn new(quotes: Vec<BridgeQuote>) -> BridgeResult<Self> {
        let best = select_best(&quotes)?;
        Ok(Self {
            session_id: Uuid::new_v4(),
            quotes,
            best,
        })
    }
}

/// Fetches and normalizes quotes from the aggregation provider
pub struct QuoteService {
    registry: Arc<ChainRegistry>,
    aggregator: Arc<dyn BridgeAggregator>,
    options: QuoteConfig,
}

impl QuoteService {
    pub fn new(
        registry: Arc<ChainRegistry>,
        aggregator: Arc<dyn BridgeAggregator>,
        options: QuoteConfig,
    ) -> Self {
        Self {
            registry,
            aggregator,
            options,
        }
    }

    /// Quotes for a request, in provider order
    pub async fn get_quote(&self, request: &CrossChainRequest) -> BridgeResult<Vec<BridgeQuote>> {
        RequestValidator::new(&self.registry).validate(request)?;

        let routes_request = self.build_routes_request(request);
        crate::metrics::record_quote_request(request.source_chain, request.destination_chain);

        let started = Instant::now();
        let routes = match self.aggregator.discover_routes(&routes_request).await {
            Ok(routes) => routes,
            Err(e) => {
                warn!(
                    "Route discovery {} -> {} failed: {}",
                    request.source_chain, request.destination_chain, e
                );
                crate::metrics::record_upstream_error("discover_routes");
                return Err(e);
            }
        };
        crate::metrics::record_quote_latency(started.elapsed().as_secs_f64());

        if routes.is_empty() {
            info!(
                "No routes for {} -> {} ({})",
                request.source_chain, request.destination_chain, request.amount
            );
            crate::metrics::record_no_routes(request.source_chain, request.destination_chain);
            return Err(BridgeError::NoRoutesFound {
                from_chain: request.source_chain,
                to_chain: request.destination_chain,
            });
        }

        let quotes: Vec<BridgeQuote> = routes
            .into_iter()
            .map(|route| normalize_route(route, request))
            .collect();

        debug!(
            "Normalized {} quotes for {} -> {}",
            quotes.len(),
            request.source_chain,
            request.destination_chain
        );
        crate::metrics::record_routes_returned(quotes.len());

        Ok(quotes)
    }

    fn build_routes_request(&self, request: &CrossChainRequest) -> RoutesRequest {
        RoutesRequest {
            from_chain_id: request.source_chain,
            to_chain_id: request.destination_chain,
            from_token_address: request.source_token.clone(),
            to_token_address: request.destination_token.clone(),
            from_amount: request.amount.trim().to_string(),
            from_address: request.sender().to_string(),
            to_address: request.recipient.clone(),
            options: RouteOptions {
                slippage: self.options.slippage,
                max_price_impact: self.options.max_price_impact,
                allow_switch_chain: self.options.allow_switch_chain,
            },
        }
    }
}

/// Map one provider route to a quote, defaulting any missing numeric data
pub fn normalize_route(route: AggregatorRoute, request: &CrossChainRequest) -> BridgeQuote {
    let total_seconds: f64 = route
        .steps
        .iter()
        .filter_map(|step| step.estimate.as_ref()?.execution_duration)
        .filter(|secs| secs.is_finite() && *secs > 0.0)
        .sum();
    let estimated_time = (total_seconds / 60.0).ceil() as u32;

    // Steps without gas data contribute 0
    let gas_estimate = route
        .steps
        .iter()
        .filter_map(|step| step.estimate.as_ref()?.gas_costs.as_ref())
        .flatten()
        .filter_map(|cost| cost.amount.as_deref())
        .map(|amount| U256::from_dec_str(amount).unwrap_or_default())
        .fold(U256::zero(), |acc, amount| acc.saturating_add(amount));

    let fee = route
        .gas_cost_usd
        .clone()
        .filter(|f| !f.trim().is_empty())
        .unwrap_or_else(|| "0".to_string());

    let provider = route
        .steps
        .iter()
        .find_map(|step| step.tool.clone())
        .unwrap_or_else(|| "unknown".to_string());

    let bridge_route = BridgeRoute {
        id: route.id,
        from_chain: route.from_chain_id,
        to_chain: route.to_chain_id,
        from_token: route
            .from_token
            .map(|t| t.address)
            .unwrap_or_else(|| request.source_token.clone()),
        to_token: route
            .to_token
            .map(|t| t.address)
            .unwrap_or_else(|| request.destination_token.clone()),
        from_amount: if route.from_amount.is_empty() {
            request.amount.trim().to_string()
        } else {
            route.from_amount
        },
        min_received: route
            .to_amount_min
            .unwrap_or_else(|| route.to_amount.clone()),
        to_amount: route.to_amount,
        estimated_time,
        fee,
        gas_estimate: gas_estimate.to_string(),
        provider,
        steps: route.steps,
    };

    let confidence = BASE_CONFIDENCE - bridge_route.fee_usd() / 100.0;

    BridgeQuote {
        route: bridge_route,
        confidence,
    }
}
