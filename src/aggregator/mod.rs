//! Bridge aggregation provider interface
//!
//! The provider is reached only through [`BridgeAggregator`], which exposes the
//! three operations the core needs: route discovery, route execution and
//! status queries. Ranking and validation never see the concrete client.

pub mod lifi;

pub use lifi::LifiClient;

use crate::error::BridgeResult;
use crate::tx::BridgeSigner;
use crate::types::BridgeRoute;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Route discovery input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutesRequest {
    pub from_chain_id: u64,
    pub to_chain_id: u64,
    pub from_token_address: String,
    pub to_token_address: String,
    pub from_amount: String,
    pub from_address: String,
    pub to_address: String,
    pub options: RouteOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteOptions {
    pub slippage: f64,
    pub max_price_impact: f64,
    pub allow_switch_chain: bool,
}

/// A route as returned by the provider; every field past the identity is optional
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatorRoute {
    pub id: String,
    pub from_chain_id: u64,
    pub to_chain_id: u64,
    #[serde(default)]
    pub from_amount: String,
    #[serde(default)]
    pub to_amount: String,
    #[serde(default)]
    pub to_amount_min: Option<String>,
    #[serde(default)]
    pub from_token: Option<TokenRef>,
    #[serde(default)]
    pub to_token: Option<TokenRef>,
    #[serde(default, rename = "gasCostUSD")]
    pub gas_cost_usd: Option<String>,
    #[serde(default)]
    pub steps: Vec<RouteStep>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenRef {
    pub address: String,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub decimals: Option<u8>,
}

/// One provider step; fields the core does not read are kept verbatim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteStep {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub tool: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimate: Option<StepEstimate>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepEstimate {
    /// Seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_costs: Option<Vec<GasCost>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approval_address: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GasCost {
    /// Wei
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    #[serde(default, rename = "amountUSD", skip_serializing_if = "Option::is_none")]
    pub amount_usd: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Settings the provider applies while executing a route
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionSettings {
    pub slippage: f64,
    /// Epoch milliseconds
    pub deadline: i64,
}

/// Progress notification emitted during execution
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionUpdate {
    pub step_index: usize,
    pub step_count: usize,
    pub stage: ExecutionStage,
    pub chain_id: u64,
    pub tx_hash: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStage {
    ApprovalConfirmed,
    StepConfirmed,
}

pub type ProgressCallback = Arc<dyn Fn(ExecutionUpdate) + Send + Sync>;

/// Record of a completed execution call
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionRecord {
    /// Source-chain transaction hash of the first bridging step
    pub transaction_hash: String,
    pub step_hashes: Vec<String>,
}

/// Status query input
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bridge: Option<String>,
    pub tx_hash: String,
}

/// Provider status payload
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub status: String,
    #[serde(default)]
    pub substatus: Option<String>,
    #[serde(default)]
    pub substatus_message: Option<String>,
    #[serde(default)]
    pub sending: Option<TransferLeg>,
    #[serde(default)]
    pub receiving: Option<TransferLeg>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferLeg {
    #[serde(default)]
    pub tx_hash: Option<String>,
    #[serde(default)]
    pub chain_id: Option<u64>,
}

/// Narrow interface to a cross-chain aggregation provider
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BridgeAggregator: Send + Sync {
    /// Discover candidate routes; an empty list is a valid answer
    async fn discover_routes(&self, request: &RoutesRequest) -> BridgeResult<Vec<AggregatorRoute>>;

    /// Execute every step of a route with the given signer
    async fn execute_route(
        &self,
        signer: Arc<dyn BridgeSigner>,
        route: &BridgeRoute,
        settings: &ExecutionSettings,
        on_update: ProgressCallback,
    ) -> BridgeResult<ExecutionRecord>;

    /// Query the provider's view of a submitted transfer
    async fn query_status(&self, query: &StatusQuery) -> BridgeResult<StatusResponse>;
}
