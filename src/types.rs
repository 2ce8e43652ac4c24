//! Domain types shared across quoting, execution and tracking

use crate::aggregator::RouteStep;

use serde::{Deserialize, Serialize};

/// A request to move tokens from one network to another
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossChainRequest {
    pub source_chain: u64,
    pub destination_chain: u64,
    pub source_token: String,
    pub destination_token: String,
    /// Decimal string in the token's base units
    pub amount: String,
    pub recipient: String,
    /// Sending address; the recipient is used when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_address: Option<String>,
    /// Epoch milliseconds
    pub deadline: i64,
}

impl CrossChainRequest {
    pub fn sender(&self) -> &str {
        self.from_address.as_deref().unwrap_or(&self.recipient)
    }
}

/// Normalized route produced from an aggregator response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeRoute {
    pub id: String,
    pub from_chain: u64,
    pub to_chain: u64,
    pub from_token: String,
    pub to_token: String,
    pub from_amount: String,
    pub to_amount: String,
    pub min_received: String,
    /// Minutes
    pub estimated_time: u32,
    /// USD
    pub fee: String,
    /// Sum of per-step gas costs in wei
    pub gas_estimate: String,
    pub provider: String,
    pub steps: Vec<RouteStep>,
}

impl BridgeRoute {
    /// Fee as a number; unparsable or negative provider values count as 0
    pub fn fee_usd(&self) -> f64 {
        self.fee
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite() && *f >= 0.0)
            .unwrap_or(0.0)
    }
}

/// A route annotated with ranking inputs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeQuote {
    #[serde(flatten)]
    pub route: BridgeRoute,
    /// Fee-penalizing heuristic, not a probability
    pub confidence: f64,
}

impl BridgeQuote {
    pub fn estimated_time(&self) -> u32 {
        self.route.estimated_time
    }

    pub fn fee(&self) -> f64 {
        self.route.fee_usd()
    }

    pub fn min_received(&self) -> &str {
        &self.route.min_received
    }

    pub fn gas_estimate(&self) -> &str {
        &self.route.gas_estimate
    }
}

/// Canonical bridge transaction status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BridgeStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    Refunded,
}

impl BridgeStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BridgeStatus::Completed | BridgeStatus::Failed | BridgeStatus::Refunded
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BridgeStatus::Pending => "pending",
            BridgeStatus::Processing => "processing",
            BridgeStatus::Completed => "completed",
            BridgeStatus::Failed => "failed",
            BridgeStatus::Refunded => "refunded",
        }
    }
}

impl std::fmt::Display for BridgeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One status snapshot as reported by the tracker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeStatusResponse {
    pub status: BridgeStatus,
    pub source_tx_hash: Option<String>,
    pub destination_tx_hash: Option<String>,
    pub progress: u8,
    /// Minutes
    pub estimated_completion_time: u32,
    pub error_message: Option<String>,
}
