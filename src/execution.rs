//! Execution orchestration
//!
//! Checks the signer and execution settings, then hands the route to the
//! aggregation provider. Nothing here is retried: a failed execution sends the
//! caller back to quoting.

use crate::aggregator::{
    BridgeAggregator, ExecutionSettings, ExecutionStage, ExecutionUpdate, ProgressCallback,
};
use crate::error::{BridgeError, BridgeResult};
use crate::tx::BridgeSigner;
use crate::types::BridgeRoute;

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

/// Caller-chosen execution settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteOptions {
    /// Fraction, e.g. 0.005 for 0.5%
    pub slippage_tolerance: f64,
    /// Epoch milliseconds
    pub deadline: i64,
}

pub struct ExecutionOrchestrator {
    aggregator: Arc<dyn BridgeAggregator>,
}

impl ExecutionOrchestrator {
    pub fn new(aggregator: Arc<dyn BridgeAggregator>) -> Self {
        Self { aggregator }
    }

    /// Execute a route and return the source-chain transaction hash
    pub async fn execute(
        &self,
        route: &BridgeRoute,
        options: &ExecuteOptions,
        signer: Option<Arc<dyn BridgeSigner>>,
    ) -> BridgeResult<String> {
        self.execute_at(route, options, signer, chrono::Utc::now().timestamp_millis())
            .await
    }

    pub async fn execute_at(
        &self,
        route: &BridgeRoute,
        options: &ExecuteOptions,
        signer: Option<Arc<dyn BridgeSigner>>,
        now_ms: i64,
    ) -> BridgeResult<String> {
        let result = self.try_execute(route, options, signer, now_ms).await;

        match &result {
            Ok(tx_hash) => {
                info!(
                    "Bridge {} -> {} via {} submitted: {}",
                    route.from_chain, route.to_chain, route.provider, tx_hash
                );
                crate::metrics::record_execution_submitted(route.from_chain);
            }
            Err(e) => {
                error!(
                    "Bridge {} -> {} via {} failed: {}",
                    route.from_chain, route.to_chain, route.provider, e
                );
                crate::metrics::record_execution_failed(route.from_chain, e);
            }
        }

        result
    }

    async fn try_execute(
        &self,
        route: &BridgeRoute,
        options: &ExecuteOptions,
        signer: Option<Arc<dyn BridgeSigner>>,
        now_ms: i64,
    ) -> BridgeResult<String> {
        let signer = signer
            .ok_or_else(|| BridgeError::SignerUnavailable("no active signer".to_string()))?;

        let signer_chain = signer
            .chain_id()
            .await
            .map_err(|e| BridgeError::SignerUnavailable(e.to_string()))?;
        if signer_chain != route.from_chain {
            return Err(BridgeError::SignerUnavailable(format!(
                "signer is on chain {}, route starts on chain {}",
                signer_chain, route.from_chain
            )));
        }

        if options.deadline <= now_ms {
            return Err(BridgeError::ExecutionRejected(
                "deadline has passed".to_string(),
            ));
        }
        if !(options.slippage_tolerance > 0.0 && options.slippage_tolerance < 1.0) {
            return Err(BridgeError::ExecutionRejected(format!(
                "slippage tolerance {} outside (0, 1)",
                options.slippage_tolerance
            )));
        }

        let settings = ExecutionSettings {
            slippage: options.slippage_tolerance,
            deadline: options.deadline,
        };

        let route_id = route.id.clone();
        let on_update: ProgressCallback = Arc::new(move |update: ExecutionUpdate| {
            let stage = match update.stage {
                ExecutionStage::ApprovalConfirmed => "approval",
                ExecutionStage::StepConfirmed => "step",
            };
            info!(
                "Route {} step {}/{} {} confirmed on chain {}: {}",
                route_id,
                update.step_index + 1,
                update.step_count,
                stage,
                update.chain_id,
                update.tx_hash.as_deref().unwrap_or("-")
            );
            crate::metrics::record_execution_step(update.chain_id, stage);
        });

        let record = self
            .aggregator
            .execute_route(signer, route, &settings, on_update)
            .await?;

        Ok(record.transaction_hash)
    }
}
