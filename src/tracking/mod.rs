//! Status tracking
//!
//! Maps provider-reported execution status onto the canonical
//! `pending -> processing -> {completed, failed, refunded}` state machine.
//! Every call is a stateless snapshot; polling cadence belongs to the caller.

pub mod transaction;

pub use transaction::{interpolate_progress, BridgeTransaction, MAX_IN_FLIGHT_PROGRESS};

use crate::aggregator::{BridgeAggregator, StatusQuery, StatusResponse};
use crate::error::{BridgeError, BridgeResult};
use crate::quote::{estimate_bridge_time, DEFAULT_BRIDGE_MINUTES};
use crate::types::{BridgeStatus, BridgeStatusResponse};

use std::sync::Arc;
use tracing::{debug, warn};

const GENERIC_FAILURE: &str = "bridge transfer failed";

/// Fetches status snapshots from the aggregation provider
pub struct StatusTracker {
    aggregator: Arc<dyn BridgeAggregator>,
}

impl StatusTracker {
    pub fn new(aggregator: Arc<dyn BridgeAggregator>) -> Self {
        Self { aggregator }
    }

    /// Current status of a submitted transfer
    pub async fn track_status(
        &self,
        tx_hash: &str,
        bridge: Option<&str>,
    ) -> BridgeResult<BridgeStatusResponse> {
        let query = StatusQuery {
            bridge: bridge.map(str::to_string),
            tx_hash: tx_hash.to_string(),
        };

        let response = self.aggregator.query_status(&query).await.map_err(|e| {
            warn!("Status query for {} failed: {}", tx_hash, e);
            crate::metrics::record_upstream_error("query_status");
            match e {
                BridgeError::Tracking { .. } => e,
                other => BridgeError::Tracking {
                    tx_hash: tx_hash.to_string(),
                    message: other.to_string(),
                },
            }
        })?;

        let snapshot = map_status(&response);
        debug!(
            "Status for {}: {} ({}) -> {}",
            tx_hash,
            response.status,
            response.substatus.as_deref().unwrap_or("-"),
            snapshot.status
        );
        crate::metrics::record_status_snapshot(snapshot.status);

        Ok(snapshot)
    }
}

/// Canonical snapshot for a provider status payload
pub fn map_status(response: &StatusResponse) -> BridgeStatusResponse {
    let substatus = response.substatus.as_deref().unwrap_or_default();

    let (status, progress) = match response.status.to_ascii_uppercase().as_str() {
        "DONE" if substatus.eq_ignore_ascii_case("REFUNDED") => (BridgeStatus::Refunded, 100),
        "DONE" => (BridgeStatus::Completed, 100),
        "FAILED" => (BridgeStatus::Failed, 0),
        "PENDING" => (BridgeStatus::Pending, 0),
        _ => (BridgeStatus::Processing, 50),
    };

    let error_message = (status == BridgeStatus::Failed).then(|| {
        response
            .substatus_message
            .clone()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| GENERIC_FAILURE.to_string())
    });

    let sending_chain = response.sending.as_ref().and_then(|leg| leg.chain_id);
    let receiving_chain = response.receiving.as_ref().and_then(|leg| leg.chain_id);
    let estimated_completion_time = match (sending_chain, receiving_chain) {
        (Some(from), Some(to)) => estimate_bridge_time(from, to),
        _ => DEFAULT_BRIDGE_MINUTES,
    };

    BridgeStatusResponse {
        status,
        source_tx_hash: response.sending.as_ref().and_then(|leg| leg.tx_hash.clone()),
        destination_tx_hash: response.receiving.as_ref().and_then(|leg| leg.tx_hash.clone()),
        progress,
        estimated_completion_time,
        error_message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::{MockBridgeAggregator, TransferLeg};

    fn response(status: &str, substatus: Option<&str>) -> StatusResponse {
        StatusResponse {
            status: status.to_string(),
            substatus: substatus.map(str::to_string),
            substatus_message: None,
            sending: Some(TransferLeg {
                tx_hash: Some("0xsrc".to_string()),
                chain_id: Some(1),
            }),
            receiving: Some(TransferLeg {
                tx_hash: Some("0xdst".to_string()),
                chain_id: Some(137),
            }),
        }
    }

    #[test]
    fn test_status_mapping() {
        let done = map_status(&response("DONE", Some("COMPLETED")));
        assert_eq!(done.status, BridgeStatus::Completed);
        assert_eq!(done.progress, 100);
        assert_eq!(done.source_tx_hash.as_deref(), Some("0xsrc"));
        assert_eq!(done.destination_tx_hash.as_deref(), Some("0xdst"));
        assert!(done.error_message.is_none());

        let pending = map_status(&response("PENDING", None));
        assert_eq!(pending.status, BridgeStatus::Pending);
        assert_eq!(pending.progress, 0);

        for other in ["NOT_FOUND", "INVALID", "SOMETHING_NEW"] {
            let mapped = map_status(&response(other, None));
            assert_eq!(mapped.status, BridgeStatus::Processing);
            assert_eq!(mapped.progress, 50);
        }
    }

    #[test]
    fn test_refund_and_failure_mapping() {
        let refunded = map_status(&response("DONE", Some("REFUNDED")));
        assert_eq!(refunded.status, BridgeStatus::Refunded);
        assert_eq!(refunded.progress, 100);

        let failed = map_status(&response("FAILED", None));
        assert_eq!(failed.status, BridgeStatus::Failed);
        assert_eq!(failed.progress, 0);
        assert_eq!(failed.error_message.as_deref(), Some("bridge transfer failed"));

        let mut with_message = response("FAILED", Some("UNKNOWN_ERROR"));
        with_message.substatus_message = Some("slippage exceeded".to_string());
        assert_eq!(
            map_status(&with_message).error_message.as_deref(),
            Some("slippage exceeded")
        );
    }

    #[test]
    fn test_completion_estimate_from_legs() {
        assert_eq!(map_status(&response("PENDING", None)).estimated_completion_time, 20);

        let mut no_legs = response("PENDING", None);
        no_legs.sending = None;
        no_legs.receiving = None;
        let mapped = map_status(&no_legs);
        assert_eq!(mapped.estimated_completion_time, DEFAULT_BRIDGE_MINUTES);
        assert!(mapped.source_tx_hash.is_none());
    }

    #[tokio::test]
    async fn test_track_status_passes_bridge_name() {
        let mut mock = MockBridgeAggregator::new();
        mock.expect_query_status()
            .times(1)
            .withf(|q| q.tx_hash == "0xsrc" && q.bridge.as_deref() == Some("stargate"))
            .returning(|_| Ok(response("DONE", None)));

        let tracker = StatusTracker::new(Arc::new(mock));
        let snapshot = tracker.track_status("0xsrc", Some("stargate")).await.unwrap();
        assert_eq!(snapshot.status, BridgeStatus::Completed);
    }

    #[tokio::test]
    async fn test_upstream_failure_becomes_tracking_error() {
        let mut mock = MockBridgeAggregator::new();
        mock.expect_query_status()
            .times(1)
            .returning(|_| Err(BridgeError::upstream("query status", "503")));

        let tracker = StatusTracker::new(Arc::new(mock));
        let err = tracker.track_status("0xsrc", None).await.unwrap_err();
        assert!(matches!(err, BridgeError::Tracking { ref tx_hash, .. } if tx_hash == "0xsrc"));
        assert!(err.is_retryable());
    }
}
