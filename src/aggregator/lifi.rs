//! LI.FI-compatible REST client
//!
//! Routes come from `POST /advanced/routes`, per-step transactions from
//! `POST /advanced/stepTransaction` and transfer status from `GET /status`.

use super::{
    AggregatorRoute, BridgeAggregator, ExecutionRecord, ExecutionSettings, ExecutionStage,
    ExecutionUpdate, ProgressCallback, RouteStep, RoutesRequest, StatusQuery, StatusResponse,
};
use crate::config::AggregatorConfig;
use crate::error::{BridgeError, BridgeResult};
use crate::tx::{build_approval, is_native_token, BridgeSigner};
use crate::types::BridgeRoute;

use async_trait::async_trait;
use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::types::{Address, Bytes, TransactionRequest, U256};
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT},
    Client,
};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Debug, Deserialize)]
struct RoutesResponse {
    #[serde(default)]
    routes: Vec<AggregatorRoute>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PreparedStep {
    transaction_request: Option<StepTransactionRequest>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StepTransactionRequest {
    to: Address,
    #[serde(default)]
    data: Option<Bytes>,
    #[serde(default)]
    value: Option<U256>,
    #[serde(default)]
    gas_limit: Option<U256>,
    #[serde(default)]
    gas_price: Option<U256>,
    #[serde(default)]
    chain_id: Option<u64>,
}

impl StepTransactionRequest {
    fn into_typed(self, default_chain: u64) -> TypedTransaction {
        let mut tx = TransactionRequest::new()
            .to(self.to)
            .chain_id(self.chain_id.unwrap_or(default_chain));
        if let Some(data) = self.data {
            tx = tx.data(data);
        }
        if let Some(value) = self.value {
            tx = tx.value(value);
        }
        if let Some(gas) = self.gas_limit {
            tx = tx.gas(gas);
        }
        if let Some(price) = self.gas_price {
            tx = tx.gas_price(price);
        }
        TypedTransaction::Legacy(tx)
    }
}

/// HTTP client for a LI.FI-compatible aggregation API
pub struct LifiClient {
    client: Client,
    base_url: String,
    integrator: Option<String>,
}

impl LifiClient {
    pub fn new(config: &AggregatorConfig) -> BridgeResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(key) = config.api_key.as_deref().filter(|k| !k.is_empty()) {
            let value = HeaderValue::from_str(key)
                .map_err(|e| BridgeError::Config(format!("Invalid aggregator API key: {}", e)))?;
            headers.insert("x-lifi-api-key", value);
        }

        let client = Client::builder()
            .default_headers(headers)
            .user_agent(concat!("portfolio-bridge/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| BridgeError::Config(format!("Failed to create HTTP client: {}", e)))?;

        debug!("Aggregator client initialized - Base URL: {}", config.base_url);

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            integrator: config.integrator.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Ask the provider to populate the transaction for one step
    async fn step_transaction(&self, step: &RouteStep) -> Result<PreparedStep, String> {
        let response = self
            .client
            .post(self.url("/advanced/stepTransaction"))
            .json(step)
            .send()
            .await
            .map_err(|e| format!("step transaction request failed: {}", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(format!("step transaction returned {}: {}", status, body));
        }

        response
            .json::<PreparedStep>()
            .await
            .map_err(|e| format!("failed to parse step transaction: {}", e))
    }
}

/// Write the user's slippage tolerance into the step action
fn with_slippage(step: &RouteStep, slippage: f64) -> RouteStep {
    let mut step = step.clone();
    if let Some(serde_json::Value::Object(action)) = step.action.as_mut() {
        action.insert("slippage".to_string(), serde_json::json!(slippage));
    }
    step
}

fn action_str<'a>(step: &'a RouteStep, pointer: &str) -> Option<&'a str> {
    step.action.as_ref()?.pointer(pointer)?.as_str()
}

fn action_chain(step: &RouteStep) -> Option<u64> {
    step.action.as_ref()?.get("fromChainId")?.as_u64()
}

/// Hashes already on-chain, if any step was broadcast
fn partial_record(step_hashes: &[String]) -> Option<ExecutionRecord> {
    step_hashes.first().map(|first| ExecutionRecord {
        transaction_hash: first.clone(),
        step_hashes: step_hashes.to_vec(),
    })
}

/// Nothing broadcast yet means the route was refused; afterwards the
/// transfer is in flight and the error carries its hashes
fn stage_error(step_hashes: &[String], message: String) -> BridgeError {
    match partial_record(step_hashes) {
        Some(partial) => BridgeError::ExecutionInterrupted { message, partial },
        None => BridgeError::ExecutionRejected(message),
    }
}

/// Attach broadcast hashes to any error raised after the first step went out
fn escalate(step_hashes: &[String], err: BridgeError) -> BridgeError {
    match partial_record(step_hashes) {
        Some(partial) => {
            let message = match err {
                BridgeError::ExecutionRejected(m) | BridgeError::ExecutionFailed(m) => m,
                other => other.to_string(),
            };
            BridgeError::ExecutionInterrupted { message, partial }
        }
        None => err,
    }
}

#[async_trait]
impl BridgeAggregator for LifiClient {
    async fn discover_routes(&self, request: &RoutesRequest) -> BridgeResult<Vec<AggregatorRoute>> {
        let mut body = serde_json::to_value(request)
            .map_err(|e| BridgeError::Internal(e.to_string()))?;
        if let Some(integrator) = &self.integrator {
            body["options"]["integrator"] = serde_json::json!(integrator);
        }

        debug!(
            "Requesting routes {} -> {} for {}",
            request.from_chain_id, request.to_chain_id, request.from_amount
        );

        let response = self
            .client
            .post(self.url("/advanced/routes"))
            .json(&body)
            .send()
            .await
            .map_err(|e| BridgeError::upstream("discover routes", e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(BridgeError::upstream(
                "discover routes",
                format!("API returned error status {}: {}", status, body),
            ));
        }

        let parsed = response
            .json::<RoutesResponse>()
            .await
            .map_err(|e| {
                BridgeError::upstream("discover routes", format!("Failed to parse response: {}", e))
            })?;

        debug!("Aggregator returned {} routes", parsed.routes.len());
        Ok(parsed.routes)
    }

    async fn execute_route(
        &self,
        signer: Arc<dyn BridgeSigner>,
        route: &BridgeRoute,
        settings: &ExecutionSettings,
        on_update: ProgressCallback,
    ) -> BridgeResult<ExecutionRecord> {
        let step_count = route.steps.len();
        if step_count == 0 {
            return Err(BridgeError::ExecutionRejected(format!(
                "Route {} has no executable steps",
                route.id
            )));
        }

        let signer_chain = signer.chain_id().await?;
        let mut step_hashes: Vec<String> = Vec::with_capacity(step_count);

        for (index, original) in route.steps.iter().enumerate() {
            if chrono::Utc::now().timestamp_millis() >= settings.deadline {
                return Err(stage_error(
                    &step_hashes,
                    format!("Deadline passed before step {}/{}", index + 1, step_count),
                ));
            }

            let step_chain = action_chain(original).unwrap_or(route.from_chain);
            if step_chain != signer_chain {
                return Err(stage_error(
                    &step_hashes,
                    format!(
                        "Step {} runs on chain {} but signer is on chain {}",
                        index + 1,
                        step_chain,
                        signer_chain
                    ),
                ));
            }

            let step = with_slippage(original, settings.slippage);

            let approval_target = step
                .estimate
                .as_ref()
                .and_then(|e| e.approval_address.clone());
            let from_token = action_str(&step, "/fromToken/address")
                .unwrap_or(route.from_token.as_str())
                .to_string();
            if let Some(spender) = approval_target {
                if !is_native_token(&from_token) {
                    let amount = action_str(&step, "/fromAmount")
                        .unwrap_or(route.from_amount.as_str());
                    let approval = build_approval(&from_token, &spender, amount, step_chain)
                        .map_err(|e| escalate(&step_hashes, e))?;
                    let hash = signer
                        .send_transaction(approval)
                        .await
                        .map_err(|e| escalate(&step_hashes, e))?;
                    on_update(ExecutionUpdate {
                        step_index: index,
                        step_count,
                        stage: ExecutionStage::ApprovalConfirmed,
                        chain_id: step_chain,
                        tx_hash: Some(format!("{:?}", hash)),
                    });
                }
            }

            let prepared = self
                .step_transaction(&step)
                .await
                .map_err(|message| stage_error(&step_hashes, message))?;
            let request = prepared.transaction_request.ok_or_else(|| {
                stage_error(
                    &step_hashes,
                    format!("Provider returned no transaction for step {}", index + 1),
                )
            })?;

            let tx_hash = signer
                .send_transaction(request.into_typed(step_chain))
                .await
                .map(|hash| format!("{:?}", hash))
                .map_err(|e| escalate(&step_hashes, e))?;

            info!(
                "Route {} step {}/{} confirmed on chain {}: {}",
                route.id,
                index + 1,
                step_count,
                step_chain,
                tx_hash
            );

            on_update(ExecutionUpdate {
                step_index: index,
                step_count,
                stage: ExecutionStage::StepConfirmed,
                chain_id: step_chain,
                tx_hash: Some(tx_hash.clone()),
            });
            step_hashes.push(tx_hash);
        }

        Ok(ExecutionRecord {
            transaction_hash: step_hashes[0].clone(),
            step_hashes,
        })
    }

    async fn query_status(&self, query: &StatusQuery) -> BridgeResult<StatusResponse> {
        let tracking_error = |message: String| BridgeError::Tracking {
            tx_hash: query.tx_hash.clone(),
            message,
        };

        let response = self
            .client
            .get(self.url("/status"))
            .query(query)
            .send()
            .await
            .map_err(|e| tracking_error(format!("status request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!("Status query for {} returned {}", query.tx_hash, status);
            return Err(tracking_error(format!(
                "API returned error status {}: {}",
                status, body
            )));
        }

        response
            .json::<StatusResponse>()
            .await
            .map_err(|e| tracking_error(format!("Failed to parse status: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::RouteOptions;
    use crate::tx::MockBridgeSigner;
    use ethers::types::H256;
    use std::sync::Mutex;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> LifiClient {
        LifiClient::new(&AggregatorConfig {
            base_url: server.uri(),
            api_key: Some("test-key".to_string()),
            integrator: Some("portfolio".to_string()),
            timeout_secs: 5,
        })
        .expect("client creation")
    }

    fn routes_request() -> RoutesRequest {
        RoutesRequest {
            from_chain_id: 1,
            to_chain_id: 137,
            from_token_address: "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48".to_string(),
            to_token_address: "0x3c499c542cEF5E3811e1192ce70d8cC03d5c3359".to_string(),
            from_amount: "1000".to_string(),
            from_address: "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed".to_string(),
            to_address: "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed".to_string(),
            options: RouteOptions {
                slippage: 0.005,
                max_price_impact: 0.4,
                allow_switch_chain: false,
            },
        }
    }

    fn erc20_route(approval: Option<&str>) -> BridgeRoute {
        let mut estimate = serde_json::json!({ "executionDuration": 120 });
        if let Some(addr) = approval {
            estimate["approvalAddress"] = serde_json::json!(addr);
        }
        let step: RouteStep = serde_json::from_value(serde_json::json!({
            "id": "step-1",
            "tool": "stargate",
            "action": {
                "fromChainId": 1,
                "fromAmount": "1000",
                "fromToken": { "address": "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48" }
            },
            "estimate": estimate
        }))
        .unwrap();

        BridgeRoute {
            id: "route-1".to_string(),
            from_chain: 1,
            to_chain: 137,
            from_token: "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48".to_string(),
            to_token: "0x3c499c542cEF5E3811e1192ce70d8cC03d5c3359".to_string(),
            from_amount: "1000".to_string(),
            to_amount: "995".to_string(),
            min_received: "990".to_string(),
            estimated_time: 2,
            fee: "1.5".to_string(),
            gas_estimate: "0".to_string(),
            provider: "stargate".to_string(),
            steps: vec![step],
        }
    }

    fn settings() -> ExecutionSettings {
        ExecutionSettings {
            slippage: 0.01,
            deadline: chrono::Utc::now().timestamp_millis() + 600_000,
        }
    }

    async fn mount_step_transaction(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/advanced/stepTransaction"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "step-1",
                "transactionRequest": {
                    "to": "0x1231DEB6f5749EF6cE6943a275A1D3E7486F4EaE",
                    "data": "0xdeadbeef",
                    "value": "0x0",
                    "gasLimit": "0x30d40",
                    "gasPrice": "0x3b9aca00",
                    "chainId": 1
                }
            })))
            .expect(1)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn discover_routes_posts_request_with_api_key() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/advanced/routes"))
            .and(header("x-lifi-api-key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "routes": [{
                    "id": "r1",
                    "fromChainId": 1,
                    "toChainId": 137,
                    "fromAmount": "1000",
                    "toAmount": "990",
                    "gasCostUSD": "2.10",
                    "steps": [{ "id": "s1", "tool": "hop", "estimate": { "executionDuration": 90 } }]
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let routes = client_for(&server)
            .discover_routes(&routes_request())
            .await
            .unwrap();

        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].gas_cost_usd.as_deref(), Some("2.10"));
        assert_eq!(routes[0].steps[0].tool.as_deref(), Some("hop"));
    }

    #[tokio::test]
    async fn discover_routes_maps_server_error_to_upstream() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/advanced/routes"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .expect(1)
            .mount(&server)
            .await;

        let err = client_for(&server)
            .discover_routes(&routes_request())
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::Upstream { .. }));
        assert!(err.to_string().contains("maintenance"));
    }

    #[tokio::test]
    async fn discover_routes_maps_malformed_body_to_upstream() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/advanced/routes"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .discover_routes(&routes_request())
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::Upstream { .. }));
    }

    #[tokio::test]
    async fn query_status_sends_bridge_and_hash() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/status"))
            .and(query_param("bridge", "stargate"))
            .and(query_param("txHash", "0xabc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "DONE",
                "substatus": "COMPLETED",
                "sending": { "txHash": "0xabc", "chainId": 1 },
                "receiving": { "txHash": "0xdef", "chainId": 137 }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let status = client_for(&server)
            .query_status(&StatusQuery {
                bridge: Some("stargate".to_string()),
                tx_hash: "0xabc".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(status.status, "DONE");
        assert_eq!(status.receiving.unwrap().tx_hash.as_deref(), Some("0xdef"));
    }

    #[tokio::test]
    async fn query_status_failure_is_tracking_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/status"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .query_status(&StatusQuery {
                bridge: None,
                tx_hash: "0xabc".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::Tracking { .. }));
    }

    #[tokio::test]
    async fn execute_route_approves_then_sends_step() {
        let server = MockServer::start().await;
        mount_step_transaction(&server).await;

        let mut signer = MockBridgeSigner::new();
        signer.expect_chain_id().times(1).returning(|| Ok(1));
        let mut calls = 0u8;
        signer.expect_send_transaction().times(2).returning(move |_| {
            calls += 1;
            Ok(H256::repeat_byte(calls))
        });

        let updates = Arc::new(Mutex::new(Vec::new()));
        let sink = updates.clone();
        let on_update: ProgressCallback = Arc::new(move |u: ExecutionUpdate| sink.lock().unwrap().push(u));

        let record = client_for(&server)
            .execute_route(
                Arc::new(signer),
                &erc20_route(Some("0x1231DEB6f5749EF6cE6943a275A1D3E7486F4EaE")),
                &settings(),
                on_update,
            )
            .await
            .unwrap();

        assert_eq!(record.transaction_hash, format!("{:?}", H256::repeat_byte(2)));
        assert_eq!(record.step_hashes.len(), 1);

        let updates = updates.lock().unwrap();
        assert_eq!(updates.len(), 2);
        assert_eq!(updates[0].stage, ExecutionStage::ApprovalConfirmed);
        assert_eq!(updates[1].stage, ExecutionStage::StepConfirmed);
    }

    #[tokio::test]
    async fn execute_route_refuses_wrong_signer_chain() {
        let server = MockServer::start().await;

        let mut signer = MockBridgeSigner::new();
        signer.expect_chain_id().returning(|| Ok(137));
        signer.expect_send_transaction().never();

        let err = client_for(&server)
            .execute_route(
                Arc::new(signer),
                &erc20_route(None),
                &settings(),
                Arc::new(|_: ExecutionUpdate| {}),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::ExecutionRejected(_)));
    }

    #[tokio::test]
    async fn execute_route_surfaces_revert_without_retry() {
        let server = MockServer::start().await;
        mount_step_transaction(&server).await;

        let mut signer = MockBridgeSigner::new();
        signer.expect_chain_id().returning(|| Ok(1));
        signer
            .expect_send_transaction()
            .times(1)
            .returning(|_| Err(BridgeError::ExecutionFailed("reverted".to_string())));

        let err = client_for(&server)
            .execute_route(
                Arc::new(signer),
                &erc20_route(None),
                &settings(),
                Arc::new(|_: ExecutionUpdate| {}),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::ExecutionFailed(_)));
    }

    fn two_step_route() -> BridgeRoute {
        let mut route = erc20_route(None);
        let second: RouteStep = serde_json::from_value(serde_json::json!({
            "id": "step-2",
            "tool": "uniswap",
            "action": { "fromChainId": 1, "fromAmount": "995" },
            "estimate": { "executionDuration": 30 }
        }))
        .unwrap();
        route.steps.push(second);
        route
    }

    async fn mount_step(server: &MockServer, step_id: &str, response: ResponseTemplate, calls: u64) {
        Mock::given(method("POST"))
            .and(path("/advanced/stepTransaction"))
            .and(body_partial_json(serde_json::json!({ "id": step_id })))
            .respond_with(response)
            .expect(calls)
            .mount(server)
            .await;
    }

    fn prepared(step_id: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": step_id,
            "transactionRequest": {
                "to": "0x1231DEB6f5749EF6cE6943a275A1D3E7486F4EaE",
                "data": "0xdeadbeef",
                "value": "0x0",
                "chainId": 1
            }
        }))
    }

    #[tokio::test]
    async fn execute_route_keeps_source_hash_when_second_step_fails() {
        let server = MockServer::start().await;
        mount_step(&server, "step-1", prepared("step-1"), 1).await;
        mount_step(&server, "step-2", ResponseTemplate::new(500), 1).await;

        let mut signer = MockBridgeSigner::new();
        signer.expect_chain_id().returning(|| Ok(1));
        signer
            .expect_send_transaction()
            .times(1)
            .returning(|_| Ok(H256::repeat_byte(7)));

        let err = client_for(&server)
            .execute_route(
                Arc::new(signer),
                &two_step_route(),
                &settings(),
                Arc::new(|_: ExecutionUpdate| {}),
            )
            .await
            .unwrap_err();

        let source = format!("{:?}", H256::repeat_byte(7));
        match &err {
            BridgeError::ExecutionInterrupted { message, partial } => {
                assert!(message.contains("500"));
                assert_eq!(partial.transaction_hash, source);
                assert_eq!(partial.step_hashes, vec![source.clone()]);
            }
            other => panic!("expected interrupted execution, got {:?}", other),
        }
        assert_eq!(err.source_tx_hash(), Some(source.as_str()));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn execute_route_deadline_between_steps_keeps_source_hash() {
        let server = MockServer::start().await;
        mount_step(&server, "step-1", prepared("step-1"), 1).await;
        mount_step(&server, "step-2", prepared("step-2"), 0).await;

        let mut signer = MockBridgeSigner::new();
        signer.expect_chain_id().returning(|| Ok(1));
        signer.expect_send_transaction().times(1).returning(|_| {
            // Confirmation outlasts the deadline
            std::thread::sleep(std::time::Duration::from_millis(300));
            Ok(H256::repeat_byte(7))
        });

        let settings = ExecutionSettings {
            slippage: 0.01,
            deadline: chrono::Utc::now().timestamp_millis() + 150,
        };
        let err = client_for(&server)
            .execute_route(
                Arc::new(signer),
                &two_step_route(),
                &settings,
                Arc::new(|_: ExecutionUpdate| {}),
            )
            .await
            .unwrap_err();

        match err {
            BridgeError::ExecutionInterrupted { message, partial } => {
                assert!(message.contains("Deadline passed before step 2/2"));
                assert_eq!(partial.transaction_hash, format!("{:?}", H256::repeat_byte(7)));
            }
            other => panic!("expected interrupted execution, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn execute_route_rejection_after_broadcast_is_interrupted() {
        let server = MockServer::start().await;
        mount_step(&server, "step-1", prepared("step-1"), 1).await;
        mount_step(&server, "step-2", prepared("step-2"), 1).await;

        let mut signer = MockBridgeSigner::new();
        signer.expect_chain_id().returning(|| Ok(1));
        let mut seq = mockall::Sequence::new();
        signer
            .expect_send_transaction()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(H256::repeat_byte(7)));
        signer
            .expect_send_transaction()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(BridgeError::ExecutionRejected("insufficient funds".to_string())));

        let err = client_for(&server)
            .execute_route(
                Arc::new(signer),
                &two_step_route(),
                &settings(),
                Arc::new(|_: ExecutionUpdate| {}),
            )
            .await
            .unwrap_err();

        match err {
            BridgeError::ExecutionInterrupted { message, partial } => {
                assert_eq!(message, "insufficient funds");
                assert_eq!(partial.transaction_hash, format!("{:?}", H256::repeat_byte(7)));
            }
            other => panic!("expected interrupted execution, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn execute_route_returns_every_step_hash() {
        let server = MockServer::start().await;
        mount_step(&server, "step-1", prepared("step-1"), 1).await;
        mount_step(&server, "step-2", prepared("step-2"), 1).await;

        let mut signer = MockBridgeSigner::new();
        signer.expect_chain_id().returning(|| Ok(1));
        let mut calls = 0u8;
        signer.expect_send_transaction().times(2).returning(move |_| {
            calls += 1;
            Ok(H256::repeat_byte(calls))
        });

        let record = client_for(&server)
            .execute_route(
                Arc::new(signer),
                &two_step_route(),
                &settings(),
                Arc::new(|_: ExecutionUpdate| {}),
            )
            .await
            .unwrap();

        assert_eq!(record.transaction_hash, format!("{:?}", H256::repeat_byte(1)));
        assert_eq!(
            record.step_hashes,
            vec![
                format!("{:?}", H256::repeat_byte(1)),
                format!("{:?}", H256::repeat_byte(2))
            ]
        );
    }

    #[test]
    fn test_slippage_written_into_action() {
        let route = erc20_route(None);
        let step = with_slippage(&route.steps[0], 0.02);
        assert_eq!(
            step.action.unwrap()["slippage"].as_f64(),
            Some(0.02)
        );
    }
}
