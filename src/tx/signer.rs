//! Signer abstraction and a local-wallet implementation

use crate::chain::NetworkConfig;
use crate::error::{BridgeError, BridgeResult};

use async_trait::async_trait;
use ethers::prelude::*;
use ethers::types::transaction::eip2718::TypedTransaction;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Signing capability bound to a single chain
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BridgeSigner: Send + Sync {
    /// Address transactions are sent from
    fn address(&self) -> Address;

    /// Chain the signer is currently connected to
    async fn chain_id(&self) -> BridgeResult<u64>;

    /// Sign, broadcast and wait for the receipt; returns the transaction hash
    async fn send_transaction(&self, tx: TypedTransaction) -> BridgeResult<H256>;
}

/// Signer backed by a local private key and an HTTP provider
pub struct WalletSigner {
    chain_id: u64,
    client: SignerMiddleware<Provider<Http>, LocalWallet>,
    send_timeout: Duration,
}

impl WalletSigner {
    /// Create a signer for `network` from a hex private key
    pub fn new(network: &NetworkConfig, private_key: &str) -> BridgeResult<Self> {
        let wallet = private_key
            .trim()
            .parse::<LocalWallet>()
            .map_err(|e| BridgeError::SignerUnavailable(format!("Invalid private key: {}", e)))?
            .with_chain_id(network.chain_id);

        let provider = Provider::<Http>::try_from(network.rpc_url.as_str())
            .map_err(|e| {
                BridgeError::Config(format!("Invalid RPC URL for chain {}: {}", network.chain_id, e))
            })?
            .interval(Duration::from_millis(500));

        info!(
            "Wallet signer {:?} bound to chain {} ({})",
            wallet.address(),
            network.chain_id,
            network.name
        );

        Ok(Self {
            chain_id: network.chain_id,
            client: SignerMiddleware::new(provider, wallet),
            send_timeout: Duration::from_secs(30),
        })
    }

    /// Load the private key from an environment variable
    pub fn from_env(network: &NetworkConfig, var_name: &str) -> BridgeResult<Self> {
        let key = std::env::var(var_name).map_err(|_| {
            BridgeError::SignerUnavailable(format!("No wallet configured. Set {}", var_name))
        })?;
        Self::new(network, &key)
    }

    pub fn bound_chain(&self) -> u64 {
        self.chain_id
    }
}

#[async_trait]
impl BridgeSigner for WalletSigner {
    fn address(&self) -> Address {
        self.client.address()
    }

    async fn chain_id(&self) -> BridgeResult<u64> {
        self.client
            .get_chainid()
            .await
            .map(|id| id.as_u64())
            .map_err(|e| BridgeError::SignerUnavailable(format!("RPC unreachable: {}", e)))
    }

    async fn send_transaction(&self, tx: TypedTransaction) -> BridgeResult<H256> {
        let pending = match timeout(self.send_timeout, self.client.send_transaction(tx, None)).await {
            Ok(Ok(pending)) => pending,
            Ok(Err(e)) => return Err(classify_send_error(&e.to_string())),
            Err(_) => {
                return Err(BridgeError::ExecutionFailed(
                    "Timed out broadcasting transaction".to_string(),
                ))
            }
        };

        let tx_hash = pending.tx_hash();
        debug!("Transaction {:?} broadcast on chain {}", tx_hash, self.chain_id);

        match pending.await {
            Ok(Some(receipt)) if receipt.status == Some(U64::from(1)) => Ok(tx_hash),
            Ok(Some(_)) => {
                warn!("Transaction {:?} reverted on chain {}", tx_hash, self.chain_id);
                Err(BridgeError::ExecutionFailed(format!(
                    "Transaction {:?} reverted",
                    tx_hash
                )))
            }
            Ok(None) => Err(BridgeError::ExecutionFailed(format!(
                "Transaction {:?} dropped from mempool",
                tx_hash
            ))),
            Err(e) => Err(BridgeError::ExecutionFailed(format!(
                "Lost track of transaction {:?}: {}",
                tx_hash, e
            ))),
        }
    }
}

/// Refusals before broadcast are rejections; everything else is a failure
fn classify_send_error(message: &str) -> BridgeError {
    let lower = message.to_lowercase();
    let rejected = [
        "user rejected",
        "user denied",
        "insufficient funds",
        "nonce too low",
        "replacement transaction underpriced",
        "exceeds block gas limit",
    ];

    if rejected.iter().any(|needle| lower.contains(needle)) {
        BridgeError::ExecutionRejected(message.to_string())
    } else {
        BridgeError::ExecutionFailed(message.to_string())
    }
}
