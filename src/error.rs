//! Error types for the bridge core

use crate::aggregator::ExecutionRecord;

use thiserror::Error;

/// User-correctable problems with a transfer request
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("same chain: source and destination must differ")]
    SameChain,

    #[error("unsupported chain {0}")]
    UnsupportedChain(u64),

    #[error("token required")]
    TokenRequired,

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("invalid recipient: {0}")]
    InvalidRecipient(String),

    #[error("deadline expired")]
    DeadlineExpired,
}

/// Main error type for the bridge core
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("No routes found from chain {from_chain} to chain {to_chain}: try a different pair or amount")]
    NoRoutesFound { from_chain: u64, to_chain: u64 },

    #[error("Upstream error during {operation}: {message}")]
    Upstream { operation: String, message: String },

    #[error("Cannot select from an empty quote set")]
    EmptyQuoteSet,

    #[error("Signer unavailable: {0}")]
    SignerUnavailable(String),

    #[error("Execution rejected: {0}")]
    ExecutionRejected(String),

    #[error("Execution failed: {0}")]
    ExecutionFailed(String),

    /// Failed after at least one step went on-chain; `partial` identifies the
    /// transfer so it can still be tracked
    #[error("Execution interrupted after source transaction {}: {message}", .partial.transaction_hash)]
    ExecutionInterrupted {
        message: String,
        partial: ExecutionRecord,
    },

    #[error("Status tracking failed for {tx_hash}: {message}")]
    Tracking { tx_hash: String, message: String },

    #[error("Invalid state transition from {from} to {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Chain {chain_id} not found")]
    ChainNotFound { chain_id: u64 },

    #[error("Transaction {tx_id} not found")]
    TransactionNotFound { tx_id: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl BridgeError {
    pub fn upstream(operation: &str, message: impl Into<String>) -> Self {
        BridgeError::Upstream {
            operation: operation.to_string(),
            message: message.into(),
        }
    }

    /// Whether the caller may retry the same call.
    ///
    /// Execution errors are never retryable: a retry risks a duplicate transfer,
    /// so the caller has to restart from quoting.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            BridgeError::Upstream { .. } | BridgeError::Tracking { .. }
        )
    }

    /// Source-chain hash of a transfer that is already on-chain
    pub fn source_tx_hash(&self) -> Option<&str> {
        match self {
            BridgeError::ExecutionInterrupted { partial, .. } => {
                Some(partial.transaction_hash.as_str())
            }
            _ => None,
        }
    }

    /// Check if the user can fix this by changing the request
    pub fn is_user_correctable(&self) -> bool {
        matches!(
            self,
            BridgeError::Validation(_) | BridgeError::NoRoutesFound { .. }
        )
    }
}

/// Result type for bridge operations
pub type BridgeResult<T> = Result<T, BridgeError>;
