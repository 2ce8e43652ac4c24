//! Pre-quote validation of cross-chain transfer requests
//!
//! Checks run in a fixed order and stop at the first failure:
//! 1. source and destination chains differ
//! 2. both chains are in the registry
//! 3. both tokens are present
//! 4. amount is a positive integer in base units
//! 5. recipient is a well-formed address
//! 6. deadline lies in the future

use crate::chain::ChainRegistry;
use crate::error::ValidationError;
use crate::types::CrossChainRequest;

use ethers::types::{Address, U256};
use ethers::utils::to_checksum;
use std::str::FromStr;

/// Validator bound to a chain registry
pub struct RequestValidator<'a> {
    registry: &'a ChainRegistry,
}

impl<'a> RequestValidator<'a> {
    pub fn new(registry: &'a ChainRegistry) -> Self {
        Self { registry }
    }

    /// Validate against the wall clock
    pub fn validate(&self, request: &CrossChainRequest) -> Result<(), ValidationError> {
        self.validate_at(request, chrono::Utc::now().timestamp_millis())
    }

    /// Validate against an explicit `now` in epoch milliseconds
    pub fn validate_at(
        &self,
        request: &CrossChainRequest,
        now_ms: i64,
    ) -> Result<(), ValidationError> {
        if request.source_chain == request.destination_chain {
            return Err(ValidationError::SameChain);
        }

        for chain_id in [request.source_chain, request.destination_chain] {
            if !self.registry.is_supported(chain_id) {
                return Err(ValidationError::UnsupportedChain(chain_id));
            }
        }

        if request.source_token.trim().is_empty() || request.destination_token.trim().is_empty() {
            return Err(ValidationError::TokenRequired);
        }

        validate_amount(&request.amount)?;

        if !is_valid_address(&request.recipient) {
            return Err(ValidationError::InvalidRecipient(request.recipient.clone()));
        }

        if request.deadline <= now_ms {
            return Err(ValidationError::DeadlineExpired);
        }

        Ok(())
    }
}

/// Amounts are base-unit integers (wei for 18-decimal tokens)
fn validate_amount(amount: &str) -> Result<(), ValidationError> {
    match U256::from_dec_str(amount.trim()) {
        Ok(value) if !value.is_zero() => Ok(()),
        _ => Err(ValidationError::InvalidAmount(amount.to_string())),
    }
}

/// `0x` + 40 hex digits; mixed-case input must carry a valid EIP-55 checksum
pub fn is_valid_address(address: &str) -> bool {
    if !address.starts_with("0x") || address.len() != 42 {
        return false;
    }
    let parsed = match Address::from_str(address) {
        Ok(parsed) => parsed,
        Err(_) => return false,
    };

    let body = &address[2..];
    let has_lower = body.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = body.chars().any(|c| c.is_ascii_uppercase());
    if !(has_lower && has_upper) {
        return true;
    }

    to_checksum(&parsed, None) == address
}
