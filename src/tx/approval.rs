//! ERC-20 allowance transactions for non-native source tokens

use crate::error::{BridgeError, BridgeResult};

use ethers::abi::{encode, Token};
use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::types::{Address, Bytes, TransactionRequest, U256};

/// `approve(address,uint256)`
const APPROVE_SELECTOR: [u8; 4] = [0x09, 0x5e, 0xa7, 0xb3];

/// Placeholder addresses aggregators use for a chain's native asset
const NATIVE_TOKENS: [&str; 2] = [
    "0x0000000000000000000000000000000000000000",
    "0xeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee",
];

pub fn is_native_token(token: &str) -> bool {
    let lower = token.to_lowercase();
    NATIVE_TOKENS.iter().any(|native| *native == lower)
}

/// Build an `approve(spender, amount)` call on `token`
pub fn build_approval(
    token: &str,
    spender: &str,
    amount: &str,
    chain_id: u64,
) -> BridgeResult<TypedTransaction> {
    let token: Address = token
        .parse()
        .map_err(|e| BridgeError::ExecutionRejected(format!("Invalid token address {}: {}", token, e)))?;
    let spender: Address = spender.parse().map_err(|e| {
        BridgeError::ExecutionRejected(format!("Invalid approval address {}: {}", spender, e))
    })?;
    let amount = U256::from_dec_str(amount)
        .map_err(|e| BridgeError::ExecutionRejected(format!("Invalid approval amount {}: {}", amount, e)))?;

    let mut data = APPROVE_SELECTOR.to_vec();
    data.extend(encode(&[Token::Address(spender), Token::Uint(amount)]));

    let tx = TransactionRequest::new()
        .to(token)
        .data(Bytes::from(data))
        .chain_id(chain_id);

    Ok(TypedTransaction::Legacy(tx))
}
