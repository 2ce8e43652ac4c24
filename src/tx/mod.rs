//! Transaction signing for route execution

mod approval;
mod signer;

pub use approval::{build_approval, is_native_token};
pub use signer::{BridgeSigner, WalletSigner};

#[cfg(test)]
pub use signer::MockBridgeSigner;
