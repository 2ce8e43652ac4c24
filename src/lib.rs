//! Portfolio Bridge - cross-chain transfer core for a DeFi portfolio dashboard
//!
//! Validates transfer requests, fetches and ranks quotes from a bridge
//! aggregator, executes the chosen route with the connected wallet and tracks
//! the transfer until it settles.

pub mod aggregator;
pub mod api;
pub mod chain;
pub mod config;
pub mod error;
pub mod execution;
pub mod metrics;
pub mod quote;
pub mod service;
pub mod tracking;
pub mod tx;
pub mod types;
pub mod validation;

pub use error::{BridgeError, BridgeResult, ValidationError};
pub use service::BridgeService;
