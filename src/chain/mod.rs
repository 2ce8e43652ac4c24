//! Chain module - reference data for supported networks
//!
//! This module provides:
//! - The `NetworkConfig` record loaded once at startup
//! - Lookup by chain id through `ChainRegistry`
//! - The built-in default network list

pub mod registry;

pub use registry::{default_networks, ChainRegistry, NetworkConfig};
