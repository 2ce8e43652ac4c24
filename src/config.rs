//! Configuration management for the bridge service
//!
//! Loads configuration from TOML files with environment variable substitution.

use crate::chain::NetworkConfig;

use anyhow::{Context, Result};
use lazy_static::lazy_static;
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub service: ServiceConfig,
    #[serde(default)]
    pub quote: QuoteConfig,
    pub aggregator: AggregatorConfig,
    pub api: ApiConfig,
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub wallet: WalletConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Supported networks; the built-in registry is used when empty
    #[serde(default)]
    pub chains: Vec<NetworkConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub instance_id: String,
}

/// Options sent with every route discovery request
#[derive(Debug, Clone, Deserialize)]
pub struct QuoteConfig {
    pub slippage: f64,
    pub max_price_impact: f64,
    pub allow_switch_chain: bool,
}

impl Default for QuoteConfig {
    fn default() -> Self {
        Self {
            slippage: 0.005,
            max_price_impact: 0.4,
            allow_switch_chain: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AggregatorConfig {
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub integrator: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    /// Seconds a completed, failed or refunded transaction stays in the book
    #[serde(default = "default_settled_retention_secs")]
    pub settled_retention_secs: u64,
}

fn default_settled_retention_secs() -> u64 {
    3600
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub port: u16,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WalletConfig {
    pub private_key_env: Option<String>,
    /// Chain the signer is bound to
    pub chain_id: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Pretty,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl Settings {
    /// Load settings from the file named by `PORTFOLIO_BRIDGE_CONFIG`
    pub fn load() -> Result<Self> {
        let config_path = env::var("PORTFOLIO_BRIDGE_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config/default.toml"));

        Self::load_from(&config_path)
    }

    /// Load settings from a specific file
    pub fn load_from(config_path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {:?}", config_path))?;

        Self::parse(&config_str)
    }

    /// Parse settings from TOML text, substituting `${VAR}` references first
    pub fn parse(config_str: &str) -> Result<Self> {
        let config_str = substitute_env_vars(config_str);

        let settings: Settings =
            toml::from_str(&config_str).with_context(|| "Failed to parse configuration")?;

        settings.validate()?;

        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        reqwest::Url::parse(&self.aggregator.base_url).with_context(|| {
            format!("Invalid aggregator base_url: {}", self.aggregator.base_url)
        })?;

        if !(self.quote.slippage > 0.0 && self.quote.slippage < 1.0) {
            anyhow::bail!("quote.slippage must be in (0, 1), got {}", self.quote.slippage);
        }
        if !(self.quote.max_price_impact > 0.0 && self.quote.max_price_impact <= 1.0) {
            anyhow::bail!(
                "quote.max_price_impact must be in (0, 1], got {}",
                self.quote.max_price_impact
            );
        }

        for chain in &self.chains {
            if chain.rpc_url.is_empty() {
                anyhow::bail!("Chain {} has no RPC URL configured", chain.name);
            }
        }

        if let Some(chain_id) = self.wallet.chain_id {
            if !self.chains.is_empty() && !self.chains.iter().any(|c| c.chain_id == chain_id) {
                anyhow::bail!("Wallet chain {} is not a configured chain", chain_id);
            }
        }

        if self.aggregator.api_key.as_deref() == Some("") {
            tracing::warn!("Aggregator API key is empty - requests will be rate limited");
        }

        Ok(())
    }

    /// Configured networks, or the built-in list when none are configured
    pub fn networks(&self) -> Vec<NetworkConfig> {
        if self.chains.is_empty() {
            crate::chain::default_networks()
        } else {
            self.chains.clone()
        }
    }
}

lazy_static! {
    static ref ENV_VAR: regex::Regex = regex::Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .expect("env var pattern is valid");
}

/// Substitute environment variables in the format ${VAR_NAME}
fn substitute_env_vars(input: &str) -> String {
    let mut result = input.to_string();

    for cap in ENV_VAR.captures_iter(input) {
        let var_name = &cap[1];
        let var_value = env::var(var_name).unwrap_or_default();
        result = result.replace(&cap[0], &var_value);
    }

    result
}
