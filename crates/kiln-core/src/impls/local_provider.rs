//! LocalProvider - 開発用の in-process provider
//!
//! Answers the handful of read-only JSON-RPC methods that need no node
//! behind them. Anything else is a `KilnError::Provider`.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::trace;

use crate::domain::{NetworkConfig, ProjectPaths};
use crate::error::KilnError;
use crate::ports::{Provider, ProviderFactory, SharedProvider};

pub const DEFAULT_CHAIN_ID: u64 = 31337;

#[derive(Debug)]
pub struct LocalProvider {
    network: String,
    chain_id: u64,
    accounts: Vec<String>,
    client_version: String,
    requests: AtomicU64,
}

impl LocalProvider {
    pub fn new(
        network: impl Into<String>,
        config: &NetworkConfig,
        toolchain_version: &str,
    ) -> Self {
        Self {
            network: network.into(),
            chain_id: config.chain_id.unwrap_or(DEFAULT_CHAIN_ID),
            accounts: config.accounts.clone(),
            client_version: format!("kiln/local solc/{toolchain_version}"),
            requests: AtomicU64::new(0),
        }
    }

    pub fn network(&self) -> &str {
        &self.network
    }

    /// Requests served so far, including failed ones.
    pub fn request_count(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl Provider for LocalProvider {
    async fn request(&self, method: &str, _params: Value) -> Result<Value, KilnError> {
        self.requests.fetch_add(1, Ordering::Relaxed);
        trace!(network = %self.network, method, "local provider request");

        match method {
            "eth_chainId" => Ok(json!(format!("0x{:x}", self.chain_id))),
            "net_version" => Ok(json!(self.chain_id.to_string())),
            "eth_accounts" => Ok(json!(self.accounts)),
            "web3_clientVersion" => Ok(json!(self.client_version)),
            other => Err(KilnError::Provider(format!(
                "method {other} is not supported by the local provider (network={})",
                self.network
            ))),
        }
    }
}

/// Builds a `LocalProvider` for whichever network is selected.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalProviderFactory;

impl ProviderFactory for LocalProviderFactory {
    fn create(
        &self,
        network_name: &str,
        network_config: &NetworkConfig,
        toolchain_version: &str,
        _paths: &ProjectPaths,
    ) -> Result<SharedProvider, KilnError> {
        Ok(Arc::new(LocalProvider::new(
            network_name,
            network_config,
            toolchain_version,
        )))
    }
}
