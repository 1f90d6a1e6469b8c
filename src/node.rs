//! Thin client over the hosted node's JSON-RPC API
//!
//! `NodeApi` captures exactly the surface the submitter consumes, so tests
//! can stand in a mock node and the binary can use HTTP.

use crate::error::{SubmitterError, SubmitterResult};

use async_trait::async_trait;
use ethers::prelude::*;
use ethers::providers::{Http, Provider};
use tracing::debug;

/// Node operations consumed by the submitter
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NodeApi: Send + Sync {
    /// Chain id, needed once for EIP-155 signing
    async fn chain_id(&self) -> SubmitterResult<u64>;

    /// Current transaction count (the next nonce) for an account
    async fn transaction_count(&self, address: Address) -> SubmitterResult<u64>;

    /// Current gas price quote
    async fn gas_price(&self) -> SubmitterResult<U256>;

    /// Broadcast a signed transaction; returns once the node accepts it
    /// into its pending pool
    async fn send_raw_transaction(&self, raw: Bytes) -> SubmitterResult<H256>;

    /// Receipt for a transaction, `None` while it is still pending
    async fn transaction_receipt(
        &self,
        tx_hash: H256,
    ) -> SubmitterResult<Option<TransactionReceipt>>;
}

/// HTTP JSON-RPC node client
pub struct EthNode {
    provider: Provider<Http>,
}

impl EthNode {
    /// Connect to a node endpoint
    pub fn connect(endpoint_url: &str) -> SubmitterResult<Self> {
        let provider = Provider::<Http>::try_from(endpoint_url)
            .map_err(|e| SubmitterError::Config(format!("invalid endpoint URL: {e}")))?;
        Ok(Self { provider })
    }
}

#[async_trait]
impl NodeApi for EthNode {
    async fn chain_id(&self) -> SubmitterResult<u64> {
        let chain_id = self
            .provider
            .get_chainid()
            .await
            .map_err(|e| SubmitterError::Network(e.to_string()))?;
        debug!(chain_id = chain_id.as_u64(), "connected to node");
        Ok(chain_id.as_u64())
    }

    async fn transaction_count(&self, address: Address) -> SubmitterResult<u64> {
        let count = self
            .provider
            .get_transaction_count(address, None)
            .await
            .map_err(|e| SubmitterError::Network(e.to_string()))?;
        Ok(count.as_u64())
    }

    async fn gas_price(&self) -> SubmitterResult<U256> {
        self.provider
            .get_gas_price()
            .await
            .map_err(|e| SubmitterError::Network(e.to_string()))
    }

    async fn send_raw_transaction(&self, raw: Bytes) -> SubmitterResult<H256> {
        let pending = self
            .provider
            .send_raw_transaction(raw)
            .await
            .map_err(|e| SubmitterError::from_rpc_message(e.to_string()))?;
        Ok(pending.tx_hash())
    }

    async fn transaction_receipt(
        &self,
        tx_hash: H256,
    ) -> SubmitterResult<Option<TransactionReceipt>> {
        self.provider
            .get_transaction_receipt(tx_hash)
            .await
            .map_err(|e| SubmitterError::Network(e.to_string()))
    }
}
