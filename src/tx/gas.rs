//! Gas policy: static limits with an explicit price knob
//!
//! The calls this tool makes are well known, so a fixed gas limit is used
//! instead of dynamic estimation. The gas price is either pinned through
//! configuration or taken from the node's quote with a small buffer.

use crate::config::GasSettings;
use crate::error::SubmitterResult;
use crate::node::NodeApi;

use ethers::types::U256;
use tracing::debug;

/// Buffer percentage applied to the node's gas price quote
const PRICE_BUFFER_PERCENT: u64 = 10;

pub struct GasPolicy {
    call_gas_limit: U256,
    deploy_gas_limit: U256,
    price_override: Option<U256>,
}

impl GasPolicy {
    pub fn from_settings(gas: &GasSettings) -> Self {
        Self {
            call_gas_limit: gas.call_gas_limit.into(),
            deploy_gas_limit: gas.deploy_gas_limit.into(),
            price_override: gas
                .gas_price_gwei
                .map(|gwei| U256::from(gwei) * U256::exp10(9)),
        }
    }

    pub fn call_gas_limit(&self) -> U256 {
        self.call_gas_limit
    }

    pub fn deploy_gas_limit(&self) -> U256 {
        self.deploy_gas_limit
    }

    /// Resolve the gas price for the next transaction
    pub async fn price<N: NodeApi>(&self, node: &N) -> SubmitterResult<U256> {
        if let Some(price) = self.price_override {
            return Ok(price);
        }

        let quoted = node.gas_price().await?;
        let buffered = quoted + quoted * PRICE_BUFFER_PERCENT / 100;
        debug!(%quoted, %buffered, "resolved gas price from node quote");
        Ok(buffered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::MockNodeApi;

    fn settings(gas_price_gwei: Option<u64>) -> GasSettings {
        GasSettings {
            call_gas_limit: 500_000,
            deploy_gas_limit: 3_000_000,
            gas_price_gwei,
        }
    }

    #[tokio::test]
    async fn configured_price_skips_the_node_quote() {
        let node = MockNodeApi::new();
        let policy = GasPolicy::from_settings(&settings(Some(25)));

        let price = policy.price(&node).await.unwrap();
        assert_eq!(price, U256::from(25) * U256::exp10(9));
    }

    #[tokio::test]
    async fn node_quote_gets_a_buffer() {
        let mut node = MockNodeApi::new();
        node.expect_gas_price()
            .times(1)
            .returning(|| Ok(U256::from(100)));
        let policy = GasPolicy::from_settings(&settings(None));

        let price = policy.price(&node).await.unwrap();
        assert_eq!(price, U256::from(110));
    }
}
