//! Transaction submitter: nonce fetch, encode, build, sign, broadcast
//!
//! One submission per call, in strict order. The nonce is fetched from the
//! node immediately before the request is built; it is never cached, so a
//! failed attempt cannot leak a stale nonce into a later one. Broadcasts are
//! fire-and-forget: the node accepting the transaction into its pending pool
//! is the end of the story for calls. Only deployment waits for a receipt,
//! because the contract address exists nowhere else.
//!
//! There is deliberately no retry loop here. Retrying after a rejection with
//! the same nonce risks a conflicting resubmission; a caller who wants to
//! retry must go through `submit` again so the nonce is re-fetched.

use super::gas::GasPolicy;
use crate::config::Settings;
use crate::contract::ContractReference;
use crate::error::{SubmitterError, SubmitterResult};
use crate::node::NodeApi;

use ethers::abi::Token;
use ethers::prelude::*;
use ethers::signers::{LocalWallet, Signer};
use ethers::types::transaction::eip2718::TypedTransaction;
use std::time::Duration;
use tracing::{debug, info};

/// Outcome of a confirmed contract deployment
#[derive(Debug)]
pub struct Deployment {
    pub tx_hash: H256,
    pub contract_address: Address,
}

/// Builds, signs, and broadcasts single transactions
pub struct TransactionSubmitter<N: NodeApi> {
    node: N,
    wallet: LocalWallet,
    sender: Address,
    gas: GasPolicy,
    receipt_poll_interval: Duration,
    receipt_poll_attempts: u32,
}

impl<N: NodeApi> std::fmt::Debug for TransactionSubmitter<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionSubmitter")
            .field("sender", &self.sender)
            .finish_non_exhaustive()
    }
}

impl<N: NodeApi> TransactionSubmitter<N> {
    /// Create a submitter from loaded settings.
    ///
    /// The private key is parsed before anything touches the network, so a
    /// malformed key fails here with a signing error. The chain id is
    /// fetched once and bound to the wallet for EIP-155 signing.
    pub async fn new(node: N, settings: &Settings) -> SubmitterResult<Self> {
        let wallet = settings
            .private_key
            .parse::<LocalWallet>()
            .map_err(|e| SubmitterError::Signing(format!("invalid private key: {e}")))?;

        if wallet.address() != settings.public_key {
            return Err(SubmitterError::Config(
                "PUBLIC_KEY does not match the address derived from PRIVATE_KEY".to_string(),
            ));
        }

        let chain_id = node.chain_id().await?;
        let wallet = wallet.with_chain_id(chain_id);
        info!(chain_id, sender = ?settings.public_key, "submitter initialized");

        Ok(Self {
            node,
            wallet,
            sender: settings.public_key,
            gas: GasPolicy::from_settings(&settings.gas),
            receipt_poll_interval: Duration::from_millis(settings.receipt_poll_interval_ms),
            receipt_poll_attempts: settings.receipt_poll_attempts,
        })
    }

    /// Encode a contract method call, sign it, and broadcast it.
    ///
    /// Returns the transaction hash as soon as the node accepts the
    /// transaction into its pending pool; confirmation is not awaited.
    pub async fn submit(
        &self,
        method: &str,
        args: &[Token],
        contract: &ContractReference,
    ) -> SubmitterResult<H256> {
        let nonce = self.node.transaction_count(self.sender).await?;
        debug!(nonce, "fetched transaction count");

        let data = contract.encode_call(method, args)?;

        let gas_price = self.gas.price(&self.node).await?;
        let tx = self.build_request(
            Some(contract.address),
            data,
            nonce,
            self.gas.call_gas_limit(),
            gas_price,
        );

        let raw = self.sign(&tx).await?;
        let tx_hash = self.node.send_raw_transaction(raw).await?;

        info!(?tx_hash, method, nonce, "transaction accepted into pending pool");
        Ok(tx_hash)
    }

    /// Broadcast a contract-creation transaction and wait for its receipt.
    ///
    /// This is the only operation that waits for on-chain confirmation: the
    /// deployed contract's address is only known from the receipt.
    pub async fn deploy(&self, bytecode: Bytes) -> SubmitterResult<Deployment> {
        let nonce = self.node.transaction_count(self.sender).await?;
        debug!(nonce, "fetched transaction count");

        let gas_price = self.gas.price(&self.node).await?;
        let tx = self.build_request(None, bytecode, nonce, self.gas.deploy_gas_limit(), gas_price);

        let raw = self.sign(&tx).await?;
        let tx_hash = self.node.send_raw_transaction(raw).await?;
        info!(?tx_hash, nonce, "deployment broadcast, waiting for receipt");

        self.wait_for_deployment(tx_hash).await
    }

    fn build_request(
        &self,
        to: Option<Address>,
        data: Bytes,
        nonce: u64,
        gas_limit: U256,
        gas_price: U256,
    ) -> TypedTransaction {
        let mut tx = TransactionRequest::new()
            .from(self.sender)
            .nonce(nonce)
            .gas(gas_limit)
            .gas_price(gas_price)
            .data(data);

        if let Some(to) = to {
            tx = tx.to(to);
        }

        TypedTransaction::Legacy(tx)
    }

    async fn sign(&self, tx: &TypedTransaction) -> SubmitterResult<Bytes> {
        let signature = self
            .wallet
            .sign_transaction(tx)
            .await
            .map_err(|e| SubmitterError::Signing(e.to_string()))?;
        Ok(tx.rlp_signed(&signature))
    }

    async fn wait_for_deployment(&self, tx_hash: H256) -> SubmitterResult<Deployment> {
        for attempt in 1..=self.receipt_poll_attempts {
            tokio::time::sleep(self.receipt_poll_interval).await;

            match self.node.transaction_receipt(tx_hash).await? {
                Some(receipt) => {
                    if receipt.status != Some(1.into()) {
                        return Err(SubmitterError::Rejected(format!(
                            "deployment {tx_hash:?} reverted"
                        )));
                    }

                    let contract_address = receipt.contract_address.ok_or_else(|| {
                        SubmitterError::Rejected(format!(
                            "receipt for {tx_hash:?} carries no contract address"
                        ))
                    })?;

                    info!(?contract_address, "contract deployed");
                    return Ok(Deployment {
                        tx_hash,
                        contract_address,
                    });
                }
                None => debug!(attempt, "deployment still pending"),
            }
        }

        Err(SubmitterError::Timeout {
            operation: "deployment receipt".to_string(),
        })
    }
}
