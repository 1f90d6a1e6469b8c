//! NFT Minter - single-transaction submitter for a hosted Ethereum node
//!
//! Two subcommands: `deploy` broadcasts a contract-creation transaction and
//! waits for the receipt carrying the new contract address; `mint` encodes a
//! `mintNFT` call against a deployed contract, signs it, and broadcasts it,
//! reporting the transaction hash once the node accepts it.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ethers::abi::Token;
use ethers::types::Address;
use std::path::PathBuf;
use tracing::info;

mod config;
mod contract;
mod error;
mod node;
mod tx;

use config::Settings;
use contract::{ContractArtifact, ContractReference};
use node::EthNode;
use tx::TransactionSubmitter;

#[derive(Parser)]
#[command(name = "nft-minter", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Mint a single NFT by calling mintNFT on a deployed contract
    Mint {
        /// Address of the deployed NFT contract
        #[arg(long)]
        contract: Address,

        /// Path to the contract ABI (bare array or Hardhat artifact)
        #[arg(long)]
        abi: PathBuf,

        /// Metadata URI for the minted token
        #[arg(long)]
        token_uri: String,

        /// Recipient of the token; defaults to the configured account
        #[arg(long)]
        recipient: Option<Address>,
    },

    /// Deploy a contract and wait for its on-chain address
    Deploy {
        /// Path to the Hardhat artifact carrying the creation bytecode
        #[arg(long)]
        artifact: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();
    let settings = Settings::from_env().context("failed to load configuration")?;

    let node = EthNode::connect(&settings.endpoint_url)?;
    let submitter = TransactionSubmitter::new(node, &settings).await?;

    match cli.command {
        Command::Mint {
            contract,
            abi,
            token_uri,
            recipient,
        } => {
            let artifact = ContractArtifact::load(&abi)?;
            let reference = ContractReference::new(contract, artifact.abi);

            let recipient = recipient.unwrap_or(settings.public_key);
            let args = [Token::Address(recipient), Token::String(token_uri)];

            let tx_hash = submitter.submit("mintNFT", &args, &reference).await?;
            info!("check the node provider's mempool view for confirmation status");
            println!("Transaction hash: {tx_hash:?}");
        }
        Command::Deploy { artifact } => {
            let artifact = ContractArtifact::load(&artifact)?;
            let deployment = submitter.deploy(artifact.bytecode()?).await?;

            println!(
                "Contract deployed to address: {:?}",
                deployment.contract_address
            );
            println!("Transaction hash: {:?}", deployment.tx_hash);
        }
    }

    Ok(())
}

fn init_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,nft_minter=debug"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .init();
}
