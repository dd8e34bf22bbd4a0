//! devnet-contracts-deploy - Deployment library for development network contracts.
//!
//! This crate deploys the beacon deposit contract, the multicall aggregator
//! and the balance batcher onto an Ethereum-compatible network whose node
//! manages the sender accounts.

mod abi;
pub use abi::{compress_abi, decompress_abi};

mod artifact;
pub use artifact::{Artifact, ArtifactRegistry};

mod client;
pub use client::{
    DEFAULT_POLL_INTERVAL, DEFAULT_RECEIPT_TIMEOUT, DeployTransaction, DeploymentReceipt,
    EthClient, HttpEthClient,
};

mod config;
pub use config::{
    CONFIG_FILENAME, DEFAULT_DEPOSIT_GAS_LIMIT, DEFAULT_GAS_PRICE, DeployConfig, DevnetConfig,
    ENV_PREFIX, LOCAL_RPC_URL, NetworkConfig, NetworkEntry,
};

mod deployer;
pub use deployer::Deployer;

mod report;
pub use report::{ContractRole, DeployedContract, DeploymentReport};

pub mod rpc;
