//! Network client used by the deployer.
//!
//! Accounts are managed by the connected node: transactions are submitted with
//! `eth_sendTransaction` and signed node-side. This tool never handles keys.

use std::{future::Future, time::Duration};

use alloy_core::primitives::{Address, Bytes, TxHash};
use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::{Map, Value};
use url::Url;

use crate::{NetworkConfig, rpc};

/// Default time to wait for a deployment receipt.
pub const DEFAULT_RECEIPT_TIMEOUT: Duration = Duration::from_secs(120);

/// Default interval between receipt polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// A contract creation transaction, before submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployTransaction {
    /// Sender account. When unset the node picks (or rejects) the sender.
    pub from: Option<Address>,
    /// Creation bytecode.
    pub data: Bytes,
    /// Explicit gas limit; the node estimates when unset.
    pub gas: Option<u64>,
    /// Explicit gas price in wei; the node's default when unset.
    pub gas_price: Option<u64>,
}

impl DeployTransaction {
    /// Build the `eth_sendTransaction` parameter object. No `to`: this is a `CREATE`.
    pub fn to_rpc_params(&self) -> Value {
        let mut tx = Map::new();

        if let Some(from) = self.from {
            tx.insert("from".to_string(), Value::String(from.to_string()));
        }
        tx.insert("data".to_string(), Value::String(self.data.to_string()));
        if let Some(gas) = self.gas {
            tx.insert("gas".to_string(), Value::String(format!("0x{:x}", gas)));
        }
        if let Some(gas_price) = self.gas_price {
            tx.insert(
                "gasPrice".to_string(),
                Value::String(format!("0x{:x}", gas_price)),
            );
        }

        Value::Object(tx)
    }
}

/// The confirmed outcome of a deployment transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentReceipt {
    pub tx_hash: TxHash,
    pub contract_address: Address,
    pub gas_used: Option<u64>,
}

/// Receipt as returned by `eth_getTransactionReceipt`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcReceipt {
    transaction_hash: TxHash,
    contract_address: Option<Address>,
    status: Option<String>,
    gas_used: Option<String>,
}

impl RpcReceipt {
    fn into_deployment_receipt(self) -> Result<DeploymentReceipt> {
        // Pre-byzantium receipts carry no status field.
        if let Some(status) = &self.status {
            if rpc::parse_quantity(status)? == 0 {
                anyhow::bail!("Deployment transaction {} reverted", self.transaction_hash);
            }
        }

        let contract_address = self.contract_address.with_context(|| {
            format!(
                "Receipt of transaction {} has no contract address",
                self.transaction_hash
            )
        })?;

        let gas_used = self
            .gas_used
            .as_deref()
            .map(rpc::parse_quantity)
            .transpose()?;

        Ok(DeploymentReceipt {
            tx_hash: self.transaction_hash,
            contract_address,
            gas_used,
        })
    }
}

/// Operations the deployer needs from the network.
pub trait EthClient: Send + Sync {
    /// List the accounts controlled by the connected node.
    fn accounts(&self) -> impl Future<Output = Result<Vec<Address>>> + Send;

    /// Submit a contract creation transaction and wait for its receipt.
    fn deploy(&self, tx: DeployTransaction) -> impl Future<Output = Result<DeploymentReceipt>> + Send;
}

impl<T: EthClient> EthClient for &T {
    fn accounts(&self) -> impl Future<Output = Result<Vec<Address>>> + Send {
        (**self).accounts()
    }

    fn deploy(&self, tx: DeployTransaction) -> impl Future<Output = Result<DeploymentReceipt>> + Send {
        (**self).deploy(tx)
    }
}

/// [`EthClient`] speaking JSON-RPC over HTTP.
#[derive(Debug, Clone)]
pub struct HttpEthClient {
    client: reqwest::Client,
    url: Url,
    receipt_timeout: Duration,
    poll_interval: Duration,
}

impl HttpEthClient {
    /// Create a client bound to the network's endpoint.
    ///
    /// No request is made here: an unreachable node surfaces on the first call.
    pub fn new(network: &NetworkConfig) -> Result<Self> {
        Ok(Self {
            client: rpc::create_client(rpc::DEFAULT_TIMEOUT)?,
            url: network.url.clone(),
            receipt_timeout: DEFAULT_RECEIPT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        })
    }

    pub fn with_receipt_timeout(mut self, timeout: Duration) -> Self {
        self.receipt_timeout = timeout;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<DeploymentReceipt> {
        let receipt: RpcReceipt = rpc::poll_until(
            "deployment receipt",
            self.receipt_timeout,
            self.poll_interval,
            || async move {
                rpc::json_rpc_call::<Option<RpcReceipt>>(
                    &self.client,
                    &self.url,
                    "eth_getTransactionReceipt",
                    vec![Value::String(tx_hash.to_string())],
                )
                .await
            },
        )
        .await?;

        receipt.into_deployment_receipt()
    }
}

impl EthClient for HttpEthClient {
    async fn accounts(&self) -> Result<Vec<Address>> {
        rpc::json_rpc_call(&self.client, &self.url, "eth_accounts", vec![]).await
    }

    async fn deploy(&self, tx: DeployTransaction) -> Result<DeploymentReceipt> {
        let tx_hash: TxHash = rpc::json_rpc_call(
            &self.client,
            &self.url,
            "eth_sendTransaction",
            vec![tx.to_rpc_params()],
        )
        .await
        .context("Failed to send deployment transaction")?;

        tracing::debug!(tx_hash = %tx_hash, "Deployment transaction sent, awaiting receipt...");

        self.wait_for_receipt(tx_hash)
            .await
            .with_context(|| format!("Deployment transaction {} failed", tx_hash))
    }
}
