use alloy_core::primitives::Address;
use anyhow::{Context, Result};

use crate::{
    Artifact, ArtifactRegistry, ContractRole, DeployConfig, DeployTransaction, DeployedContract,
    DeploymentReport, EthClient, HttpEthClient, NetworkConfig,
};

/// Contract name used for the deposit contract when its ABI path has no usable stem.
const DEPOSIT_CONTRACT_NAME: &str = "Deposit";

/// Runs the deployment sequence against one network.
///
/// The order is fixed: beacon deposit contract, multicall aggregator, balance
/// batcher. Each deployment is awaited before the next is sent, and the first
/// failure ends the run. Contracts deployed before the failure stay deployed.
#[derive(Debug, Clone)]
pub struct Deployer<C> {
    client: C,
    network: NetworkConfig,
    config: DeployConfig,
}

impl Deployer<HttpEthClient> {
    /// Build a deployer bound to the network's JSON-RPC endpoint.
    pub fn connect(network: NetworkConfig, config: DeployConfig) -> Result<Self> {
        let client = HttpEthClient::new(&network)
            .with_context(|| format!("Failed to create client for network {}", network.name))?;
        Ok(Self::new(client, network, config))
    }
}

impl<C: EthClient> Deployer<C> {
    pub fn new(client: C, network: NetworkConfig, config: DeployConfig) -> Self {
        Self {
            client,
            network,
            config,
        }
    }

    pub fn network(&self) -> &NetworkConfig {
        &self.network
    }

    pub fn config(&self) -> &DeployConfig {
        &self.config
    }

    /// Fetch the node's accounts.
    ///
    /// A failure is logged and yields an empty list: the run goes on, and the
    /// deployments are sent without an explicit sender.
    pub async fn resolve_accounts(&self) -> Vec<Address> {
        match self.client.accounts().await {
            Ok(accounts) => {
                tracing::debug!(count = accounts.len(), "Resolved node accounts");
                accounts
            }
            Err(e) => {
                tracing::error!(
                    network = %self.network.name,
                    error = ?e,
                    "Error retrieving accounts, continuing without a sender"
                );
                Vec::new()
            }
        }
    }

    /// Run the whole sequence and return what was deployed.
    pub async fn deploy(&self) -> Result<DeploymentReport> {
        tracing::info!(
            network = %self.network.name,
            url = %self.network.url,
            "Starting deployment process..."
        );

        let accounts = self.resolve_accounts().await;
        if accounts.len() < 2 {
            tracing::warn!(
                count = accounts.len(),
                "The node exposes fewer than two accounts"
            );
        }

        let deposit_sender = account_at(&accounts, self.config.deposit_sender_index);
        let sender = account_at(&accounts, self.config.sender_index);

        tracing::info!(
            network = %self.network.name,
            sender = ?sender,
            "Using network"
        );

        let mut contracts = Vec::with_capacity(3);

        let deposit_name = self
            .config
            .deposit_abi
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or(DEPOSIT_CONTRACT_NAME);
        let deposit_artifact = Artifact::from_abi_and_bin(
            deposit_name,
            &self.config.deposit_abi,
            &self.config.deposit_bin,
        )?;
        contracts.push(
            self.deploy_contract(
                ContractRole::BeaconDeposit,
                deposit_artifact,
                deposit_sender,
                Some(self.config.deposit_gas_limit),
                Some(self.config.gas_price),
            )
            .await?,
        );

        let registry = ArtifactRegistry::new(&self.config.artifacts_dir);

        for (role, contract_name) in [
            (ContractRole::Multicall, &self.config.multicall_contract),
            (
                ContractRole::BalanceBatcher,
                &self.config.balance_batcher_contract,
            ),
        ] {
            let artifact = registry
                .lookup(contract_name)
                .with_context(|| format!("Failed to load {} artifact", role))?;
            contracts.push(
                self.deploy_contract(role, artifact, sender, None, None)
                    .await?,
            );
        }

        tracing::info!(network = %self.network.name, "✓ Deployment complete!");

        Ok(DeploymentReport {
            network: self.network.name.clone(),
            sender,
            contracts,
        })
    }

    async fn deploy_contract(
        &self,
        role: ContractRole,
        artifact: Artifact,
        from: Option<Address>,
        gas: Option<u64>,
        gas_price: Option<u64>,
    ) -> Result<DeployedContract> {
        tracing::info!(
            contract = %artifact.name,
            role = %role,
            from = ?from,
            bytecode_len = artifact.bytecode.len(),
            "Deploying contract..."
        );

        let tx = DeployTransaction {
            from,
            data: artifact.bytecode,
            gas,
            gas_price,
        };

        let receipt = self
            .client
            .deploy(tx)
            .await
            .with_context(|| format!("Failed to deploy {} ({})", role, artifact.name))?;

        tracing::info!(
            contract = %artifact.name,
            address = %receipt.contract_address,
            tx_hash = %receipt.tx_hash,
            gas_used = ?receipt.gas_used,
            "Contract deployed"
        );

        Ok(DeployedContract {
            role,
            name: artifact.name,
            address: receipt.contract_address,
            tx_hash: receipt.tx_hash,
            abi: artifact.abi,
        })
    }
}

/// The account at `index`, if the node exposes that many.
fn account_at(accounts: &[Address], index: usize) -> Option<Address> {
    let account = accounts.get(index).copied();
    if account.is_none() {
        tracing::warn!(
            index,
            available = accounts.len(),
            "No node account at index, the node will pick the sender"
        );
    }
    account
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_core::primitives::address;

    #[test]
    fn test_account_at() {
        let accounts = vec![
            address!("f39fd6e51aad88f6f4ce6ab8827279cfffb92266"),
            address!("70997970c51812dc3a010c7d01b50e0d17dc79c8"),
        ];

        assert_eq!(account_at(&accounts, 1), Some(accounts[1]));
        assert_eq!(account_at(&accounts, 2), None);
        assert_eq!(account_at(&[], 0), None);
    }
}
