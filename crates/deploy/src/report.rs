//! Deployment results.

use std::{fmt, path::Path};

use alloy_core::{
    json_abi::JsonAbi,
    primitives::{Address, TxHash},
};
use anyhow::{Context, Result};
use serde::Serialize;

/// The contracts deployed by a run, in deployment order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display, strum::EnumIter,
)]
#[serde(rename_all = "kebab-case")]
pub enum ContractRole {
    #[strum(serialize = "Beacon Deposit")]
    BeaconDeposit,
    #[strum(serialize = "Multicall")]
    Multicall,
    #[strum(serialize = "Balance Batcher")]
    BalanceBatcher,
}

/// A contract live on the network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeployedContract {
    pub role: ContractRole,
    /// Contract name of the originating artifact.
    pub name: String,
    pub address: Address,
    pub tx_hash: TxHash,
    #[serde(skip)]
    pub abi: JsonAbi,
}

/// Everything a run produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeploymentReport {
    /// Name of the network deployed to.
    pub network: String,
    /// The account the deployments were reported as sent from, if it resolved.
    pub sender: Option<Address>,
    /// Deployed contracts, in deployment order.
    pub contracts: Vec<DeployedContract>,
}

impl DeploymentReport {
    /// Address of the contract deployed for `role`.
    pub fn address_of(&self, role: ContractRole) -> Option<Address> {
        self.contracts
            .iter()
            .find(|contract| contract.role == role)
            .map(|contract| contract.address)
    }

    /// Address of the contract deployed from the artifact named `name`.
    pub fn address_by_name(&self, name: &str) -> Option<Address> {
        self.contracts
            .iter()
            .find(|contract| contract.name == name)
            .map(|contract| contract.address)
    }

    /// Save the report as formatted JSON.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json =
            serde_json::to_string_pretty(self).context("Failed to serialize deployment report")?;

        std::fs::write(path, json).context(format!(
            "Failed to write deployment report to {}",
            path.display()
        ))?;

        tracing::info!(path = %path.display(), "Deployment report saved");
        Ok(())
    }
}

impl fmt::Display for DeploymentReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Using network: {}", self.network)?;
        match self.sender {
            Some(sender) => writeln!(f, "Deploying from: {}", sender)?,
            None => writeln!(f, "Deploying from: <unresolved>")?,
        }
        writeln!(f)?;

        for contract in &self.contracts {
            writeln!(f, "   {} Address", contract.role)?;
            writeln!(f, "     {}", contract.address)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_core::primitives::{B256, address};
    use strum::IntoEnumIterator;
    use tempdir::TempDir;

    fn report() -> DeploymentReport {
        let addresses = [
            address!("5fbdb2315678afecb367f032d93f642f64180aa3"),
            address!("e7f1725e7734ce288f8367e1bb143e90bb3f0512"),
            address!("9fe46736679d2d9a65f0992f2272de9f3c7fa6e0"),
        ];
        let names = ["Deposit", "Multicall2", "BalanceChecker"];

        DeploymentReport {
            network: "localhost".to_string(),
            sender: Some(address!("70997970c51812dc3a010c7d01b50e0d17dc79c8")),
            contracts: ContractRole::iter()
                .zip(addresses)
                .zip(names)
                .map(|((role, address), name)| DeployedContract {
                    role,
                    name: name.to_string(),
                    address,
                    tx_hash: B256::ZERO,
                    abi: JsonAbi::default(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_lookups() {
        let report = report();

        assert_eq!(
            report.address_of(ContractRole::Multicall),
            Some(address!("e7f1725e7734ce288f8367e1bb143e90bb3f0512"))
        );
        assert_eq!(
            report.address_by_name("BalanceChecker"),
            report.address_of(ContractRole::BalanceBatcher)
        );
        assert_eq!(report.address_by_name("Unknown"), None);
    }

    #[test]
    fn test_display_lists_contracts_in_order() {
        let text = report().to_string();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Using network: localhost");
        assert_eq!(
            lines[1],
            "Deploying from: 0x70997970C51812dc3A010C7d01b50e0d17dc79C8"
        );
        assert_eq!(lines[2], "");
        assert_eq!(lines[3], "   Beacon Deposit Address");
        assert_eq!(lines[4], "     0x5FbDB2315678afecb367f032d93F642f64180aa3");
        assert_eq!(lines[5], "   Multicall Address");
        assert_eq!(lines[7], "   Balance Batcher Address");
        assert_eq!(lines.len(), 9);
    }

    #[test]
    fn test_display_unresolved_sender() {
        let mut report = report();
        report.sender = None;

        assert!(report.to_string().contains("Deploying from: <unresolved>"));
    }

    #[test]
    fn test_save_to_file() {
        let dir = TempDir::new("report").unwrap();
        let path = dir.path().join("deployment.json");

        report().save_to_file(&path).unwrap();

        let saved: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(saved["network"], "localhost");
        assert_eq!(saved["contracts"][0]["role"], "beacon-deposit");
        assert_eq!(saved["contracts"][1]["name"], "Multicall2");
        assert_eq!(
            saved["contracts"][2]["address"]
                .as_str()
                .unwrap()
                .to_lowercase(),
            "0x9fe46736679d2d9a65f0992f2272de9f3c7fa6e0"
        );
        assert!(saved["contracts"][0].get("abi").is_none());
    }
}
