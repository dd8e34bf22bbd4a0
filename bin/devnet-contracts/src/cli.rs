use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use devnet_contracts_deploy::DeployConfig;
use tracing::level_filters::LevelFilter;

/// The network used when none is selected.
const DEFAULT_NETWORK: &str = "localhost";

#[derive(Parser)]
#[command(name = "devnet-contracts")]
#[command(
    author,
    version,
    about = "Deploy the deposit, multicall and balance batcher contracts to a development network",
    args_conflicts_with_subcommands = true
)]
pub struct Cli {
    /// The verbosity level.
    #[arg(short, long, global = true, env = "DEVNET_VERBOSITY", default_value_t = LevelFilter::INFO)]
    pub verbosity: LevelFilter,

    /// Deployment options, used when no subcommand is given.
    #[clap(flatten)]
    pub deploy: DeployArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Deploy the contracts (the default when no subcommand is given).
    Deploy(DeployArgs),
    /// Compress a JSON ABI file into a base64 string.
    CompressAbi {
        /// Path to the JSON ABI file.
        path: PathBuf,
    },
    /// Decompress a base64 string produced by `compress-abi` back into JSON.
    DecompressAbi {
        /// Path to the file holding the compressed ABI.
        path: PathBuf,
    },
}

/// Deployment options. Each one overrides the configuration file.
#[derive(Debug, Clone, Args)]
pub struct DeployArgs {
    /// Path to a Devnet.toml configuration file.
    ///
    /// If not provided, ./Devnet.toml is used when it exists.
    #[arg(long, alias = "conf", env = "DEVNET_CONFIG")]
    pub config: Option<PathBuf>,

    /// The network to deploy to.
    #[arg(short, long, env = "DEVNET_NETWORK", default_value = DEFAULT_NETWORK)]
    pub network: String,

    /// Override the RPC URL of the selected network.
    #[arg(long, alias = "rpc", env = "DEVNET_RPC_URL")]
    pub rpc_url: Option<String>,

    /// Path to the deposit contract JSON ABI.
    #[arg(long, env = "DEVNET_DEPOSIT_ABI")]
    pub deposit_abi: Option<PathBuf>,

    /// Path to the deposit contract hex bytecode.
    #[arg(long, env = "DEVNET_DEPOSIT_BIN")]
    pub deposit_bin: Option<PathBuf>,

    /// Path to the Hardhat artifacts directory.
    #[arg(long, alias = "artifacts-dir", env = "DEVNET_ARTIFACTS")]
    pub artifacts: Option<PathBuf>,

    /// Node account index sending the multicall and balance batcher deployments.
    #[arg(long, env = "DEVNET_SENDER_INDEX")]
    pub sender_index: Option<usize>,

    /// Node account index sending the deposit contract deployment.
    #[arg(long, env = "DEVNET_DEPOSIT_SENDER_INDEX")]
    pub deposit_sender_index: Option<usize>,

    /// Gas price in wei for the deposit contract deployment.
    #[arg(long, env = "DEVNET_GAS_PRICE")]
    pub gas_price: Option<u64>,

    /// Gas limit for the deposit contract deployment.
    #[arg(long, env = "DEVNET_DEPOSIT_GAS_LIMIT")]
    pub deposit_gas_limit: Option<u64>,

    /// Also write the deployed addresses as JSON to this path.
    #[arg(long, env = "DEVNET_OUT")]
    pub out: Option<PathBuf>,
}

impl DeployArgs {
    /// Apply the options given on the command line on top of `config`.
    pub fn apply(&self, config: &mut DeployConfig) {
        if let Some(path) = &self.deposit_abi {
            config.deposit_abi = path.clone();
        }
        if let Some(path) = &self.deposit_bin {
            config.deposit_bin = path.clone();
        }
        if let Some(path) = &self.artifacts {
            config.artifacts_dir = path.clone();
        }
        if let Some(index) = self.sender_index {
            config.sender_index = index;
        }
        if let Some(index) = self.deposit_sender_index {
            config.deposit_sender_index = index;
        }
        if let Some(gas_price) = self.gas_price {
            config.gas_price = gas_price;
        }
        if let Some(gas_limit) = self.deposit_gas_limit {
            config.deposit_gas_limit = gas_limit;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["devnet-contracts"]).unwrap();

        assert_eq!(cli.deploy.network, "localhost");
        assert!(cli.command.is_none());

        let mut config = DeployConfig::default();
        cli.deploy.apply(&mut config);
        assert_eq!(config, DeployConfig::default());
    }

    #[test]
    fn test_overrides() {
        let cli = Cli::try_parse_from([
            "devnet-contracts",
            "--network",
            "devnet",
            "--sender-index",
            "0",
            "--artifacts",
            "build/artifacts",
            "--gas-price",
            "1000000000",
        ])
        .unwrap();

        let mut config = DeployConfig::default();
        cli.deploy.apply(&mut config);

        assert_eq!(cli.deploy.network, "devnet");
        assert_eq!(config.sender_index, 0);
        assert_eq!(config.artifacts_dir, PathBuf::from("build/artifacts"));
        assert_eq!(config.gas_price, 1_000_000_000);
        assert_eq!(config.deposit_sender_index, 0);
    }

    #[test]
    fn test_abi_subcommands() {
        let cli = Cli::try_parse_from(["devnet-contracts", "compress-abi", "Deposit.abi"]).unwrap();
        assert!(matches!(cli.command, Some(Command::CompressAbi { ref path }) if path == &PathBuf::from("Deposit.abi")));

        let cli = Cli::try_parse_from(["devnet-contracts", "decompress-abi", "Deposit.abi.b64"]).unwrap();
        assert!(matches!(cli.command, Some(Command::DecompressAbi { .. })));

        // Verbosity is global and may follow the subcommand.
        let cli =
            Cli::try_parse_from(["devnet-contracts", "compress-abi", "Deposit.abi", "-v", "debug"])
                .unwrap();
        assert_eq!(cli.verbosity, LevelFilter::DEBUG);
    }

    #[test]
    fn test_deploy_subcommand() {
        let cli = Cli::try_parse_from(["devnet-contracts", "deploy"]).unwrap();
        let Some(Command::Deploy(args)) = cli.command else {
            panic!("expected the deploy subcommand");
        };
        assert_eq!(args.network, "localhost");

        let cli = Cli::try_parse_from([
            "devnet-contracts",
            "deploy",
            "--network",
            "devnet",
            "--config",
            "Devnet.toml",
            "--out",
            "deployment.json",
        ])
        .unwrap();
        let Some(Command::Deploy(args)) = cli.command else {
            panic!("expected the deploy subcommand");
        };
        assert_eq!(args.network, "devnet");
        assert_eq!(args.config, Some(PathBuf::from("Devnet.toml")));
        assert_eq!(args.out, Some(PathBuf::from("deployment.json")));
    }

    #[test]
    fn test_deploy_flags_rejected_with_abi_subcommands() {
        assert!(
            Cli::try_parse_from([
                "devnet-contracts",
                "--network",
                "devnet",
                "compress-abi",
                "Deposit.abi"
            ])
            .is_err()
        );
        assert!(
            Cli::try_parse_from([
                "devnet-contracts",
                "decompress-abi",
                "Deposit.abi.b64",
                "--out",
                "deployment.json"
            ])
            .is_err()
        );
    }
}
