//! devnet-contracts deploys the contracts a development network needs in one shot.

mod cli;

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;

use cli::{Cli, Command, DeployArgs};
use devnet_contracts_deploy::{Deployer, DevnetConfig, compress_abi, decompress_abi};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize the logger. Logs go to stderr, stdout carries the results.
    tracing_subscriber::fmt()
        .with_max_level(cli.verbosity)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Some(Command::CompressAbi { path }) => {
            let abi = read_json(&path)?;
            println!("{}", compress_abi(&abi)?);
        }
        Some(Command::DecompressAbi { path }) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let abi: serde_json::Value = decompress_abi(&content)?;
            println!("{}", serde_json::to_string_pretty(&abi)?);
        }
        Some(Command::Deploy(args)) => deploy(args).await?,
        None => deploy(cli.deploy).await?,
    }

    Ok(())
}

async fn deploy(args: DeployArgs) -> Result<()> {
    let config = DevnetConfig::load(args.config.as_deref())?;

    let network = config.network(&args.network, args.rpc_url.as_deref())?;
    let mut deploy_config = config.deploy;
    args.apply(&mut deploy_config);

    tracing::info!(
        network = %network.name,
        url = %network.url,
        artifacts = %deploy_config.artifacts_dir.display(),
        "Loaded deployment configuration"
    );

    let deployer = Deployer::connect(network, deploy_config)?;
    let report = deployer.deploy().await?;

    println!("{report}");
    println!("  Done!");

    if let Some(out) = &args.out {
        report.save_to_file(out)?;
    }

    Ok(())
}

fn read_json(path: &Path) -> Result<serde_json::Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {} as JSON", path.display()))
}
