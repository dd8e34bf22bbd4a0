//! Compiled contract artifacts and the build-output registry.

use std::path::{Path, PathBuf};

use alloy_core::{json_abi::JsonAbi, primitives::Bytes};
use anyhow::{Context, Result};
use serde::Deserialize;

/// Directory name used by Hardhat for compiler build-info, never holds contract artifacts.
const BUILD_INFO_DIR: &str = "build-info";

/// Suffix of the Hardhat debug files written next to each artifact.
const DEBUG_ARTIFACT_SUFFIX: &str = ".dbg.json";

/// A compiled contract: its interface and its creation bytecode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Contract name, used for logging and as the report key.
    pub name: String,
    /// The contract interface.
    pub abi: JsonAbi,
    /// The creation bytecode sent as the data of the deployment transaction.
    pub bytecode: Bytes,
}

/// On-disk layout of a Hardhat artifact file.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HardhatArtifact {
    contract_name: String,
    abi: JsonAbi,
    bytecode: Bytes,
}

impl Artifact {
    /// Load an artifact from a raw `solc` output pair: a JSON ABI file and a hex
    /// bytecode file.
    ///
    /// The bytecode may carry a `0x` prefix and surrounding whitespace.
    pub fn from_abi_and_bin(name: &str, abi_path: &Path, bin_path: &Path) -> Result<Self> {
        let abi_content = std::fs::read_to_string(abi_path)
            .with_context(|| format!("Failed to read ABI file {}", abi_path.display()))?;
        let abi: JsonAbi = serde_json::from_str(&abi_content)
            .with_context(|| format!("Failed to parse ABI file {}", abi_path.display()))?;

        let bin_content = std::fs::read_to_string(bin_path)
            .with_context(|| format!("Failed to read bytecode file {}", bin_path.display()))?;
        let bytecode = hex::decode(bin_content.trim().trim_start_matches("0x"))
            .with_context(|| format!("Bytecode file {} is not valid hex", bin_path.display()))?;

        Self::new(name.to_string(), abi, Bytes::from(bytecode))
    }

    /// Load an artifact from a Hardhat artifact JSON file.
    pub fn from_hardhat_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read artifact {}", path.display()))?;
        let artifact: HardhatArtifact = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse artifact {}", path.display()))?;

        Self::new(artifact.contract_name, artifact.abi, artifact.bytecode)
    }

    fn new(name: String, abi: JsonAbi, bytecode: Bytes) -> Result<Self> {
        // Interfaces and abstract contracts compile to empty bytecode.
        if bytecode.is_empty() {
            anyhow::bail!("Artifact {} has no creation bytecode", name);
        }

        Ok(Self {
            name,
            abi,
            bytecode,
        })
    }
}

/// Resolves contract names to artifacts inside a Hardhat `artifacts/` directory.
#[derive(Debug, Clone)]
pub struct ArtifactRegistry {
    root: PathBuf,
}

impl ArtifactRegistry {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Look up a contract by name.
    ///
    /// Accepts both `Multicall2` and `Multicall2.sol`. Fails when no artifact,
    /// or more than one, carries that name.
    pub fn lookup(&self, name: &str) -> Result<Artifact> {
        let contract_name = name.strip_suffix(".sol").unwrap_or(name);
        let file_name = format!("{contract_name}.json");

        if !self.root.is_dir() {
            anyhow::bail!(
                "Artifacts directory not found: {} (has the project been compiled?)",
                self.root.display()
            );
        }

        let mut matches = Vec::new();
        collect_matches(&self.root, &file_name, &mut matches)?;

        match matches.as_slice() {
            [] => anyhow::bail!(
                "Artifact not found for contract {} in {}",
                contract_name,
                self.root.display()
            ),
            [path] => {
                tracing::debug!(contract = %contract_name, path = %path.display(), "Resolved artifact");
                Artifact::from_hardhat_file(path)
            }
            candidates => {
                let listed = candidates
                    .iter()
                    .map(|p| p.display().to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                anyhow::bail!("Ambiguous artifact name {}: {}", contract_name, listed)
            }
        }
    }
}

fn collect_matches(dir: &Path, file_name: &str, matches: &mut Vec<PathBuf>) -> Result<()> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read artifacts directory {}", dir.display()))?;

    for entry in entries {
        let entry = entry.context("Failed to read artifacts directory entry")?;
        let path = entry.path();

        if path.is_dir() {
            if entry.file_name() != BUILD_INFO_DIR {
                collect_matches(&path, file_name, matches)?;
            }
            continue;
        }

        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if name == file_name && !name.ends_with(DEBUG_ARTIFACT_SUFFIX) {
            matches.push(path);
        }
    }

    Ok(())
}
