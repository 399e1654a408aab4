//! `solc --standard-json` driver.

use std::collections::BTreeMap;
use std::path::Path;
use std::process::Stdio;

use alloy::{hex, json_abi::JsonAbi, primitives::Bytes};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::{io::AsyncWriteExt, process::Command};

use super::{CompiledArtifact, Compiler, SolcInstaller};
use crate::{
    config::Config,
    error::{AppError, Result},
};

/// Name under which the source unit is handed to solc.
const SOURCE_FILE_NAME: &str = "Source.sol";

/// Compiler backed by a `solc` binary.
#[derive(Debug, Clone)]
pub struct SolcCompiler {
    installer: SolcInstaller,
}

impl SolcCompiler {
    /// Create a compiler resolving binaries through `installer`.
    pub fn new(installer: SolcInstaller) -> Self {
        Self { installer }
    }

    /// Create a compiler from the solc settings of `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(SolcInstaller::from_config(config)?))
    }

    /// Get the installer.
    pub fn installer(&self) -> &SolcInstaller {
        &self.installer
    }

    async fn run(&self, solc: &Path, input: &str) -> Result<String> {
        let mut child = Command::new(solc)
            .arg("--standard-json")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                AppError::Compilation(format!("cannot start {}: {}", solc.display(), e))
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(input.as_bytes()).await?;
        }

        let output = child.wait_with_output().await?;
        if !output.status.success() {
            return Err(AppError::Compilation(format!(
                "{} exited with {}: {}",
                solc.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        String::from_utf8(output.stdout)
            .map_err(|e| AppError::Compilation(format!("solc output is not UTF-8: {}", e)))
    }
}

#[async_trait]
impl Compiler for SolcCompiler {
    async fn compile(
        &self,
        source: &str,
        version: &str,
    ) -> Result<BTreeMap<String, CompiledArtifact>> {
        let solc = self.installer.ensure_installed(version).await?;

        tracing::debug!(solc = %solc.display(), version = %version, "Compiling source unit");

        let input = standard_json_input(source);
        let raw = self.run(&solc, &input).await?;
        let artifacts = parse_standard_json_output(&raw)?;

        tracing::info!(
            version = %version,
            contracts = ?artifacts.keys().collect::<Vec<_>>(),
            "Compilation finished"
        );

        Ok(artifacts)
    }
}

// ============================================================================
// Standard JSON
// ============================================================================

/// Build the standard-JSON input selecting ABI and creation bytecode of every contract.
pub fn standard_json_input(source: &str) -> String {
    json!({
        "language": "Solidity",
        "sources": {
            SOURCE_FILE_NAME: { "content": source }
        },
        "settings": {
            "outputSelection": {
                "*": { "*": ["abi", "evm.bytecode.object"] }
            }
        }
    })
    .to_string()
}

/// Compiler diagnostic.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolcDiagnostic {
    /// `error`, `warning` or `info`.
    pub severity: String,
    /// Short message.
    pub message: String,
    /// Message with source location, when solc provides one.
    #[serde(default)]
    pub formatted_message: Option<String>,
}

impl SolcDiagnostic {
    fn is_error(&self) -> bool {
        self.severity.eq_ignore_ascii_case("error")
    }

    fn text(&self) -> &str {
        self.formatted_message.as_deref().unwrap_or(&self.message).trim()
    }
}

#[derive(Debug, Deserialize)]
struct StandardJsonOutput {
    #[serde(default)]
    errors: Vec<SolcDiagnostic>,
    #[serde(default)]
    contracts: BTreeMap<String, BTreeMap<String, ContractOutput>>,
}

#[derive(Debug, Deserialize)]
struct ContractOutput {
    #[serde(default)]
    abi: JsonAbi,
    #[serde(default)]
    evm: EvmOutput,
}

#[derive(Debug, Default, Deserialize)]
struct EvmOutput {
    #[serde(default)]
    bytecode: BytecodeOutput,
}

#[derive(Debug, Default, Deserialize)]
struct BytecodeOutput {
    #[serde(default)]
    object: String,
}

/// Parse solc's standard-JSON output into artifacts keyed by contract name.
///
/// Any error-severity diagnostic fails the whole compilation.
pub fn parse_standard_json_output(raw: &str) -> Result<BTreeMap<String, CompiledArtifact>> {
    let output: StandardJsonOutput = serde_json::from_str(raw)
        .map_err(|e| AppError::Compilation(format!("unreadable solc output: {}", e)))?;

    let (errors, warnings): (Vec<_>, Vec<_>) =
        output.errors.iter().partition(|diagnostic| diagnostic.is_error());

    for warning in &warnings {
        tracing::warn!(severity = %warning.severity, "{}", warning.text());
    }

    if !errors.is_empty() {
        let messages: Vec<&str> = errors.iter().map(|e| e.text()).collect();
        return Err(AppError::Compilation(messages.join("\n")));
    }

    let mut artifacts = BTreeMap::new();
    for (_file, contracts) in output.contracts {
        for (name, contract) in contracts {
            let bytecode = decode_bytecode(&name, &contract.evm.bytecode.object)?;
            artifacts.insert(
                name.clone(),
                CompiledArtifact { name, abi: contract.abi, bytecode },
            );
        }
    }

    Ok(artifacts)
}

fn decode_bytecode(name: &str, object: &str) -> Result<Bytes> {
    if object.contains("__$") {
        return Err(AppError::Compilation(format!(
            "{} references libraries that must be linked first",
            name
        )));
    }
    hex::decode(object)
        .map(Bytes::from)
        .map_err(|e| AppError::Compilation(format!("invalid bytecode for {}: {}", name, e)))
}
