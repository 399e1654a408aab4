//! Solidity compilation.
//!
//! The [`Compiler`] trait is the seam between the node client and the
//! toolchain; [`SolcCompiler`] drives a real `solc` binary that
//! [`SolcInstaller`] fetches on demand.

pub mod install;
pub mod solc;

use std::collections::BTreeMap;

use alloy::{json_abi::JsonAbi, primitives::Bytes};
use async_trait::async_trait;

use crate::{error::Result, ethereum::constants::SPDX_HEADER};

pub use install::SolcInstaller;
pub use solc::SolcCompiler;

/// ABI and creation bytecode of one compiled contract.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledArtifact {
    /// Contract name as declared in the source.
    pub name: String,
    /// Contract ABI.
    pub abi: JsonAbi,
    /// Creation bytecode. Empty for interfaces and abstract contracts.
    pub bytecode: Bytes,
}

/// Compiles a complete Solidity source unit.
#[async_trait]
pub trait Compiler: Send + Sync {
    /// Compile `source` with compiler `version`, returning artifacts keyed by contract name.
    async fn compile(&self, source: &str, version: &str)
        -> Result<BTreeMap<String, CompiledArtifact>>;
}

/// Wrap contract definitions in a compilable unit: license header and version pragma.
pub fn wrap_source(source: &str, version: &str) -> String {
    format!("{}\npragma solidity ^{};\n{}\n", SPDX_HEADER, version, source)
}
