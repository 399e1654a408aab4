//! Ethereum contract scripting library.
//!
//! Thin helpers over alloy and solc for scripting against a local or remote
//! Ethereum node: compile Solidity at runtime, publish contracts, call them and
//! move funds.
//!
//! # Features
//!
//! - **Accounts**: key pairs validated by address derivation
//! - **Node client**: balance queries, transfers and compilation
//! - **Contracts**: publish compiled templates, bind published ones, call and transact
//! - **Compiler**: `solc` driven through standard JSON, installed on demand
//!
//! # Example
//!
//! ```rust,ignore
//! use alloy::dyn_abi::DynSolValue;
//! use ctf_web3::{Account, NodeClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let account = Account::from_private_key(ctf_web3::ANVIL_PRIVATE_KEY)?;
//!     let client = NodeClient::connect("http://localhost:8545").await?;
//!
//!     let templates = client.compile("contract A { uint public x = 1; }", "0.8.0").await?;
//!     let a = templates["A"].publish(&account, &[]).await?;
//!     println!("{:?}", a.call("x", &[]).await?);
//!     Ok(())
//! }
//! ```

pub mod compiler;
pub mod config;
pub mod error;
pub mod ethereum;
pub mod scenario;

pub use compiler::{CompiledArtifact, Compiler, SolcCompiler, SolcInstaller};
pub use config::Config;
pub use error::{AppError, Result};
pub use ethereum::constants::*;
pub use ethereum::{Account, ContractTemplate, DeployedContract, NodeClient, TxReceipt};
