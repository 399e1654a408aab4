//! Ethereum interaction module.
//!
//! Contains the node client, signing accounts, ABI helpers and contract handles.

pub mod abi;
pub mod client;
pub mod constants;
pub mod contract;
pub mod wallet;

pub use client::{HttpProvider, NodeClient, TxReceipt};
pub use contract::{ContractTemplate, DeployedContract};
pub use wallet::Account;
