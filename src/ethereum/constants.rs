//! Network and toolchain constants.
//!
//! Contains local dev-node defaults, gas budgets and compiler defaults.

use alloy::primitives::{address, Address};

// ============================================================================
// Local Dev Node (Anvil)
// ============================================================================

/// Default JSON-RPC endpoint of a local Anvil node.
pub const DEFAULT_RPC_URL: &str = "http://localhost:8545";

/// Anvil dev account #0 address.
pub const ANVIL_ADDRESS: Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");

/// Anvil dev account #0 private key. Publicly known, never use it on a real network.
pub const ANVIL_PRIVATE_KEY: &str =
    "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

/// Anvil chain ID.
pub const ANVIL_CHAIN_ID: u64 = 31337;

// ============================================================================
// Gas
// ============================================================================

/// Amount of wei a plain transfer may spend on gas (0.0005 ether).
pub const TRANSFER_GAS_BUDGET_WEI: u128 = 500_000_000_000_000;

/// Intrinsic gas of a plain value transfer.
pub const MIN_TRANSFER_GAS: u64 = 21_000;

/// Upper bound for the transfer gas allowance (default Anvil block gas limit).
pub const MAX_TRANSFER_GAS: u64 = 30_000_000;

// ============================================================================
// Receipts
// ============================================================================

/// Default upper bound on waiting for a receipt, in seconds.
pub const DEFAULT_RECEIPT_TIMEOUT_SECS: u64 = 120;

// ============================================================================
// Solidity Compiler
// ============================================================================

/// Compiler version used when callers do not pick one.
pub const DEFAULT_SOLC_VERSION: &str = "0.8.0";

/// Base URL of the official solc binary mirror.
pub const SOLC_BINARIES_URL: &str = "https://binaries.soliditylang.org";

/// License header prepended to every compiled source unit.
pub const SPDX_HEADER: &str = "// SPDX-License-Identifier: UNLICENSED";
