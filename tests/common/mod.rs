//! Common utilities for integration tests.

use alloy::node_bindings::{Anvil, AnvilInstance};
use ctf_web3::{Account, Config, NodeClient, ANVIL_PRIVATE_KEY};

/// A throwaway Anvil node with a connected client and its funded dev account.
pub struct TestNode {
    /// Keeps the node alive for the duration of the test.
    pub anvil: AnvilInstance,
    pub client: NodeClient,
    pub account: Account,
    pub solc_version: String,
}

/// Spawn Anvil and connect to it. Returns `None` when anvil is not installed.
pub async fn spawn_node() -> Option<TestNode> {
    // Load .env file if present (SOLC_PATH, SOLC_CACHE_DIR, ...)
    let _ = dotenvy::dotenv();

    let anvil = Anvil::new().try_spawn().ok()?;

    let config = Config {
        rpc_url: anvil.endpoint(),
        private_key: ANVIL_PRIVATE_KEY.to_string(),
        log_level: "warn".to_string(),
        ..Config::from_env().ok()?
    };

    let client = NodeClient::connect_with(&config).await.ok()?;
    let account = Account::from_private_key(&config.private_key).ok()?;

    Some(TestNode { anvil, client, account, solc_version: config.solc_version })
}

/// Skip test if no node can be spawned (anvil missing).
#[macro_export]
macro_rules! skip_if_no_node {
    () => {
        match common::spawn_node().await {
            Some(node) => node,
            None => {
                eprintln!("Skipping test: anvil is not available");
                return;
            }
        }
    };
}
