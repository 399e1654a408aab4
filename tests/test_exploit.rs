//! End-to-end run of the Wallet authorization bypass.
//!
//! Run with: `cargo test --test test_exploit -- --ignored`

mod common;

use alloy::primitives::U256;
use ctf_web3::scenario;

#[tokio::test]
#[ignore = "Requires anvil and solc"]
async fn test_attack_unlocks_wallet_without_ownership() {
    let node = skip_if_no_node!();

    let report = scenario::run_exploit(&node.client, &node.account, &node.solc_version)
        .await
        .expect("exploit should run");

    assert_eq!(report.owner, node.account.address());
    assert_ne!(report.attack, report.owner);
    assert!(report.locked_before, "wallet starts locked");
    assert!(!report.locked_after, "attack should unlock the wallet");
    assert!(report.succeeded());
    assert_eq!(report.ret, U256::from(1342));
}
