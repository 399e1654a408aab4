//! Wallet authorization bypass demo.
//!
//! Deploys the `Wallet` victim and an `Attack` contract on the configured node
//! and unlocks the wallet without being its owner.

use alloy::primitives::utils::format_ether;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use ctf_web3::{scenario, Account, Config, NodeClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let account = match &config.address {
        Some(address) => Account::new(address, &config.private_key)?,
        None => Account::from_private_key(&config.private_key)?,
    };

    let client = NodeClient::connect_with(&config).await?;

    let balance = client.get_balance(account.address()).await?;
    tracing::info!(address = %account.address(), balance = %format_ether(balance), "Account balance");

    let report = scenario::run_exploit(&client, &account, &config.solc_version).await?;

    println!("Wallet: {}", report.wallet);
    println!("Attack: {}", report.attack);
    println!("Attack.ret(5) = {}", report.ret);
    println!("locked: {} -> {}", report.locked_before, report.locked_after);

    if !report.succeeded() {
        return Err("wallet is still locked".into());
    }

    Ok(())
}
