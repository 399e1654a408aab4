//! Ethereum node client.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use alloy::{
    eips::eip2718::Encodable2718,
    network::{Ethereum, EthereumWallet, TransactionBuilder},
    primitives::{Address, U256},
    providers::{Provider, ProviderBuilder, RootProvider},
    rpc::types::{TransactionReceipt, TransactionRequest},
};

use crate::{
    compiler::{wrap_source, Compiler, SolcCompiler},
    config::Config,
    error::{AppError, Result},
    ethereum::{
        constants::{MAX_TRANSFER_GAS, MIN_TRANSFER_GAS, TRANSFER_GAS_BUDGET_WEI},
        contract::ContractTemplate,
        wallet::Account,
    },
};

/// Type alias for the HTTP provider.
pub type HttpProvider = RootProvider<Ethereum>;

/// Receipt returned by every state-changing operation.
pub type TxReceipt = TransactionReceipt;

/// Connection to a single JSON-RPC endpoint plus the compiler used to build contracts.
///
/// The client holds no signing identity: every state-changing operation takes
/// the [`Account`] that signs it.
#[derive(Clone)]
pub struct NodeClient {
    /// The underlying provider.
    provider: Arc<HttpProvider>,
    /// RPC URL for logging.
    rpc_url: String,
    /// Chain ID reported by the liveness probe.
    chain_id: u64,
    /// Solidity compiler.
    compiler: Arc<dyn Compiler>,
    /// Compiler version used by [`NodeClient::compile_default`].
    solc_version: String,
    /// Upper bound on waiting for receipts.
    receipt_timeout: Option<Duration>,
}

impl NodeClient {
    /// Connect to `rpc_url` with default settings.
    pub async fn connect(rpc_url: &str) -> Result<Self> {
        let config = Config { rpc_url: rpc_url.to_string(), ..Config::default() };
        Self::connect_with(&config).await
    }

    /// Connect using `config`.
    ///
    /// Probes the endpoint with `eth_chainId` and fails with
    /// [`AppError::Connection`] if it does not answer.
    pub async fn connect_with(config: &Config) -> Result<Self> {
        let compiler = Arc::new(SolcCompiler::from_config(config)?);
        Self::connect_with_compiler(config, compiler).await
    }

    /// Connect using `config` and a custom compiler.
    pub async fn connect_with_compiler(
        config: &Config,
        compiler: Arc<dyn Compiler>,
    ) -> Result<Self> {
        let rpc_url = config.rpc_url.as_str();
        let url = rpc_url
            .parse()
            .map_err(|_| AppError::Config(format!("Invalid RPC URL: {}", rpc_url)))?;

        #[allow(deprecated)]
        let provider = ProviderBuilder::new().connect_http(url).root().clone();

        let chain_id = provider.get_chain_id().await.map_err(|e| {
            AppError::Connection(format!("{} did not answer eth_chainId: {}", rpc_url, e))
        })?;

        tracing::info!(chain_id = chain_id, rpc_url = %rpc_url, "Connected to Ethereum node");

        Ok(Self {
            provider: Arc::new(provider),
            rpc_url: rpc_url.to_string(),
            chain_id,
            compiler,
            solc_version: config.solc_version.clone(),
            receipt_timeout: config.receipt_timeout,
        })
    }

    /// Get the underlying provider.
    pub fn provider(&self) -> &HttpProvider {
        &self.provider
    }

    /// Get the RPC URL.
    pub fn url(&self) -> &str {
        &self.rpc_url
    }

    /// Get the chain ID.
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Get the receipt wait bound.
    pub fn receipt_timeout(&self) -> Option<Duration> {
        self.receipt_timeout
    }

    /// Get native balance of `address`, in wei.
    pub async fn get_balance(&self, address: Address) -> Result<U256> {
        tracing::debug!(address = %address, "Querying balance");
        let balance = self.provider.get_balance(address).await?;
        Ok(balance)
    }

    /// Get the pending transaction count of `address`.
    pub async fn nonce(&self, address: Address) -> Result<u64> {
        let nonce = self.provider.get_transaction_count(address).pending().await?;
        Ok(nonce)
    }

    /// Get current gas price.
    pub async fn gas_price(&self) -> Result<u128> {
        let gas_price = self.provider.get_gas_price().await?;
        Ok(gas_price)
    }

    /// Send `amount` wei from `account` to `destination` and wait for the receipt.
    pub async fn transfer(
        &self,
        account: &Account,
        amount: U256,
        destination: Address,
    ) -> Result<TxReceipt> {
        tracing::info!(
            from = %account.address(),
            to = %destination,
            value = %amount,
            "Transferring"
        );

        let nonce = self.nonce(account.address()).await.map_err(as_transaction_error)?;
        let gas_price = self.gas_price().await.map_err(as_transaction_error)?;
        let gas = transfer_gas_allowance(gas_price)?;

        let tx = TransactionRequest::default()
            .with_to(destination)
            .with_value(amount)
            .with_nonce(nonce)
            .with_gas_price(gas_price)
            .with_gas_limit(gas);

        self.send_signed(account, tx).await
    }

    /// Compile contract definitions with compiler `version`.
    ///
    /// `source` holds contract definitions only; the license header and
    /// version pragma are added here. Templates are keyed by contract name.
    pub async fn compile(
        &self,
        source: &str,
        version: &str,
    ) -> Result<BTreeMap<String, ContractTemplate<'_>>> {
        let unit = wrap_source(source, version);
        let artifacts = self.compiler.compile(&unit, version).await?;

        Ok(artifacts
            .into_iter()
            .map(|(name, artifact)| (name, ContractTemplate::new(self, artifact)))
            .collect())
    }

    /// Compile with the configured default compiler version.
    pub async fn compile_default(
        &self,
        source: &str,
    ) -> Result<BTreeMap<String, ContractTemplate<'_>>> {
        self.compile(source, &self.solc_version).await
    }

    /// Fill nonce, gas limit and EIP-1559 fees of a contract transaction sent by `account`.
    pub(crate) async fn fill_contract_tx(
        &self,
        account: &Account,
        tx: TransactionRequest,
    ) -> Result<TransactionRequest> {
        let tx = tx.with_from(account.address()).with_chain_id(self.chain_id);

        let nonce = self.nonce(account.address()).await.map_err(as_transaction_error)?;
        let gas = self
            .provider
            .estimate_gas(tx.clone())
            .await
            .map_err(|e| AppError::Transaction(format!("gas estimation failed: {}", e)))?;
        let fees = self
            .provider
            .estimate_eip1559_fees()
            .await
            .map_err(|e| AppError::Transaction(format!("fee estimation failed: {}", e)))?;

        Ok(tx
            .with_nonce(nonce)
            .with_gas_limit(gas)
            .with_max_fee_per_gas(fees.max_fee_per_gas)
            .with_max_priority_fee_per_gas(fees.max_priority_fee_per_gas))
    }

    /// Sign `tx` with `account`, submit it and wait for its receipt.
    ///
    /// A reverted receipt is reported as [`AppError::Transaction`].
    pub async fn send_signed(&self, account: &Account, tx: TransactionRequest) -> Result<TxReceipt> {
        let tx = tx.with_from(account.address()).with_chain_id(self.chain_id);
        let wallet = EthereumWallet::from(account.signer().clone());

        let envelope = tx
            .build(&wallet)
            .await
            .map_err(|e| AppError::Transaction(format!("signing failed: {}", e)))?;

        let pending = self
            .provider
            .send_raw_transaction(&envelope.encoded_2718())
            .await
            .map_err(|e| AppError::Transaction(format!("submission failed: {}", e)))?;

        let tx_hash = *pending.tx_hash();
        tracing::info!(tx_hash = %tx_hash, "Transaction submitted, waiting for receipt");

        let receipt = pending
            .with_timeout(self.receipt_timeout)
            .get_receipt()
            .await
            .map_err(|e| AppError::Transaction(format!("no receipt for {}: {}", tx_hash, e)))?;

        if !receipt.status() {
            return Err(AppError::Transaction(format!("transaction {} reverted", tx_hash)));
        }

        tracing::info!(
            tx_hash = %tx_hash,
            block = ?receipt.block_number,
            gas_used = receipt.gas_used,
            "Transaction confirmed"
        );

        Ok(receipt)
    }
}

impl std::fmt::Debug for NodeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeClient")
            .field("rpc_url", &self.rpc_url)
            .field("chain_id", &self.chain_id)
            .finish()
    }
}

/// Gas allowance of a plain transfer: a fixed wei budget divided by the gas price.
///
/// Clamped to the intrinsic transfer cost below and a block-sized limit above.
pub fn transfer_gas_allowance(gas_price: u128) -> Result<u64> {
    if gas_price == 0 {
        return Err(AppError::Transaction("node reports a zero gas price".into()));
    }
    let allowance = TRANSFER_GAS_BUDGET_WEI / gas_price;
    let allowance = u64::try_from(allowance).unwrap_or(u64::MAX);
    Ok(allowance.clamp(MIN_TRANSFER_GAS, MAX_TRANSFER_GAS))
}

fn as_transaction_error(err: AppError) -> AppError {
    AppError::Transaction(err.to_string())
}
