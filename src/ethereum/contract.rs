//! Compiled contract templates and live contract handles.

use alloy::{
    dyn_abi::DynSolValue,
    json_abi::JsonAbi,
    network::TransactionBuilder,
    primitives::{Address, Bytes, U256},
    providers::Provider,
    rpc::types::TransactionRequest,
};

use crate::{
    compiler::CompiledArtifact,
    error::{AppError, Result},
    ethereum::{abi, client::TxReceipt, Account, NodeClient},
};

/// A compiled contract that has not been published yet.
#[derive(Debug, Clone)]
pub struct ContractTemplate<'a> {
    client: &'a NodeClient,
    artifact: CompiledArtifact,
}

impl<'a> ContractTemplate<'a> {
    /// Wrap `artifact` for publication through `client`.
    pub fn new(client: &'a NodeClient, artifact: CompiledArtifact) -> Self {
        Self { client, artifact }
    }

    /// Contract name.
    pub fn name(&self) -> &str {
        &self.artifact.name
    }

    /// Contract ABI.
    pub fn abi(&self) -> &JsonAbi {
        &self.artifact.abi
    }

    /// Creation bytecode.
    pub fn bytecode(&self) -> &Bytes {
        &self.artifact.bytecode
    }

    /// The compiled artifact.
    pub fn artifact(&self) -> &CompiledArtifact {
        &self.artifact
    }

    /// Deploy the contract, paying with `account`.
    ///
    /// Waits for the creation receipt and binds the created address.
    pub async fn publish(
        &self,
        account: &Account,
        constructor_args: &[DynSolValue],
    ) -> Result<DeployedContract<'a>> {
        if self.artifact.bytecode.is_empty() {
            return Err(AppError::Abi(format!(
                "{} has no bytecode (interface or abstract contract)",
                self.artifact.name
            )));
        }

        let input =
            abi::encode_constructor(&self.artifact.abi, &self.artifact.bytecode, constructor_args)?;

        tracing::info!(
            contract = %self.artifact.name,
            deployer = %account.address(),
            "Publishing contract"
        );

        let tx = TransactionRequest::default().with_deploy_code(input);
        let tx = self.client.fill_contract_tx(account, tx).await?;
        let receipt = self.client.send_signed(account, tx).await?;

        let address = receipt.contract_address.ok_or_else(|| {
            AppError::Transaction(format!(
                "receipt {} carries no contract address",
                receipt.transaction_hash
            ))
        })?;

        tracing::info!(contract = %self.artifact.name, address = %address, "Contract published");

        Ok(self.get_published(address))
    }

    /// Bind to a contract assumed to be already published at `address`.
    ///
    /// Nothing is sent to the node and the code at `address` is not checked.
    pub fn get_published(&self, address: Address) -> DeployedContract<'a> {
        DeployedContract::new(self.client, address, self.artifact.abi.clone())
    }
}

/// A contract live at a known address.
#[derive(Debug, Clone)]
pub struct DeployedContract<'a> {
    client: &'a NodeClient,
    address: Address,
    abi: JsonAbi,
}

impl<'a> DeployedContract<'a> {
    /// Bind `abi` to `address`.
    pub fn new(client: &'a NodeClient, address: Address, abi: JsonAbi) -> Self {
        Self { client, address, abi }
    }

    /// Contract address.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Contract ABI.
    pub fn abi(&self) -> &JsonAbi {
        &self.abi
    }

    /// Whether the ABI declares a function called `name`.
    pub fn has_function(&self, name: &str) -> bool {
        self.abi.functions.contains_key(name)
    }

    /// Invoke `method` read-only via `eth_call` and decode its return values.
    pub async fn call(&self, method: &str, args: &[DynSolValue]) -> Result<Vec<DynSolValue>> {
        self.ensure_function(method)?;
        let (function, data) = abi::encode_function(&self.abi, method, args)
            .map_err(|e| AppError::Call(e.to_string()))?;

        tracing::debug!(contract = %self.address, method = %method, "Calling contract");

        let tx = TransactionRequest::default().with_to(self.address).with_input(data);
        let output = self
            .client
            .provider()
            .call(tx)
            .await
            .map_err(|e| AppError::Call(format!("{} on {}: {}", method, self.address, e)))?;

        abi::decode_output(function, &output).map_err(|e| AppError::Call(e.to_string()))
    }

    /// Invoke `method` in a transaction signed by `account`, attaching `value` wei.
    ///
    /// Waits for the receipt.
    pub async fn send_transaction(
        &self,
        account: &Account,
        method: &str,
        args: &[DynSolValue],
        value: U256,
    ) -> Result<TxReceipt> {
        self.ensure_function(method)?;
        let (_, data) = abi::encode_function(&self.abi, method, args)?;

        tracing::info!(
            contract = %self.address,
            method = %method,
            sender = %account.address(),
            value = %value,
            "Sending contract transaction"
        );

        let tx = TransactionRequest::default()
            .with_to(self.address)
            .with_input(data)
            .with_value(value);
        let tx = self.client.fill_contract_tx(account, tx).await?;
        self.client.send_signed(account, tx).await
    }

    fn ensure_function(&self, method: &str) -> Result<()> {
        if self.has_function(method) {
            Ok(())
        } else {
            Err(AppError::Call(format!("{} has no function {}", self.address, method)))
        }
    }
}
