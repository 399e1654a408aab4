//! Signing accounts.

use alloy::{
    primitives::{Address, U256},
    signers::local::PrivateKeySigner,
};

use crate::error::{AppError, Result};

/// A key pair used to sign transactions.
///
/// The address is always the one derived from the private key.
#[derive(Clone)]
pub struct Account {
    /// The local signer.
    signer: PrivateKeySigner,
    /// Account address.
    address: Address,
}

impl Account {
    /// Create an account from an address and the private key it belongs to.
    ///
    /// Fails with [`AppError::Validation`] when `address` is not the address
    /// derived from `private_key`.
    pub fn new(address: &str, private_key: &str) -> Result<Self> {
        let expected = parse_address(address)?;
        let account = Self::from_private_key(private_key)?;

        if account.address != expected {
            return Err(AppError::Validation(format!(
                "address {} does not belong to the given private key (derived {})",
                expected, account.address
            )));
        }

        Ok(account)
    }

    /// Create an account from a private key string, deriving its address.
    pub fn from_private_key(private_key: &str) -> Result<Self> {
        // Remove 0x prefix if present
        let key = private_key.trim();
        let key = key.strip_prefix("0x").unwrap_or(key);

        let signer: PrivateKeySigner =
            key.parse().map_err(|e: alloy::signers::local::LocalSignerError| {
                AppError::Wallet(e.to_string())
            })?;

        let address = signer.address();

        tracing::info!(address = %address, "Account loaded");

        Ok(Self { signer, address })
    }

    /// Old ordering check: `int(address, 16) < int(private_key, 16)`.
    ///
    /// This is not a property of key pairs and [`Account::new`] does not use
    /// it. It is kept as a predicate so scripts that relied on it can see
    /// which inputs it would have rejected.
    pub fn legacy_ordering_holds(address: &str, private_key: &str) -> Result<bool> {
        let address = parse_hex_u256(address)?;
        let key = parse_hex_u256(private_key)?;
        Ok(address < key)
    }

    /// Get the account address.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Get the EIP-55 checksummed address string.
    pub fn checksum(&self) -> String {
        self.address.to_checksum(None)
    }

    /// Get the signer for transaction signing.
    pub fn signer(&self) -> &PrivateKeySigner {
        &self.signer
    }
}

impl std::fmt::Debug for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Account").field("address", &self.address).finish()
    }
}

/// Parse an address string, accepting any letter case.
pub fn parse_address(s: &str) -> Result<Address> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(AppError::InvalidAddress("address is empty".into()));
    }
    trimmed.parse::<Address>().map_err(|e| AppError::InvalidAddress(format!("{}: {}", trimmed, e)))
}

fn parse_hex_u256(s: &str) -> Result<U256> {
    let trimmed = s.trim();
    let digits = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    U256::from_str_radix(digits, 16).map_err(|e| AppError::Parse(format!("{}: {}", trimmed, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ethereum::constants::{ANVIL_ADDRESS, ANVIL_PRIVATE_KEY};

    const TEST_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";
    const TEST_PRIVATE_KEY_NO_PREFIX: &str =
        "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    // Second Anvil dev account
    const SECOND_ADDRESS: &str = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8";
    const SECOND_PRIVATE_KEY: &str =
        "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";
    const KEY_ONE: &str = "0x0000000000000000000000000000000000000000000000000000000000000001";
    const KEY_ONE_ADDRESS: &str = "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf";

    #[test]
    fn test_account_new_accepts_matching_pair() {
        let account = Account::new(TEST_ADDRESS, ANVIL_PRIVATE_KEY).unwrap();
        assert_eq!(account.address(), ANVIL_ADDRESS);
        assert_eq!(account.checksum(), TEST_ADDRESS);
    }

    #[test]
    fn test_account_new_accepts_lowercase_address() {
        let account = Account::new(&TEST_ADDRESS.to_lowercase(), ANVIL_PRIVATE_KEY).unwrap();
        assert_eq!(account.checksum(), TEST_ADDRESS);
    }

    #[test]
    fn test_account_new_rejects_foreign_address() {
        let result = Account::new(SECOND_ADDRESS, ANVIL_PRIVATE_KEY);
        match result {
            Err(AppError::Validation(msg)) => assert!(msg.contains("does not belong")),
            other => panic!("Expected Validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_account_new_rejects_bad_address() {
        let result = Account::new("0x1234", ANVIL_PRIVATE_KEY);
        assert!(matches!(result, Err(AppError::InvalidAddress(_))));

        let result = Account::new("", ANVIL_PRIVATE_KEY);
        assert!(matches!(result, Err(AppError::InvalidAddress(_))));
    }

    #[test]
    fn test_account_from_private_key_without_prefix() {
        let account = Account::from_private_key(TEST_PRIVATE_KEY_NO_PREFIX).unwrap();
        assert_eq!(account.address(), ANVIL_ADDRESS);
    }

    #[test]
    fn test_account_invalid_private_key() {
        assert!(matches!(Account::from_private_key("0x1234"), Err(AppError::Wallet(_))));
        assert!(matches!(Account::from_private_key("0xZZZZ"), Err(AppError::Wallet(_))));
        assert!(matches!(Account::from_private_key(""), Err(AppError::Wallet(_))));
    }

    #[test]
    fn test_second_dev_account() {
        let account = Account::new(SECOND_ADDRESS, SECOND_PRIVATE_KEY).unwrap();
        assert_ne!(account.address(), ANVIL_ADDRESS);
    }

    #[test]
    fn test_legacy_ordering_is_independent_of_validity() {
        // Holds for the dev account...
        assert!(Account::legacy_ordering_holds(TEST_ADDRESS, ANVIL_PRIVATE_KEY).unwrap());
        // ...but not for key 1, which is an equally valid key pair.
        assert!(!Account::legacy_ordering_holds(KEY_ONE_ADDRESS, KEY_ONE).unwrap());
        assert!(Account::new(KEY_ONE_ADDRESS, KEY_ONE).is_ok());
    }

    #[test]
    fn test_legacy_ordering_rejects_non_hex() {
        assert!(matches!(
            Account::legacy_ordering_holds("0xnothex", ANVIL_PRIVATE_KEY),
            Err(AppError::Parse(_))
        ));
    }

    #[test]
    fn test_account_signer_matches_address() {
        let account = Account::from_private_key(ANVIL_PRIVATE_KEY).unwrap();
        assert_eq!(account.signer().address(), account.address());
    }

    #[test]
    fn test_account_debug_hides_key() {
        let account = Account::from_private_key(ANVIL_PRIVATE_KEY).unwrap();
        let debug_str = format!("{:?}", account);

        assert!(debug_str.contains("Account"));
        assert!(debug_str.contains("address"));
        assert!(!debug_str.contains(TEST_PRIVATE_KEY_NO_PREFIX));
    }
}
